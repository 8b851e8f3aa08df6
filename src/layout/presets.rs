//! Built-in layout templates and the catalog that serves them.
//!
//! The catalog is built once and never mutated. Ids are stable and are what
//! the CLI and config refer to.

use super::template::{
    ContentFit, Direction, FrameKind, GridArea, GridSpec, LayoutTemplate, SlotRole, SlotSpec,
    TemplateShape,
};

/// Per-index background tints for comparison slots.
pub const COMPARISON_TINTS: [&str; 4] = ["#fef8e0", "#fef0d8", "#fee4d5", "#fdd5d5"];

/// Immutable registry of layout templates in declaration order.
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    templates: Vec<LayoutTemplate>,
}

impl LayoutCatalog {
    /// Creates a catalog holding the built-in templates.
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    /// Creates a catalog from an explicit list (used by tests and embedders).
    pub fn from_templates(templates: Vec<LayoutTemplate>) -> Self {
        Self { templates }
    }

    /// Looks up a template by id.
    pub fn lookup(&self, id: &str) -> Option<&LayoutTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Returns all templates in declaration order.
    pub fn templates(&self) -> impl Iterator<Item = &LayoutTemplate> {
        self.templates.iter()
    }

    /// Returns an iterator over all template ids.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn linear(id: &str, name: &str, direction: Direction) -> LayoutTemplate {
    LayoutTemplate {
        id: id.to_string(),
        name: name.to_string(),
        shape: TemplateShape::Linear {
            direction,
            initial_slots: 2,
            max_slots: None,
        },
        fit: ContentFit::Contain,
        show_labels: false,
        tinted: false,
    }
}

fn structural(
    id: &str,
    name: &str,
    grid: GridSpec,
    slots: Vec<SlotSpec>,
    fit: ContentFit,
) -> LayoutTemplate {
    LayoutTemplate {
        id: id.to_string(),
        name: name.to_string(),
        shape: TemplateShape::Structural { grid, slots },
        fit,
        show_labels: false,
        tinted: false,
    }
}

fn comparison(id: &str, name: &str, grid: GridSpec, slots: Vec<SlotSpec>) -> LayoutTemplate {
    LayoutTemplate {
        show_labels: true,
        tinted: true,
        ..structural(id, name, grid, slots, ContentFit::Contain)
    }
}

fn frame(id: &str, name: &str, kind: FrameKind) -> LayoutTemplate {
    LayoutTemplate {
        id: id.to_string(),
        name: name.to_string(),
        shape: TemplateShape::Framed {
            frame: kind,
            slot: SlotSpec::new(SlotRole::Content, "Content", 1.0),
        },
        fit: ContentFit::Contain,
        show_labels: false,
        tinted: false,
    }
}

fn main_slot(weight: f32, area: GridArea) -> SlotSpec {
    SlotSpec::new(SlotRole::Primary, "Main", weight).at(area)
}

fn sub_slot(n: usize, area: GridArea) -> SlotSpec {
    SlotSpec::new(SlotRole::Secondary, &format!("Sub {}", n), 1.0).at(area)
}

fn equal_slots(count: usize) -> Vec<SlotSpec> {
    (1..=count)
        .map(|n| SlotSpec::new(SlotRole::Equal, &format!("Slot {}", n), 1.0))
        .collect()
}

fn compare_slots(count: usize) -> Vec<SlotSpec> {
    (1..=count)
        .map(|n| {
            SlotSpec::new(SlotRole::Compare, &format!("Image {}", n), 1.0)
                .labeled(&n.to_string())
        })
        .collect()
}

fn before_after_slots() -> Vec<SlotSpec> {
    vec![
        SlotSpec::new(SlotRole::Before, "Before", 1.0).labeled("BEFORE"),
        SlotSpec::new(SlotRole::After, "After", 1.0).labeled("AFTER"),
    ]
}

// ---------------------------------------------------------------------------
// Built-in definitions
// ---------------------------------------------------------------------------

fn builtin_templates() -> Vec<LayoutTemplate> {
    use GridArea as A;

    vec![
        // Linear
        linear("horizontal-stack", "Horizontal", Direction::Row),
        linear("vertical-stack", "Vertical", Direction::Column),
        // Focus
        structural(
            "left-focus",
            "Left Focus",
            GridSpec::new(&[1.0, 1.0], &[1.0, 1.0]),
            vec![
                main_slot(1.0, A::spanning(0, 0, 2, 1)),
                sub_slot(1, A::cell(0, 1)),
                sub_slot(2, A::cell(1, 1)),
            ],
            ContentFit::Cover,
        ),
        structural(
            "right-focus",
            "Right Focus",
            GridSpec::new(&[1.0, 1.0], &[1.0, 1.0]),
            vec![
                sub_slot(1, A::cell(0, 0)),
                sub_slot(2, A::cell(1, 0)),
                main_slot(1.0, A::spanning(0, 1, 2, 1)),
            ],
            ContentFit::Cover,
        ),
        structural(
            "top-focus",
            "Top Focus",
            GridSpec::new(&[1.0, 1.0], &[2.0, 1.0]),
            vec![
                main_slot(2.0, A::spanning(0, 0, 1, 2)),
                sub_slot(1, A::cell(1, 0)),
                sub_slot(2, A::cell(1, 1)),
            ],
            ContentFit::Cover,
        ),
        structural(
            "bottom-focus",
            "Bottom Focus",
            GridSpec::new(&[1.0, 1.0], &[1.0, 2.0]),
            vec![
                sub_slot(1, A::cell(0, 0)),
                sub_slot(2, A::cell(0, 1)),
                main_slot(2.0, A::spanning(1, 0, 1, 2)),
            ],
            ContentFit::Cover,
        ),
        structural(
            "left-focus-4",
            "Left Focus 4",
            GridSpec::new(&[2.0, 1.0], &[1.0, 1.0, 1.0]),
            vec![
                main_slot(2.0, A::spanning(0, 0, 3, 1)),
                sub_slot(1, A::cell(0, 1)),
                sub_slot(2, A::cell(1, 1)),
                sub_slot(3, A::cell(2, 1)),
            ],
            ContentFit::Cover,
        ),
        structural(
            "right-focus-4",
            "Right Focus 4",
            GridSpec::new(&[1.0, 2.0], &[1.0, 1.0, 1.0]),
            vec![
                sub_slot(1, A::cell(0, 0)),
                sub_slot(2, A::cell(1, 0)),
                sub_slot(3, A::cell(2, 0)),
                main_slot(2.0, A::spanning(0, 1, 3, 1)),
            ],
            ContentFit::Cover,
        ),
        structural(
            "center-focus-5",
            "Center Focus 5",
            GridSpec::new(&[1.0, 1.5, 1.0], &[1.0, 1.0]),
            vec![
                sub_slot(1, A::cell(0, 0)),
                sub_slot(2, A::cell(1, 0)),
                main_slot(1.5, A::spanning(0, 1, 2, 1)),
                sub_slot(3, A::cell(0, 2)),
                sub_slot(4, A::cell(1, 2)),
            ],
            ContentFit::Cover,
        ),
        structural(
            "top-focus-5",
            "Top Focus 5",
            GridSpec::new(&[1.0, 1.0, 1.0, 1.0], &[2.0, 1.0]),
            vec![
                main_slot(2.0, A::spanning(0, 0, 1, 4)),
                sub_slot(1, A::cell(1, 0)),
                sub_slot(2, A::cell(1, 1)),
                sub_slot(3, A::cell(1, 2)),
                sub_slot(4, A::cell(1, 3)),
            ],
            ContentFit::Cover,
        ),
        // Grids
        structural(
            "grid-2x2",
            "Grid 2x2",
            GridSpec::new(&[1.0, 1.0], &[1.0, 1.0]),
            equal_slots(4),
            ContentFit::Cover,
        ),
        structural(
            "grid-3x3",
            "Grid 3x3",
            GridSpec::new(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]),
            equal_slots(9),
            ContentFit::Cover,
        ),
        structural(
            "grid-2x3",
            "Grid 2x3",
            GridSpec::new(&[1.0, 1.0, 1.0], &[1.0, 1.0]),
            equal_slots(6),
            ContentFit::Cover,
        ),
        structural(
            "grid-1x3",
            "Grid 1x3",
            GridSpec::new(&[1.0, 1.0, 1.0], &[1.0]),
            equal_slots(3),
            ContentFit::Cover,
        ),
        // Comparison
        comparison(
            "before-after",
            "Before / After",
            GridSpec::new(&[1.0, 1.0], &[1.0]),
            before_after_slots(),
        ),
        comparison(
            "before-after-v",
            "Before / After (Vertical)",
            GridSpec::new(&[1.0], &[1.0, 1.0]),
            before_after_slots(),
        ),
        comparison(
            "triple-compare",
            "Triple Compare",
            GridSpec::new(&[1.0, 1.0, 1.0], &[1.0]),
            compare_slots(3),
        ),
        comparison(
            "quad-compare",
            "Quad Compare",
            GridSpec::new(&[1.0, 1.0], &[1.0, 1.0]),
            compare_slots(4),
        ),
        // Frames
        frame("browser", "Browser", FrameKind::Browser),
        frame("phone", "Phone", FrameKind::Phone),
        frame("tablet", "Tablet", FrameKind::Tablet),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Category;

    #[test]
    fn test_catalog_builtin_count() {
        let catalog = LayoutCatalog::builtin();
        assert_eq!(catalog.len(), 21);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_catalog_declaration_order() {
        let catalog = LayoutCatalog::builtin();
        let ids: Vec<&str> = catalog.ids().collect();
        assert_eq!(ids[0], "horizontal-stack");
        assert_eq!(ids[1], "vertical-stack");
        assert_eq!(*ids.last().expect("non-empty"), "tablet");
    }

    #[test]
    fn test_lookup_unknown_returns_none() {
        let catalog = LayoutCatalog::builtin();
        assert!(catalog.lookup("mosaic").is_none());
        assert!(catalog.lookup("").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let catalog = LayoutCatalog::builtin();
        let mut ids: Vec<&str> = catalog.ids().collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_linear_templates_unbounded() {
        let catalog = LayoutCatalog::builtin();
        for id in ["horizontal-stack", "vertical-stack"] {
            let t = catalog.lookup(id).expect("linear template");
            assert!(t.is_linear());
            assert_eq!(t.initial_slot_count(), 2);
            assert_eq!(t.max_slot_count(), None);
            assert!(t.slot_specs().is_empty());
        }
        assert_eq!(
            catalog.lookup("vertical-stack").and_then(|t| t.direction()),
            Some(Direction::Column)
        );
    }

    #[test]
    fn test_non_linear_slot_counts_are_fixed() {
        let catalog = LayoutCatalog::builtin();
        for t in catalog.templates().filter(|t| !t.is_linear()) {
            let n = t.slot_specs().len();
            assert_eq!(t.initial_slot_count(), n, "{}", t.id);
            assert_eq!(t.max_slot_count(), Some(n), "{}", t.id);
        }
    }

    #[test]
    fn test_explicit_areas_fit_inside_grid() {
        let catalog = LayoutCatalog::builtin();
        for t in catalog.templates() {
            if let TemplateShape::Structural { grid, slots } = &t.shape {
                for (i, slot) in slots.iter().enumerate() {
                    let area = slot.area.unwrap_or_else(|| grid.auto_area(i));
                    assert!(
                        (area.row + area.row_span) as usize <= grid.rows.len(),
                        "{} slot {} overflows rows",
                        t.id,
                        i
                    );
                    assert!(
                        (area.column + area.column_span) as usize <= grid.columns.len(),
                        "{} slot {} overflows columns",
                        t.id,
                        i
                    );
                }
            }
        }
    }

    #[test]
    fn test_focus_primary_weight() {
        let catalog = LayoutCatalog::builtin();
        let focus = catalog
            .templates()
            .filter(|t| t.id.contains("focus"))
            .collect::<Vec<_>>();
        assert_eq!(focus.len(), 8);
        for t in focus {
            let primaries: Vec<_> = t
                .slot_specs()
                .iter()
                .filter(|s| s.role == SlotRole::Primary)
                .collect();
            assert_eq!(primaries.len(), 1, "{}", t.id);
            assert!((1.0..=2.0).contains(&primaries[0].weight), "{}", t.id);
            assert_eq!(t.fit, ContentFit::Cover);
        }
    }

    #[test]
    fn test_center_focus_main_is_middle_index() {
        let catalog = LayoutCatalog::builtin();
        let t = catalog.lookup("center-focus-5").expect("template");
        assert_eq!(t.slot_spec(2).map(|s| s.role), Some(SlotRole::Primary));
        assert_eq!(
            t.slot_spec(2).and_then(|s| s.area),
            Some(GridArea::spanning(0, 1, 2, 1))
        );
    }

    #[test]
    fn test_grid_2x3_has_three_columns() {
        let catalog = LayoutCatalog::builtin();
        let t = catalog.lookup("grid-2x3").expect("template");
        match &t.shape {
            TemplateShape::Structural { grid, slots } => {
                assert_eq!(grid.columns.len(), 3);
                assert_eq!(grid.rows.len(), 2);
                assert_eq!(slots.len(), 6);
                assert_eq!(grid.auto_area(4), GridArea::cell(1, 1));
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_comparison_labels() {
        let catalog = LayoutCatalog::builtin();
        let ba = catalog.lookup("before-after").expect("template");
        let labels: Vec<_> = ba
            .slot_specs()
            .iter()
            .filter_map(|s| s.label.as_deref())
            .collect();
        assert_eq!(labels, vec!["BEFORE", "AFTER"]);
        assert!(ba.show_labels && ba.tinted);
        assert_eq!(ba.fit, ContentFit::Contain);

        let quad = catalog.lookup("quad-compare").expect("template");
        assert_eq!(
            quad.slot_spec(3).and_then(|s| s.label.as_deref()),
            Some("4")
        );
    }

    #[test]
    fn test_frame_templates() {
        let catalog = LayoutCatalog::builtin();
        for (id, kind) in [
            ("browser", FrameKind::Browser),
            ("phone", FrameKind::Phone),
            ("tablet", FrameKind::Tablet),
        ] {
            let t = catalog.lookup(id).expect("frame template");
            assert_eq!(t.category(), Category::Frame);
            assert_eq!(t.frame_kind(), Some(kind));
            assert_eq!(t.initial_slot_count(), 1);
            assert_eq!(t.slot_spec(0).map(|s| s.role), Some(SlotRole::Content));
        }
    }

    #[test]
    fn test_comparison_tints_parse() {
        for hex in COMPARISON_TINTS {
            assert!(crate::color::Color::from_hex(hex).is_ok(), "{}", hex);
        }
    }

    #[test]
    fn test_catalog_default_trait() {
        assert_eq!(LayoutCatalog::default().len(), LayoutCatalog::builtin().len());
    }
}
