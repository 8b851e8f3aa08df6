//! State snapshot types held by the [`CompositionStore`](super::CompositionStore).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::color::Background;
use crate::model::{Composition, ContainerId};

pub const DEFAULT_PADDING: u32 = 24;
pub const DEFAULT_GAP: u32 = 12;
pub const DEFAULT_ROUNDNESS: u32 = 12;
/// Padding must leave content on the 560 px tall reference preview.
pub const MAX_PADDING: u32 = 279;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;
pub const ZOOM_STEP: f32 = 0.1;

/// How linear exports size their images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// Scale every image to a common cross-axis size.
    #[default]
    Uniform,
    /// Keep native sizes and align on the cross axis.
    Original,
}

/// Cross-axis alignment for original-scale linear exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinearAlign {
    Start,
    #[default]
    Center,
    End,
}

/// Error type for parsing property enums from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePropertyError(pub String);

impl fmt::Display for ParsePropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value: {}", self.0)
    }
}

impl std::error::Error for ParsePropertyError {}

impl FromStr for ScaleMode {
    type Err = ParsePropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uniform" => Ok(ScaleMode::Uniform),
            "original" => Ok(ScaleMode::Original),
            _ => Err(ParsePropertyError(s.to_string())),
        }
    }
}

impl FromStr for LinearAlign {
    type Err = ParsePropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(LinearAlign::Start),
            "center" => Ok(LinearAlign::Center),
            "end" => Ok(LinearAlign::End),
            _ => Err(ParsePropertyError(s.to_string())),
        }
    }
}

/// User-adjustable visual properties. Historized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Properties {
    pub padding: u32,
    pub gap: u32,
    pub roundness: u32,
    pub scale_mode: ScaleMode,
    pub linear_align: LinearAlign,
    pub background: Background,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            gap: DEFAULT_GAP,
            roundness: DEFAULT_ROUNDNESS,
            scale_mode: ScaleMode::default(),
            linear_align: LinearAlign::default(),
            background: Background::default(),
        }
    }
}

/// Session bookkeeping carried by every snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Metadata {
    fn fresh() -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The full editor state at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionState {
    pub metadata: Metadata,
    pub composition: Option<Composition>,
    pub selected_container: Option<ContainerId>,
    pub properties: Properties,
    pub zoom: f32,
}

impl CompositionState {
    pub fn new(properties: Properties) -> Self {
        Self {
            metadata: Metadata::fresh(),
            composition: None,
            selected_container: None,
            properties,
            zoom: 1.0,
        }
    }

    pub fn has_images(&self) -> bool {
        self.composition.as_ref().is_some_and(|c| c.has_images())
    }
}

impl Default for CompositionState {
    fn default() -> Self {
        Self::new(Properties::default())
    }
}

/// Clamps a zoom factor to the supported range, rounded to one decimal.
pub fn clamp_zoom(zoom: f32) -> f32 {
    let clamped = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    (clamped * 10.0).round() / 10.0
}

/// Partial update merged into the current state by
/// [`CompositionStore::set`](super::CompositionStore::set).
///
/// Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub composition: Option<Option<Composition>>,
    pub selected_container: Option<Option<ContainerId>>,
    pub properties: Option<Properties>,
    pub zoom: Option<f32>,
}

impl StatePatch {
    pub fn composition(mut self, composition: Option<Composition>) -> Self {
        self.composition = Some(composition);
        self
    }

    pub fn selected_container(mut self, id: Option<ContainerId>) -> Self {
        self.selected_container = Some(id);
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn zoom(mut self, zoom: f32) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub(crate) fn apply(self, state: &mut CompositionState) {
        if let Some(composition) = self.composition {
            state.composition = composition;
        }
        if let Some(selected) = self.selected_container {
            state.selected_container = selected;
        }
        if let Some(properties) = self.properties {
            state.properties = properties;
        }
        if let Some(zoom) = self.zoom {
            state.zoom = clamp_zoom(zoom);
        }
    }
}
