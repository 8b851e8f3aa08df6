//! PictriKit CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pictrikit::color::Background;
use pictrikit::config::{default, xdg, ConfigLoader};
use pictrikit::export::SystemClipboard;
use pictrikit::state::{LinearAlign, Properties, ScaleMode, MAX_PADDING};
use pictrikit::{logging, App, Config};

/// Compose screenshots into a single image
#[derive(Parser)]
#[command(name = "pictrikit")]
#[command(version, about = "Compose screenshots into a single image")]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/pictrikit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in layouts
    Layouts {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compose images into a layout and export a PNG
    Compose {
        #[command(flatten)]
        input: ComposeArgs,

        /// Output file (default: <export.output_dir>/<prefix>-<millis>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Copy the PNG to the clipboard instead of saving it
        #[arg(long, conflicts_with = "output")]
        copy: bool,
    },

    /// Print the preview box tree as JSON
    Preview {
        #[command(flatten)]
        input: ComposeArgs,
    },

    /// Manage configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct ComposeArgs {
    /// Layout id (see `pictrikit layouts`)
    #[arg(short, long)]
    layout: String,

    /// Images in slot order (PNG, JPEG or WebP)
    images: Vec<PathBuf>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(..=MAX_PADDING as i64))]
    padding: Option<u32>,

    #[arg(long)]
    gap: Option<u32>,

    #[arg(long)]
    roundness: Option<u32>,

    /// "transparent" or a hex color
    #[arg(long)]
    background: Option<Background>,

    /// uniform or original
    #[arg(long)]
    scale_mode: Option<ScaleMode>,

    /// start, center or end
    #[arg(long)]
    align: Option<LinearAlign>,
}

impl ComposeArgs {
    fn properties(&self, base: Properties) -> Properties {
        Properties {
            padding: self.padding.unwrap_or(base.padding),
            gap: self.gap.unwrap_or(base.gap),
            roundness: self.roundness.unwrap_or(base.roundness),
            scale_mode: self.scale_mode.unwrap_or(base.scale_mode),
            linear_align: self.align.unwrap_or(base.linear_align),
            background: self.background.unwrap_or(base.background),
        }
    }
}

/// Actions for the `config` subcommand.
#[derive(Subcommand)]
enum ConfigAction {
    /// Create default configuration file
    Init {
        /// Overwrite existing configuration (creates backup)
        #[arg(long)]
        force: bool,
    },
    /// Show configuration file path
    Path,
    /// Validate configuration file
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Config { action } = &cli.command {
        return run_config_command(action, cli.config.as_deref());
    }

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.logging.level);

    match cli.command {
        Commands::Layouts { json } => run_layouts_command(config, json),
        Commands::Compose {
            input,
            output,
            copy,
        } => run_compose_command(config, &input, output.as_deref(), copy),
        Commands::Preview { input } => run_preview_command(config, &input),
        Commands::Config { .. } => ExitCode::SUCCESS,
    }
}

fn run_config_command(action: &ConfigAction, path: Option<&Path>) -> ExitCode {
    let result = match action {
        ConfigAction::Init { force } => {
            let created = match path {
                Some(p) => default::create_default_config_at(p, *force).map(|_| p.to_path_buf()),
                None => default::create_default_config(*force),
            };
            created.map(|p| println!("Created configuration at {}", p.display()))
        }
        ConfigAction::Path => {
            let shown = path.map(Path::to_path_buf).unwrap_or_else(xdg::config_path);
            println!("{}", shown.display());
            Ok(())
        }
        ConfigAction::Validate => ConfigLoader::load(path).map(|config| {
            println!("Configuration is valid");
            println!("{config:#?}");
        }),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Config error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_layouts_command(config: Config, json: bool) -> ExitCode {
    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if json {
        let templates: Vec<_> = app.catalog.templates().collect();
        match serde_json::to_string_pretty(&templates) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }
    for template in app.catalog.templates() {
        let slots = match template.max_slot_count() {
            Some(max) => max.to_string(),
            None => format!("{}+", template.initial_slot_count()),
        };
        println!(
            "{:<18} {:<11} {:>3}  {}",
            template.id,
            template.category().to_string(),
            slots,
            template.name
        );
    }
    ExitCode::SUCCESS
}

fn new_runtime() -> Option<tokio::runtime::Runtime> {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => Some(rt),
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            None
        }
    }
}

fn run_compose_command(config: Config, input: &ComposeArgs, output: Option<&Path>, copy: bool) -> ExitCode {
    let Some(rt) = new_runtime() else {
        return ExitCode::FAILURE;
    };
    let properties = input.properties(config.canvas);
    let result = rt.block_on(async {
        let app = App::new(config)?;
        app.compose(&input.layout, properties, &input.images).await?;
        if copy {
            let exported = app.copy(&SystemClipboard).await?;
            println!(
                "Copied {}x{} PNG to clipboard",
                exported.width, exported.height
            );
        } else {
            let (path, exported) = app.save(output).await?;
            println!(
                "Saved {}x{} PNG to {}",
                exported.width,
                exported.height,
                path.display()
            );
        }
        Ok::<_, pictrikit::AppError>(())
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_preview_command(config: Config, input: &ComposeArgs) -> ExitCode {
    let Some(rt) = new_runtime() else {
        return ExitCode::FAILURE;
    };
    let properties = input.properties(config.canvas);
    let result = rt.block_on(async {
        let app = App::new(config)?;
        app.compose(&input.layout, properties, &input.images).await?;
        Ok::<_, pictrikit::AppError>(app.preview().await)
    });
    let tree = match result {
        Ok(Some(tree)) => tree,
        Ok(None) => {
            eprintln!("Error: no composition to preview");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    match tree.to_json() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compose_parses_properties() {
        let cli = Cli::try_parse_from([
            "pictrikit",
            "compose",
            "--layout",
            "horizontal-stack",
            "a.png",
            "b.png",
            "--padding",
            "0",
            "--background",
            "transparent",
            "--scale-mode",
            "original",
            "--align",
            "end",
        ])
        .expect("parse");
        match cli.command {
            Commands::Compose { input, copy, output } => {
                assert!(!copy);
                assert!(output.is_none());
                assert_eq!(input.images.len(), 2);
                let props = input.properties(Properties::default());
                assert_eq!(props.padding, 0);
                assert_eq!(props.gap, 12);
                assert_eq!(props.background, Background::Transparent);
                assert_eq!(props.scale_mode, ScaleMode::Original);
                assert_eq!(props.linear_align, LinearAlign::End);
            }
            _ => panic!("expected compose"),
        }
    }

    #[test]
    fn test_padding_above_maximum_rejected() {
        let too_large = (MAX_PADDING + 1).to_string();
        let result = Cli::try_parse_from([
            "pictrikit", "compose", "-l", "horizontal-stack", "a.png", "--padding", &too_large,
        ]);
        assert!(result.is_err());
        let max = MAX_PADDING.to_string();
        let result = Cli::try_parse_from([
            "pictrikit", "compose", "-l", "horizontal-stack", "a.png", "--padding", &max,
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_background_rejected() {
        let result = Cli::try_parse_from([
            "pictrikit", "compose", "-l", "phone", "a.png", "--background", "blue",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_copy_conflicts_with_output() {
        let result = Cli::try_parse_from([
            "pictrikit", "compose", "-l", "phone", "a.png", "--copy", "-o", "x.png",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_subcommands() {
        for args in [
            vec!["pictrikit", "config", "init"],
            vec!["pictrikit", "config", "init", "--force"],
            vec!["pictrikit", "config", "path"],
            vec!["pictrikit", "config", "validate"],
        ] {
            assert!(Cli::try_parse_from(args).is_ok());
        }
    }
}
