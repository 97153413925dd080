//! # Spherical Easel
//!
//! Headless construction engine for spherical geometry. Every user action
//! is an undoable command over a dependency graph of points, lines,
//! segments, circles, ellipses, parametric curves, labels, measurements
//! and transformations. Constructions persist as replayable opcode scripts.
//!
//! ## Architecture
//!
//! Spherical Easel is organized as a workspace with multiple crates:
//!
//! 1. **easel-core** - Errors, unit-sphere math, styles, angle units
//! 2. **easel-construction** - Nodule store, update protocol, commands, history, scripts, files
//! 3. **easel-settings** - Configuration file handling
//! 4. **spherical-easel** - This crate: re-exports, logging setup and the replay binary

pub use easel_construction as construction;
pub use easel_core as core;
pub use easel_settings as settings;

pub use easel_core::{AngleUnits, Error, GeometryError, GraphError, Result, ScriptError, Style};

use easel_construction::{Expression, ExpressionDefinition};
use easel_core::format_angle;

pub use easel_construction::{
    AddNoduleCommand, Command, CommandHistory, Construction, ConstructionFile,
    ConstructionOptions, Nodule, NoduleId, NoduleKind, NoduleStore, NoduleType, ObjectNameMap,
};

pub use easel_settings::{Config, ConstructionSettings, LoggingSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Engine options for the `construction` section of the configuration.
pub fn construction_options(settings: &ConstructionSettings) -> ConstructionOptions {
    ConstructionOptions {
        tolerance: settings.tolerance,
        parametric_samples: settings.parametric_samples,
        show_labels: settings.show_labels,
        point_style: settings.point_style.clone(),
        curve_style: settings.curve_style.clone(),
    }
}

/// Empty construction configured from `config`.
pub fn construction_from_config(config: &Config) -> Construction {
    let mut construction =
        Construction::with_options(construction_options(&config.construction));
    construction.author = config.files.default_author.clone();
    construction
}

/// One-line value of a nodule: label text, expression value or point location.
///
/// Measurements are arc lengths or angles on the unit sphere and print in
/// `units`; sliders and calculations print as plain numbers.
pub fn describe_nodule(nodule: &Nodule, units: AngleUnits) -> String {
    match &nodule.kind {
        NoduleKind::Label(label) => format!("\"{}\"", label.text),
        NoduleKind::Expression(Expression { value, definition }) => match definition {
            ExpressionDefinition::SegmentLength { .. }
            | ExpressionDefinition::PointDistance { .. }
            | ExpressionDefinition::LineAngle { .. } => format_angle(*value, units),
            ExpressionDefinition::Slider { .. } | ExpressionDefinition::Calculation { .. } => {
                format!("{:.6}", value)
            }
        },
        _ => match nodule.location() {
            Some(v) => format!("({:.6}, {:.6}, {:.6})", v.x, v.y, v.z),
            None => String::new(),
        },
    }
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(&LoggingSettings::default())
}

/// Initialize logging from the `logging` section of the configuration.
///
/// `RUST_LOG` takes precedence over `settings.level`. Output goes to
/// stderr so it never mixes with command output.
pub fn init_logging_with(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", settings.level, e))?;

    if settings.json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_follow_settings() {
        let mut config = Config::default();
        config.construction.parametric_samples = 12;
        config.construction.show_labels = false;
        config.files.default_author = "Euler".to_string();

        let construction = construction_from_config(&config);
        assert_eq!(construction.options().parametric_samples, 12);
        assert!(!construction.options().show_labels);
        assert_eq!(construction.author, "Euler");
    }

    #[test]
    fn test_measurements_print_in_configured_units() {
        let mut construction = Construction::new();
        let a = AddNoduleCommand::point(construction.store_mut(), nalgebra::Vector3::x()).unwrap();
        let a_id = a.nodule_id();
        construction.execute(Box::new(a)).unwrap();
        let b = AddNoduleCommand::point(construction.store_mut(), nalgebra::Vector3::y()).unwrap();
        let b_id = b.nodule_id();
        construction.execute(Box::new(b)).unwrap();
        let distance =
            AddNoduleCommand::point_distance(construction.store_mut(), a_id, b_id).unwrap();
        let distance_id = distance.nodule_id();
        construction.execute(Box::new(distance)).unwrap();
        let slider =
            AddNoduleCommand::slider(construction.store_mut(), 0.5, 0.0, 1.0, 0.1).unwrap();
        let slider_id = slider.nodule_id();
        construction.execute(Box::new(slider)).unwrap();

        let store = construction.store();
        let distance = store.get(distance_id).unwrap();
        assert_eq!(describe_nodule(distance, AngleUnits::Degrees), "90.000°");
        assert_eq!(describe_nodule(distance, AngleUnits::Radians), "1.5708 rad");

        let slider = store.get(slider_id).unwrap();
        assert_eq!(describe_nodule(slider, AngleUnits::Degrees), "0.500000");

        let label = store.get(store.get(a_id).unwrap().children[0]).unwrap();
        assert_eq!(describe_nodule(label, AngleUnits::Degrees), "\"P1\"");
    }
}
