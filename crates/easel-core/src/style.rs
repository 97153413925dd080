//! Visual style attributes carried by every entity.

use serde::{Deserialize, Serialize};

/// Stroke and fill attributes of an entity.
///
/// The renderer owns interpretation; the engine only stores, compares,
/// serializes and restores styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub stroke_color: String,
    pub fill_color: String,
    pub stroke_width: f64,
    #[serde(default)]
    pub dash_array: Vec<f64>,
    pub opacity: f64,
}

impl Style {
    /// Default style for points.
    pub fn point() -> Self {
        Self {
            stroke_color: "#000000".to_string(),
            fill_color: "#ffffff".to_string(),
            stroke_width: 1.0,
            dash_array: Vec::new(),
            opacity: 1.0,
        }
    }

    /// Default style for one-dimensional objects.
    pub fn curve() -> Self {
        Self {
            stroke_color: "#2a4bd7".to_string(),
            fill_color: "none".to_string(),
            stroke_width: 2.0,
            dash_array: Vec::new(),
            opacity: 1.0,
        }
    }

    /// Default style for labels and non-drawn objects.
    pub fn text() -> Self {
        Self {
            stroke_color: "#000000".to_string(),
            fill_color: "#000000".to_string(),
            stroke_width: 0.0,
            dash_array: Vec::new(),
            opacity: 1.0,
        }
    }

    /// Checks value ranges.
    pub fn is_valid(&self) -> bool {
        self.stroke_width >= 0.0
            && self.stroke_width.is_finite()
            && (0.0..=1.0).contains(&self.opacity)
            && self.dash_array.iter().all(|d| *d >= 0.0)
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::curve()
    }
}
