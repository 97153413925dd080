//! Angle unit utilities
//!
//! Handles conversion between radians (the engine's internal unit) and
//! degrees for display.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Angle display units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnits {
    /// Radians (internal unit)
    Radians,
    /// Degrees
    #[default]
    Degrees,
}

impl fmt::Display for AngleUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radians => write!(f, "rad"),
            Self::Degrees => write!(f, "°"),
        }
    }
}

impl FromStr for AngleUnits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "radians" | "rad" => Ok(Self::Radians),
            "degrees" | "deg" | "°" => Ok(Self::Degrees),
            _ => Err(format!("Unknown angle units: {}", s)),
        }
    }
}

/// Converts degrees to radians.
pub fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Converts radians to degrees.
pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Format an angle given in radians for display
///
/// * `radians` - Angle in radians
/// * `units` - Target display units
pub fn format_angle(radians: f64, units: AngleUnits) -> String {
    match units {
        AngleUnits::Radians => format!("{:.4} rad", radians),
        AngleUnits::Degrees => format!("{:.3}°", to_degrees(radians)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_angle() {
        assert_eq!(format_angle(PI / 2.0, AngleUnits::Degrees), "90.000°");
        assert_eq!(format_angle(1.0, AngleUnits::Radians), "1.0000 rad");
    }

    #[test]
    fn test_degree_radian_conversion() {
        assert!((to_radians(180.0) - PI).abs() < 1e-12);
        assert!((to_degrees(PI / 4.0) - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_units_from_str() {
        assert_eq!("deg".parse::<AngleUnits>().unwrap(), AngleUnits::Degrees);
        assert_eq!("Radians".parse::<AngleUnits>().unwrap(), AngleUnits::Radians);
        assert!("grad".parse::<AngleUnits>().is_err());
    }
}
