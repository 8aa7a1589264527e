//! Support configuration.
//!
//! This module provides the [`SupportConfig`] type consumed by the field
//! builder, the classifier and the post-processing helpers.

use crate::{Coord, CoordF, Error, Result};
use serde::{Deserialize, Serialize};

/// Grid resolution used when nothing else is configured (µm).
pub const DEFAULT_GRID_CELL_SIZE: Coord = 200;

/// Tolerance subtracted from the threshold cosine so faces right at the end
/// angle still count as needing support.
pub const COS_ANGLE_TOLERANCE: CoordF = 0.01;

/// Support generation parameters.
///
/// All distances are scaled integer micrometers; angles are degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportConfig {
    /// Overhang end angle (degrees). Faces whose tilt from horizontal is at
    /// most this angle need support. A negative value disables support.
    pub end_angle: CoordF,

    /// XY clearance between support and the model outline (µm).
    pub xy_distance: Coord,

    /// Number of layers left empty between the model and the support.
    pub z_gap_layers: u32,

    /// Regular layer thickness (µm).
    pub layer_thickness: Coord,

    /// First layer thickness (µm).
    pub first_layer_thickness: Coord,

    /// Number of interface layers directly beneath supported surfaces.
    pub interface_layers: u32,

    /// Support every underside, including ones resting on the model,
    /// instead of only the lowest surface of each column.
    pub generate_internal_support: bool,

    /// Support extrusion width (µm), used to smooth away slivers.
    pub extrusion_width: Coord,

    /// Support field grid resolution (µm).
    pub grid_cell_size: Coord,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            end_angle: 45.0,
            xy_distance: 700,
            z_gap_layers: 1,
            layer_thickness: 200,
            first_layer_thickness: 300,
            interface_layers: 0,
            generate_internal_support: false,
            extrusion_width: 400,
            grid_cell_size: DEFAULT_GRID_CELL_SIZE,
        }
    }
}

impl SupportConfig {
    /// Create a config with support generation turned off.
    pub fn disabled() -> Self {
        Self {
            end_angle: -1.0,
            ..Default::default()
        }
    }

    /// Whether support generation is enabled (end angle not negative).
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.end_angle >= 0.0
    }

    /// Vertical gap between model and support (µm).
    #[inline]
    pub fn support_z_distance(&self) -> Coord {
        self.z_gap_layers as Coord * self.layer_thickness
    }

    /// Thickness of the interface band beneath a supported surface (µm).
    #[inline]
    pub fn interface_z_distance(&self) -> Coord {
        self.interface_layers as Coord * self.support_z_distance()
    }

    /// Minimum surface-angle cosine that still needs support.
    #[inline]
    pub fn cos_threshold(&self) -> CoordF {
        self.end_angle.to_radians().cos() - COS_ANGLE_TOLERANCE
    }

    /// Builder method to set the end angle
    pub fn with_end_angle(mut self, degrees: CoordF) -> Self {
        self.end_angle = degrees;
        self
    }

    /// Builder method to set the Z gap in layers
    pub fn with_z_gap_layers(mut self, layers: u32) -> Self {
        self.z_gap_layers = layers;
        self
    }

    /// Builder method to set the interface layer count
    pub fn with_interface_layers(mut self, layers: u32) -> Self {
        self.interface_layers = layers;
        self
    }

    /// Builder method to select internal support generation
    pub fn internal_support(mut self, value: bool) -> Self {
        self.generate_internal_support = value;
        self
    }

    /// Builder method to set the XY clearance
    pub fn with_xy_distance(mut self, distance: Coord) -> Self {
        self.xy_distance = distance;
        self
    }

    /// Check the values for consistency.
    pub fn validate(&self) -> Result<()> {
        if !self.end_angle.is_finite() {
            return Err(Error::Config(format!(
                "end_angle must be finite, got {}",
                self.end_angle
            )));
        }
        if self.layer_thickness <= 0 {
            return Err(Error::Config(format!(
                "layer_thickness must be positive, got {}",
                self.layer_thickness
            )));
        }
        if self.first_layer_thickness <= 0 {
            return Err(Error::Config(format!(
                "first_layer_thickness must be positive, got {}",
                self.first_layer_thickness
            )));
        }
        if self.grid_cell_size <= 0 {
            return Err(Error::Config(format!(
                "grid_cell_size must be positive, got {}",
                self.grid_cell_size
            )));
        }
        if self.xy_distance < 0 || self.extrusion_width < 0 {
            return Err(Error::Config(
                "xy_distance and extrusion_width must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a config from JSON. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SupportConfig::default();
        assert!(config.is_enabled());
        assert_eq!(config.grid_cell_size, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_disabled() {
        let config = SupportConfig::disabled();
        assert!(!config.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_z_distances() {
        let config = SupportConfig {
            z_gap_layers: 2,
            layer_thickness: 150,
            interface_layers: 3,
            ..Default::default()
        };
        assert_eq!(config.support_z_distance(), 300);
        assert_eq!(config.interface_z_distance(), 900);
    }

    #[test]
    fn test_cos_threshold() {
        let config = SupportConfig::default().with_end_angle(60.0);
        assert!((config.cos_threshold() - 0.49).abs() < 1e-9);

        let flat = SupportConfig::default().with_end_angle(0.0);
        assert!((flat.cos_threshold() - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_builder() {
        let config = SupportConfig::default()
            .with_end_angle(30.0)
            .with_z_gap_layers(0)
            .with_interface_layers(2)
            .with_xy_distance(500)
            .internal_support(true);

        assert!((config.end_angle - 30.0).abs() < 1e-10);
        assert_eq!(config.z_gap_layers, 0);
        assert_eq!(config.interface_layers, 2);
        assert_eq!(config.xy_distance, 500);
        assert!(config.generate_internal_support);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_layer = SupportConfig {
            layer_thickness: 0,
            ..Default::default()
        };
        assert!(matches!(bad_layer.validate(), Err(Error::Config(_))));

        let bad_angle = SupportConfig::default().with_end_angle(f64::NAN);
        assert!(bad_angle.validate().is_err());

        let bad_grid = SupportConfig {
            grid_cell_size: -5,
            ..Default::default()
        };
        assert!(bad_grid.validate().is_err());

        let bad_xy = SupportConfig::default().with_xy_distance(-1);
        assert!(bad_xy.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = SupportConfig::default()
            .with_interface_layers(2)
            .internal_support(true);
        let json = config.to_json().unwrap();
        let parsed = SupportConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let parsed = SupportConfig::from_json(r#"{ "end_angle": 60.0, "z_gap_layers": 2 }"#)
            .unwrap();
        assert!((parsed.end_angle - 60.0).abs() < 1e-10);
        assert_eq!(parsed.z_gap_layers, 2);
        assert_eq!(parsed.layer_thickness, 200);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            SupportConfig::from_json("{ not json"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            SupportConfig::from_json(r#"{ "layer_thickness": -10 }"#),
            Err(Error::Config(_))
        ));
    }
}
