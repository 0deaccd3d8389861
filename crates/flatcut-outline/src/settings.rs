//! Extraction settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or validating [`ExtractSettings`].
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unknown keys.
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Parameters for outline extraction.
///
/// All lengths are in model units (millimetres for typical CAD exports).
/// Missing keys in a settings file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractSettings {
    /// Expected sheet thickness.
    pub thickness: f64,
    /// Accepted deviation from `thickness`.
    pub tolerance: f64,
    /// Vertex pairs closer than this are treated as the same point when
    /// measuring face separation.
    pub coincident_epsilon: f64,
    /// Minimum `max|component| / length` for a separation vector to count as
    /// axis-aligned.
    pub axis_alignment_ratio: f64,
    /// A Z extent exceeding the detected thickness by more than this triggers
    /// a rescan over all vertices.
    pub wrong_pair_extent: f64,
    /// Minimum `|n·Z|` for a face to count as lying flat after the thickness
    /// axis has been aligned with Z.
    pub face_normal_dot: f64,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            thickness: 3.0,
            tolerance: 0.5,
            coincident_epsilon: 0.1,
            axis_alignment_ratio: 0.8,
            wrong_pair_extent: 50.0,
            face_normal_dot: 0.99,
        }
    }
}

impl ExtractSettings {
    /// Default settings with a different thickness band.
    pub fn with_thickness(thickness: f64, tolerance: f64) -> Self {
        Self {
            thickness,
            tolerance,
            ..Default::default()
        }
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let finite = [
            ("thickness", self.thickness),
            ("tolerance", self.tolerance),
            ("coincident_epsilon", self.coincident_epsilon),
            ("axis_alignment_ratio", self.axis_alignment_ratio),
            ("wrong_pair_extent", self.wrong_pair_extent),
            ("face_normal_dot", self.face_normal_dot),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SettingsError::Invalid(format!("{name} must be finite")));
        }
        if self.thickness <= 0.0 {
            return Err(SettingsError::Invalid("thickness must be positive".into()));
        }
        if self.tolerance < 0.0 || self.tolerance >= self.thickness {
            return Err(SettingsError::Invalid(
                "tolerance must be in [0, thickness)".into(),
            ));
        }
        if self.coincident_epsilon <= 0.0 || self.coincident_epsilon >= self.band().0 {
            return Err(SettingsError::Invalid(
                "coincident_epsilon must be positive and below thickness - tolerance".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.axis_alignment_ratio) {
            return Err(SettingsError::Invalid(
                "axis_alignment_ratio must be between 0 and 1".into(),
            ));
        }
        if self.wrong_pair_extent <= 0.0 {
            return Err(SettingsError::Invalid(
                "wrong_pair_extent must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.face_normal_dot) {
            return Err(SettingsError::Invalid(
                "face_normal_dot must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }

    /// Accepted separation band `(thickness - tolerance, thickness + tolerance)`.
    pub fn band(&self) -> (f64, f64) {
        (self.thickness - self.tolerance, self.thickness + self.tolerance)
    }

    /// Whether a separation lies inside the (inclusive) thickness band.
    pub fn in_band(&self, distance: f64) -> bool {
        let (lo, hi) = self.band();
        (lo..=hi).contains(&distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = ExtractSettings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.band(), (2.5, 3.5));
        assert!(s.in_band(2.5));
        assert!(s.in_band(3.5));
        assert!(!s.in_band(3.51));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let s = ExtractSettings::from_toml_str("thickness = 6.0\ntolerance = 0.25\n").unwrap();
        assert_eq!(s.thickness, 6.0);
        assert_eq!(s.tolerance, 0.25);
        assert_eq!(s.face_normal_dot, 0.99);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            ExtractSettings::from_toml_str("thicknes = 6.0"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for text in [
            "thickness = 0.0",
            "thickness = 3.0\ntolerance = 3.0",
            "tolerance = -1.0",
            "coincident_epsilon = 2.6",
            "axis_alignment_ratio = 1.5",
            "face_normal_dot = -0.1",
            "wrong_pair_extent = 0.0",
            "thickness = nan",
        ] {
            assert!(
                matches!(
                    ExtractSettings::from_toml_str(text),
                    Err(SettingsError::Invalid(_))
                ),
                "accepted: {text}"
            );
        }
    }

    #[test]
    fn test_round_trip_through_toml() {
        let s = ExtractSettings::with_thickness(1.5, 0.2);
        let text = toml::to_string(&s).unwrap();
        assert_eq!(ExtractSettings::from_toml_str(&text).unwrap(), s);
    }

    #[test]
    fn test_missing_file() {
        let err = ExtractSettings::load("/nonexistent/flatcut.toml").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/flatcut.toml"));
    }
}
