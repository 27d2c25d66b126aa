use crate::foundation::core::StageConfig;
use crate::foundation::error::{CoverError, CoverResult};

pub const DEFAULT_EXPORT_FILE_NAME: &str = "cover-design.png";

/// Tunables for an editor session.
///
/// Every field has a default, so a partial JSON object (or `{}`) deserializes
/// into a usable config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub scale_min: f64,
    pub scale_max: f64,
    pub wheel_zoom_factor: f64,
    pub rotation_step_deg: f64,
    pub pixel_ratio: f64,
    pub shape_fill: [u8; 4],
    /// Straight RGBA clear color; `None` leaves the background transparent.
    pub background: Option<[u8; 4]>,
    pub export_file_name: String,
    pub stage: StageConfig,
    pub shape_defaults: ShapeDefaults,
    /// Fixed circles painted above every shape. Empty unless a preset or
    /// document asks for them.
    pub guides: Vec<GuideCircle>,
    pub guide_fill: [u8; 4],
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GuideCircle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShapeDefaults {
    pub x: f64,
    pub y: f64,
    pub circle_radius: f64,
    pub rect_width: f64,
    pub rect_height: f64,
    pub rect_corner_radius: f64,
}

impl Default for ShapeDefaults {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            circle_radius: 50.0,
            rect_width: 100.0,
            rect_height: 100.0,
            rect_corner_radius: 20.0,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scale_min: 0.5,
            scale_max: 3.0,
            wheel_zoom_factor: 1.05,
            rotation_step_deg: 15.0,
            pixel_ratio: 3.0,
            shape_fill: [0, 0, 0, 255],
            background: None,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            stage: StageConfig::default(),
            shape_defaults: ShapeDefaults::default(),
            guides: Vec::new(),
            guide_fill: [211, 211, 211, 255],
        }
    }
}

impl EditorConfig {
    /// 300x600 phone case with the two camera-lens guides.
    pub fn phone_camera() -> Self {
        Self {
            stage: StageConfig {
                width: 300,
                height: 600,
            },
            guides: vec![
                GuideCircle {
                    x: 60.0,
                    y: 60.0,
                    radius: 40.0,
                },
                GuideCircle {
                    x: 60.0,
                    y: 160.0,
                    radius: 40.0,
                },
            ],
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CoverResult<()> {
        let finite = [
            ("scale_min", self.scale_min),
            ("scale_max", self.scale_max),
            ("wheel_zoom_factor", self.wheel_zoom_factor),
            ("rotation_step_deg", self.rotation_step_deg),
            ("pixel_ratio", self.pixel_ratio),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(CoverError::validation(format!("{name} must be finite")));
            }
        }
        if self.scale_min <= 0.0 || self.scale_min > self.scale_max {
            return Err(CoverError::validation(format!(
                "scale range must satisfy 0 < min <= max, got [{}, {}]",
                self.scale_min, self.scale_max
            )));
        }
        if self.wheel_zoom_factor <= 1.0 {
            return Err(CoverError::validation("wheel_zoom_factor must be > 1"));
        }
        if self.pixel_ratio <= 0.0 {
            return Err(CoverError::validation("pixel_ratio must be > 0"));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(CoverError::validation("export_file_name must be non-empty"));
        }
        self.stage.validate()?;

        let d = &self.shape_defaults;
        for (name, v) in [
            ("circle_radius", d.circle_radius),
            ("rect_width", d.rect_width),
            ("rect_height", d.rect_height),
            ("rect_corner_radius", d.rect_corner_radius),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CoverError::validation(format!(
                    "shape_defaults.{name} must be finite and >= 0"
                )));
            }
        }
        if !d.x.is_finite() || !d.y.is_finite() {
            return Err(CoverError::validation("shape_defaults position must be finite"));
        }
        for (i, g) in self.guides.iter().enumerate() {
            if !(g.x.is_finite() && g.y.is_finite() && g.radius.is_finite()) || g.radius < 0.0 {
                return Err(CoverError::validation(format!(
                    "guides[{i}] must be finite with radius >= 0"
                )));
            }
        }
        Ok(())
    }

    pub fn clamp_scale(&self, s: f64) -> f64 {
        s.clamp(self.scale_min, self.scale_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_behaviour() {
        let c = EditorConfig::default();
        assert_eq!((c.scale_min, c.scale_max), (0.5, 3.0));
        assert_eq!(c.rotation_step_deg, 15.0);
        assert_eq!(c.pixel_ratio, 3.0);
        assert_eq!(c.export_file_name, "cover-design.png");
        assert_eq!(c.stage, StageConfig::default());
        c.validate().unwrap();
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: EditorConfig = serde_json::from_str(r#"{ "pixel_ratio": 2.0 }"#).unwrap();
        assert_eq!(c.pixel_ratio, 2.0);
        assert_eq!(c.scale_max, 3.0);
        assert_eq!(c.shape_defaults.circle_radius, 50.0);
    }

    #[test]
    fn phone_camera_preset_has_two_lens_guides() {
        let c = EditorConfig::phone_camera();
        c.validate().unwrap();
        assert_eq!(c.stage, StageConfig::new(300, 600).unwrap());
        let centres: Vec<_> = c.guides.iter().map(|g| (g.x, g.y, g.radius)).collect();
        assert_eq!(centres, vec![(60.0, 60.0, 40.0), (60.0, 160.0, 40.0)]);
        assert!(EditorConfig::default().guides.is_empty());
    }

    #[test]
    fn validate_rejects_bad_guide() {
        let mut c = EditorConfig::phone_camera();
        c.guides[1].radius = -1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_scale_range() {
        let c = EditorConfig {
            scale_min: 4.0,
            scale_max: 2.0,
            ..EditorConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_ratio_and_zoom() {
        let c = EditorConfig {
            pixel_ratio: 0.0,
            ..EditorConfig::default()
        };
        assert!(c.validate().is_err());

        let c = EditorConfig {
            wheel_zoom_factor: 1.0,
            ..EditorConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
