use crate::foundation::error::{CoverError, CoverResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StageConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 600,
        }
    }
}

impl StageConfig {
    pub fn new(width: u32, height: u32) -> CoverResult<Self> {
        let stage = Self { width, height };
        stage.validate()?;
        Ok(stage)
    }

    pub fn validate(self) -> CoverResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoverError::validation(format!(
                "stage must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Pixel size of the surface when rasterized at `pixel_ratio`.
    pub fn scaled(self, pixel_ratio: f64) -> CoverResult<(u32, u32)> {
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(CoverError::validation("pixel ratio must be finite and > 0"));
        }
        let w = (f64::from(self.width) * pixel_ratio).round();
        let h = (f64::from(self.height) * pixel_ratio).round();
        if w < 1.0 || h < 1.0 || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
            return Err(CoverError::validation(format!(
                "scaled stage {w}x{h} is out of range"
            )));
        }
        Ok((w as u32, h as u32))
    }
}

/// Placement of a bitmap on the stage: translation, rotation about the
/// top-left corner, and uniform scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation_deg: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation_deg: 0.0,
        }
    }
}

impl Placement {
    pub fn to_affine(self) -> Affine {
        // T(x, y) * R(rot) * S(scale)
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale(self.scale)
    }
}

pub(crate) fn ensure_finite(name: &str, v: f64) -> CoverResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoverError::validation(format!(
            "{name} must be a finite number, got {v}"
        )))
    }
}

pub(crate) fn parse_number(name: &str, raw: &str) -> CoverResult<f64> {
    let v: f64 = raw.trim().parse().map_err(|_| {
        CoverError::validation(format!("{name}: '{raw}' is not a number"))
    })?;
    ensure_finite(name, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_scaled_multiplies_by_ratio() {
        let stage = StageConfig::default();
        assert_eq!(stage.scaled(3.0).unwrap(), (900, 1800));
        assert_eq!(stage.scaled(1.0).unwrap(), (300, 600));
        assert!(stage.scaled(0.0).is_err());
        assert!(stage.scaled(f64::NAN).is_err());
    }

    #[test]
    fn stage_rejects_zero_dimensions() {
        assert!(StageConfig::new(0, 10).is_err());
        assert!(StageConfig::new(10, 0).is_err());
        assert!(StageConfig::new(1, 1).is_ok());
    }

    #[test]
    fn placement_identity_and_translation() {
        assert_eq!(Placement::default().to_affine(), Affine::IDENTITY);

        let p = Placement {
            x: 10.0,
            y: -2.5,
            ..Placement::default()
        };
        assert_eq!(p.to_affine(), Affine::translate(Vec2::new(10.0, -2.5)));
    }

    #[test]
    fn placement_rotates_about_top_left() {
        let p = Placement {
            x: 5.0,
            y: 5.0,
            scale: 2.0,
            rotation_deg: 90.0,
        };
        let a = p.to_affine();
        let origin = a * Point::new(0.0, 0.0);
        assert!((origin.x - 5.0).abs() < 1e-9 && (origin.y - 5.0).abs() < 1e-9);

        // (1, 0) scaled to (2, 0), rotated 90deg clockwise in y-down space to (0, 2).
        let p1 = a * Point::new(1.0, 0.0);
        assert!((p1.x - 5.0).abs() < 1e-9, "{p1:?}");
        assert!((p1.y - 7.0).abs() < 1e-9, "{p1:?}");
    }

    #[test]
    fn parse_number_rejects_garbage() {
        assert_eq!(parse_number("x", " 12.5 ").unwrap(), 12.5);
        assert!(parse_number("x", "abc").is_err());
        assert!(parse_number("x", "").is_err());
        assert!(parse_number("x", "NaN").is_err());
        assert!(parse_number("x", "inf").is_err());
    }
}
