use std::sync::Arc;

use crate::{
    assets::decode::DecodedImage,
    config::EditorConfig,
    foundation::core::{Placement, Point, Rect, ensure_finite, parse_number},
    foundation::error::CoverResult,
};

/// The uploaded bitmap and where it sits on the stage.
///
/// Scale is kept inside `[config.scale_min, config.scale_max]` by every
/// mutator, so the state never holds an out-of-range value.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageState {
    bitmap: Arc<DecodedImage>,
    placement: Placement,
}

impl ImageState {
    pub fn new(bitmap: Arc<DecodedImage>) -> Self {
        Self {
            bitmap,
            placement: Placement::default(),
        }
    }

    pub fn with_placement(
        bitmap: Arc<DecodedImage>,
        placement: Placement,
        config: &EditorConfig,
    ) -> CoverResult<Self> {
        let mut state = Self::new(bitmap);
        state.set_position(placement.x, placement.y)?;
        state.set_scale(placement.scale, config)?;
        state.set_rotation(placement.rotation_deg)?;
        Ok(state)
    }

    pub fn bitmap(&self) -> &Arc<DecodedImage> {
        &self.bitmap
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn x(&self) -> f64 {
        self.placement.x
    }

    pub fn y(&self) -> f64 {
        self.placement.y
    }

    pub fn scale(&self) -> f64 {
        self.placement.scale
    }

    pub fn rotation(&self) -> f64 {
        self.placement.rotation_deg
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f64 {
        let r = self.placement.rotation_deg.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs.
        if r >= 360.0 { 0.0 } else { r }
    }

    pub fn set_position(&mut self, x: f64, y: f64) -> CoverResult<()> {
        let x = ensure_finite("x", x)?;
        let y = ensure_finite("y", y)?;
        self.placement.x = x;
        self.placement.y = y;
        Ok(())
    }

    /// Set the scale, clamped to the configured range. Returns the stored value.
    pub fn set_scale(&mut self, scale: f64, config: &EditorConfig) -> CoverResult<f64> {
        let scale = ensure_finite("scale", scale)?;
        self.placement.scale = config.clamp_scale(scale);
        Ok(self.placement.scale)
    }

    pub fn set_scale_input(&mut self, raw: &str, config: &EditorConfig) -> CoverResult<f64> {
        let scale = parse_number("scale", raw)?;
        self.set_scale(scale, config)
    }

    /// One wheel notch: positive `delta_y` zooms out, negative zooms in.
    pub fn zoom_wheel(&mut self, delta_y: f64, config: &EditorConfig) -> CoverResult<f64> {
        let delta_y = ensure_finite("wheel delta", delta_y)?;
        let old = self.placement.scale;
        let next = if delta_y > 0.0 {
            old / config.wheel_zoom_factor
        } else if delta_y < 0.0 {
            old * config.wheel_zoom_factor
        } else {
            old
        };
        self.set_scale(next, config)
    }

    pub(crate) fn clamp_scale_to(&mut self, config: &EditorConfig) {
        self.placement.scale = config.clamp_scale(self.placement.scale);
    }

    pub fn set_rotation(&mut self, deg: f64) -> CoverResult<()> {
        self.placement.rotation_deg = ensure_finite("rotation", deg)?;
        Ok(())
    }

    pub fn rotate_left(&mut self, config: &EditorConfig) {
        self.placement.rotation_deg -= config.rotation_step_deg;
    }

    pub fn rotate_right(&mut self, config: &EditorConfig) {
        self.placement.rotation_deg += config.rotation_step_deg;
    }

    pub fn scaled_size(&self) -> (f64, f64) {
        (
            f64::from(self.bitmap.width) * self.placement.scale,
            f64::from(self.bitmap.height) * self.placement.scale,
        )
    }

    pub fn bounds(&self) -> Rect {
        let a = self.placement.to_affine();
        let (w, h) = (f64::from(self.bitmap.width), f64::from(self.bitmap.height));
        let corners = [
            a * Point::new(0.0, 0.0),
            a * Point::new(w, 0.0),
            a * Point::new(w, h),
            a * Point::new(0.0, h),
        ];
        let mut r = Rect::from_points(corners[0], corners[1]);
        for p in &corners[2..] {
            r = r.union_pt(*p);
        }
        r
    }
}
