use std::sync::Arc;

use crate::{
    assets::decode::DecodedImage,
    config::{EditorConfig, GuideCircle},
    editor::session::EditorSession,
    foundation::core::{Affine, BezPath, Rect},
    foundation::error::{CoverError, CoverResult},
};

/// Flattening tolerance for circle and rounded-rect outlines, in stage units.
const PATH_TOLERANCE: f64 = 0.05;

/// Knobs for turning a session into pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Device pixels per stage unit.
    pub pixel_ratio: f64,
    /// Straight RGBA clear color; `None` keeps the background transparent.
    pub background: Option<[u8; 4]>,
    /// Straight RGBA fill for shapes.
    pub shape_fill: [u8; 4],
    pub guides: Vec<GuideCircle>,
    pub guide_fill: [u8; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl RenderSettings {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            pixel_ratio: config.pixel_ratio,
            background: config.background,
            shape_fill: config.shape_fill,
            guides: config.guides.clone(),
            guide_fill: config.guide_fill,
        }
    }

    /// Same settings at 1:1 density, for on-screen previews.
    pub fn preview(&self) -> Self {
        Self {
            pixel_ratio: 1.0,
            ..self.clone()
        }
    }
}

/// Circular hole punched out of a [`ClipMask`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CircleCutout {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

/// Optional mask for the image layer: the image is only visible inside the
/// rectangle and outside the cutout. Shapes are never masked.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipMask {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub cutout: Option<CircleCutout>,
}

impl ClipMask {
    pub fn validate(&self) -> CoverResult<()> {
        let mut vals = vec![self.x, self.y, self.width, self.height];
        if let Some(c) = self.cutout {
            vals.extend([c.cx, c.cy, c.radius]);
            if c.radius < 0.0 {
                return Err(CoverError::validation("clip cutout radius must be >= 0"));
            }
        }
        if vals.iter().any(|v| !v.is_finite()) {
            return Err(CoverError::validation("clip mask values must be finite"));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(CoverError::validation("clip mask must have a positive size"));
        }
        Ok(())
    }

    /// Clip layers in stage coordinates, each filled even-odd and applied
    /// nested. The first is the rectangle; with a cutout, a second layer
    /// holds the rectangle plus the circle. A cutout reaching past the
    /// rectangle therefore never uncovers anything outside it.
    pub fn clip_paths(&self) -> Vec<BezPath> {
        use kurbo::Shape as _;

        let rect = Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
            .to_path(PATH_TOLERANCE);
        let Some(c) = self.cutout else {
            return vec![rect];
        };
        let mut holed = rect.clone();
        holed.extend(kurbo::Circle::new((c.cx, c.cy), c.radius).path_elements(PATH_TOLERANCE));
        vec![rect, holed]
    }
}

/// One paint operation, already in device space.
#[derive(Clone, Debug)]
pub enum DrawOp {
    Image {
        image: Arc<DecodedImage>,
        transform: Affine,
        /// Nested even-odd clip layers in device coordinates.
        clips: Vec<BezPath>,
    },
    FillPath {
        path: BezPath,
        transform: Affine,
        /// Straight RGBA.
        color: [u8; 4],
    },
}

/// Backend-agnostic description of one composite.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub width: u32,
    pub height: u32,
    pub background: Option<[u8; 4]>,
    /// Paint order: first op is bottom-most.
    pub ops: Vec<DrawOp>,
}

/// Lay out the session as draw ops: image first, then shapes in list order,
/// then guides.
pub fn compile_scene(session: &EditorSession, settings: &RenderSettings) -> CoverResult<RenderPlan> {
    use kurbo::Shape as _;

    let (width, height) = session.stage().scaled(settings.pixel_ratio)?;
    let root = Affine::scale(settings.pixel_ratio);

    let mut ops = Vec::with_capacity(session.shapes().len() + settings.guides.len() + 1);

    if let Some(img) = session.image() {
        let clips = session
            .clip()
            .map(|c| c.clip_paths().into_iter().map(|p| root * p).collect())
            .unwrap_or_default();
        ops.push(DrawOp::Image {
            image: img.bitmap().clone(),
            transform: root * img.placement().to_affine(),
            clips,
        });
    }

    for shape in session.shapes().iter() {
        ops.push(DrawOp::FillPath {
            path: shape.to_path(PATH_TOLERANCE),
            transform: root,
            color: settings.shape_fill,
        });
    }

    for g in &settings.guides {
        ops.push(DrawOp::FillPath {
            path: kurbo::Circle::new((g.x, g.y), g.radius).to_path(PATH_TOLERANCE),
            transform: root,
            color: settings.guide_fill,
        });
    }

    Ok(RenderPlan {
        width,
        height,
        background: settings.background,
        ops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        editor::{image::ImageState, shapes::ShapeType},
        foundation::core::Point,
    };

    #[test]
    fn empty_session_compiles_to_blank_plan() {
        let s = EditorSession::default();
        let plan = compile_scene(&s, &RenderSettings::default()).unwrap();
        assert_eq!((plan.width, plan.height), (900, 1800));
        assert!(plan.ops.is_empty());
        assert_eq!(plan.background, None);
    }

    #[test]
    fn image_is_painted_before_shapes() {
        let mut s = EditorSession::default();
        let defaults = s.config().shape_defaults;
        s.shapes_mut().add(ShapeType::Circle, &defaults);
        let img = DecodedImage::from_rgba8(1, 1, vec![1, 2, 3, 255]).unwrap();
        s.set_image(ImageState::new(Arc::new(img)));
        s.shapes_mut().add(ShapeType::Rectangle, &defaults);

        let plan = compile_scene(&s, &RenderSettings::default()).unwrap();
        assert_eq!(plan.ops.len(), 3);
        assert!(matches!(&plan.ops[0], DrawOp::Image { clips, .. } if clips.is_empty()));
        assert!(matches!(plan.ops[1], DrawOp::FillPath { .. }));
        assert!(matches!(plan.ops[2], DrawOp::FillPath { .. }));
    }

    #[test]
    fn guides_are_painted_last_with_their_own_fill() {
        let mut s = EditorSession::new(EditorConfig::phone_camera()).unwrap();
        let defaults = s.config().shape_defaults;
        s.shapes_mut().add(ShapeType::Rectangle, &defaults);

        let plan = compile_scene(&s, &RenderSettings::from_config(s.config())).unwrap();
        assert_eq!(plan.ops.len(), 3);
        assert!(matches!(plan.ops[0], DrawOp::FillPath { color: [0, 0, 0, 255], .. }));
        for op in &plan.ops[1..] {
            assert!(matches!(op, DrawOp::FillPath { color: [211, 211, 211, 255], .. }));
        }

        let none = compile_scene(&s, &RenderSettings::default()).unwrap();
        assert_eq!(none.ops.len(), 1);
    }

    #[test]
    fn pixel_ratio_is_folded_into_transforms() {
        let mut s = EditorSession::default();
        let img = DecodedImage::from_rgba8(1, 1, vec![0, 0, 0, 255]).unwrap();
        s.set_image(ImageState::new(Arc::new(img)));
        s.require_image_mut().unwrap().0.set_position(10.0, 20.0).unwrap();

        let plan = compile_scene(&s, &RenderSettings::default()).unwrap();
        let DrawOp::Image { transform, .. } = &plan.ops[0] else {
            panic!("expected image op");
        };
        let p = *transform * Point::ORIGIN;
        assert_eq!((p.x, p.y), (30.0, 60.0));
    }

    #[test]
    fn clip_mask_validates_and_builds_nested_layers() {
        let mask = ClipMask {
            x: 50.0,
            y: 50.0,
            width: 200.0,
            height: 300.0,
            cutout: Some(CircleCutout {
                cx: 150.0,
                cy: 150.0,
                radius: 40.0,
            }),
        };
        mask.validate().unwrap();
        let moves = |p: &BezPath| {
            p.elements()
                .iter()
                .filter(|el| matches!(el, kurbo::PathEl::MoveTo(_)))
                .count()
        };
        let layers = mask.clip_paths();
        assert_eq!(layers.len(), 2);
        assert_eq!(moves(&layers[0]), 1);
        assert_eq!(moves(&layers[1]), 2);

        let plain = ClipMask {
            cutout: None,
            ..mask
        };
        assert_eq!(plain.clip_paths().len(), 1);

        let bad = ClipMask {
            width: 0.0,
            ..mask
        };
        assert!(bad.validate().is_err());
    }
}
