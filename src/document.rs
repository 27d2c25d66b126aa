use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    config::EditorConfig,
    editor::{
        commands::EditorCommand,
        image::ImageState,
        session::EditorSession,
        shapes::{ShapeKind, ShapeType},
    },
    foundation::core::{Placement, StageConfig},
    foundation::error::{CoverError, CoverResult},
    render::plan::ClipMask,
};

/// A saved design: where the image comes from, how it is placed, the shapes
/// on top, and an optional list of edits to replay.
///
/// ```json
/// {
///   "stage": { "width": 300, "height": 600 },
///   "image": { "source": "photo.jpg", "scale": 2.0, "rotation_deg": 30.0 },
///   "shapes": [ { "type": "circle", "x": 50, "y": 50, "radius": 50 } ],
///   "commands": [ { "op": "rotate_left" } ]
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DesignDocument {
    pub config: EditorConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSource>,
    pub shapes: Vec<ShapeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<ClipMask>,
    pub commands: Vec<EditorCommand>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageSource {
    pub source: String,
    #[serde(flatten)]
    pub placement: Placement,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeSpec {
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl DesignDocument {
    pub fn from_json(json: &str) -> CoverResult<Self> {
        serde_json::from_str(json).map_err(|e| CoverError::serde(format!("design json: {e}")))
    }

    pub fn to_json_pretty(&self) -> CoverResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoverError::serde(e.to_string()))
    }

    pub fn load(path: &Path) -> CoverResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read design '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// A small design with one shape of each kind and no image.
    pub fn starter() -> Self {
        Self::starter_with(EditorConfig::default())
    }

    pub fn starter_with(config: EditorConfig) -> Self {
        let d = config.shape_defaults;
        Self {
            shapes: vec![
                ShapeSpec {
                    x: d.x,
                    y: d.y,
                    kind: ShapeKind::Circle {
                        radius: d.circle_radius,
                    },
                },
                ShapeSpec {
                    x: d.x + 100.0,
                    y: d.y + 200.0,
                    kind: ShapeKind::Rectangle {
                        width: d.rect_width,
                        height: d.rect_height,
                        corner_radius: d.rect_corner_radius,
                    },
                },
            ],
            commands: vec![EditorCommand::AddShape {
                shape: ShapeType::Circle,
            }],
            config,
            ..Self::default()
        }
    }

    pub fn image_path(&self, assets_root: &Path) -> Option<PathBuf> {
        self.image.as_ref().map(|img| {
            let p = Path::new(&img.source);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                assets_root.join(p)
            }
        })
    }

    /// Build a session from this document, reading the image (if any) from
    /// disk, then replay `commands`.
    #[tracing::instrument(skip(self))]
    pub fn build_session(&self, assets_root: &Path) -> CoverResult<EditorSession> {
        let image_bytes = match self.image_path(assets_root) {
            Some(p) => Some(
                std::fs::read(&p).with_context(|| format!("read image '{}'", p.display()))?,
            ),
            None => None,
        };
        self.build_session_with_bytes(image_bytes.as_deref())
    }

    pub fn build_session_with_bytes(&self, image: Option<&[u8]>) -> CoverResult<EditorSession> {
        let mut session = EditorSession::new(self.config.clone())?;
        if let Some(stage) = self.stage {
            session.set_stage(stage)?;
        }

        match (&self.image, image) {
            (Some(src), Some(bytes)) => {
                let decoded = EditorSession::decode_upload(bytes)?;
                let state = ImageState::with_placement(
                    std::sync::Arc::new(decoded),
                    src.placement,
                    session.config(),
                )?;
                session.set_image(state);
            }
            (None, Some(bytes)) => {
                session.upload(bytes)?;
            }
            (Some(src), None) => {
                return Err(CoverError::validation(format!(
                    "image '{}' was referenced but no bytes were supplied",
                    src.source
                )));
            }
            (None, None) => {}
        }

        for spec in &self.shapes {
            session.shapes_mut().add_with(spec.x, spec.y, spec.kind)?;
        }
        session.set_clip(self.clip)?;
        session.apply_all(&self.commands)?;
        Ok(session)
    }
}
