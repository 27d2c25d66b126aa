//! coverkit is the core of a cover designer: place an uploaded image, overlay
//! simple shapes, and export a flattened PNG.
//!
//! # Pipeline overview
//!
//! 1. **Edit**: [`EditorCommand`]s (or direct setters) mutate an [`EditorSession`]
//! 2. **Compile**: `EditorSession -> RenderPlan` (image layer, then shapes in list order)
//! 3. **Render**: `RenderPlan -> FrameRGBA` on the CPU backend
//! 4. **Export**: `FrameRGBA -> PNG`, as bytes, a data URI, or `cover-design.png` on disk
//!
//! All state lives in the session; render and export only borrow it.
//!
//! ```no_run
//! use coverkit::{EditorCommand, EditorSession, ShapeType, export};
//!
//! let mut session = EditorSession::default();
//! session.upload(&std::fs::read("photo.jpg")?)?;
//! session.apply(&EditorCommand::SetScale { scale: 2.0 })?;
//! session.apply(&EditorCommand::AddShape { shape: ShapeType::Circle })?;
//! export(&session)?.write_to(".")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]

mod assets;
mod config;
mod document;
mod editor;
mod export;
mod foundation;
mod render;

pub use assets::decode::{DecodedImage, decode_image};
pub use config::{DEFAULT_EXPORT_FILE_NAME, EditorConfig, GuideCircle, ShapeDefaults};
pub use document::{DesignDocument, ImageSource, ShapeSpec};
pub use editor::commands::{CommandOutcome, EditorCommand};
pub use editor::image::ImageState;
pub use editor::session::{EditorSession, UploadTicket};
pub use editor::shapes::{Shape, ShapeField, ShapeId, ShapeKind, ShapeList, ShapeType};
pub use export::{Export, encode_png, ensure_parent_dir, export, export_with};
pub use foundation::core::{Affine, BezPath, Placement, Point, Rect, StageConfig, Vec2};
pub use foundation::error::{CoverError, CoverResult};
pub use render::cpu::CpuBackend;
pub use render::pipeline::{render_frame, render_preview};
pub use render::plan::{CircleCutout, ClipMask, DrawOp, RenderPlan, RenderSettings, compile_scene};
pub use render::{FrameRGBA, RenderBackend};
