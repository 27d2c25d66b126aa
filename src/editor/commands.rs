use crate::{
    editor::{
        session::EditorSession,
        shapes::{ShapeField, ShapeId, ShapeType},
    },
    foundation::core::StageConfig,
    foundation::error::CoverResult,
    render::plan::ClipMask,
};

/// A user intent, as the editor controls would emit it.
///
/// Serialized as `{"op": "add_shape", "shape": "circle"}` and so on, which is
/// the form design documents store.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditorCommand {
    SetStage { width: u32, height: u32 },
    MoveImage { x: f64, y: f64 },
    SetScale { scale: f64 },
    ZoomWheel { delta_y: f64 },
    SetRotation { degrees: f64 },
    RotateLeft,
    RotateRight,
    AddShape { shape: ShapeType },
    UpdateShape {
        id: ShapeId,
        field: ShapeField,
        value: String,
    },
    RemoveShape { id: ShapeId },
    SelectShape { id: Option<ShapeId> },
    SetClip { clip: Option<ClipMask> },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommandOutcome {
    Applied,
    ShapeAdded(ShapeId),
    /// Nothing changed, typically because the target id does not exist.
    NoOp,
}

impl EditorSession {
    /// Apply one command. Errors leave the session unchanged.
    pub fn apply(&mut self, cmd: &EditorCommand) -> CoverResult<CommandOutcome> {
        tracing::debug!(?cmd, "apply");
        match cmd {
            EditorCommand::SetStage { width, height } => {
                self.set_stage(StageConfig::new(*width, *height)?)?;
            }
            EditorCommand::MoveImage { x, y } => {
                let (img, _) = self.require_image_mut()?;
                img.set_position(*x, *y)?;
            }
            EditorCommand::SetScale { scale } => {
                let (img, cfg) = self.require_image_mut()?;
                img.set_scale(*scale, cfg)?;
            }
            EditorCommand::ZoomWheel { delta_y } => {
                let (img, cfg) = self.require_image_mut()?;
                img.zoom_wheel(*delta_y, cfg)?;
            }
            EditorCommand::SetRotation { degrees } => {
                let (img, _) = self.require_image_mut()?;
                img.set_rotation(*degrees)?;
            }
            EditorCommand::RotateLeft => {
                let (img, cfg) = self.require_image_mut()?;
                img.rotate_left(cfg);
            }
            EditorCommand::RotateRight => {
                let (img, cfg) = self.require_image_mut()?;
                img.rotate_right(cfg);
            }
            EditorCommand::AddShape { shape } => {
                let defaults = self.config().shape_defaults;
                let id = self.shapes_mut().add(*shape, &defaults);
                return Ok(CommandOutcome::ShapeAdded(id));
            }
            EditorCommand::UpdateShape { id, field, value } => {
                if !self.shapes_mut().update(*id, *field, value)? {
                    return Ok(CommandOutcome::NoOp);
                }
            }
            EditorCommand::RemoveShape { id } => {
                let had_selection = self.shapes().selected().is_some();
                if !self.shapes_mut().remove(*id) && !had_selection {
                    return Ok(CommandOutcome::NoOp);
                }
            }
            EditorCommand::SelectShape { id } => {
                if !self.shapes_mut().select(*id) {
                    return Ok(CommandOutcome::NoOp);
                }
            }
            EditorCommand::SetClip { clip } => {
                self.set_clip(*clip)?;
            }
        }
        Ok(CommandOutcome::Applied)
    }

    pub fn apply_all<'a>(
        &mut self,
        cmds: impl IntoIterator<Item = &'a EditorCommand>,
    ) -> CoverResult<Vec<CommandOutcome>> {
        cmds.into_iter().map(|c| self.apply(c)).collect()
    }
}
