use std::sync::Arc;

use crate::{
    assets::decode::{DecodedImage, decode_image},
    config::EditorConfig,
    editor::{image::ImageState, shapes::ShapeList},
    foundation::core::StageConfig,
    foundation::error::{CoverError, CoverResult},
    render::plan::ClipMask,
};

/// Handle for one upload request. Only the most recently issued ticket can
/// install its decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UploadTicket(u64);

impl UploadTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct EditorSession {
    config: EditorConfig,
    stage: StageConfig,
    image: Option<ImageState>,
    shapes: ShapeList,
    clip: Option<ClipMask>,
    last_ticket: u64,
    pending: Option<UploadTicket>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::with_config_unchecked(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> CoverResult<Self> {
        config.validate()?;
        Ok(Self::with_config_unchecked(config))
    }

    fn with_config_unchecked(config: EditorConfig) -> Self {
        Self {
            stage: config.stage,
            config,
            image: None,
            shapes: ShapeList::new(),
            clip: None,
            last_ticket: 0,
            pending: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn stage(&self) -> StageConfig {
        self.stage
    }

    pub fn set_stage(&mut self, stage: StageConfig) -> CoverResult<()> {
        stage.validate()?;
        self.stage = stage;
        tracing::debug!(width = stage.width, height = stage.height, "stage resized");
        Ok(())
    }

    pub fn set_stage_width_input(&mut self, raw: &str) -> CoverResult<()> {
        let width = parse_dimension("stage width", raw)?;
        self.set_stage(StageConfig {
            width,
            ..self.stage
        })
    }

    pub fn set_stage_height_input(&mut self, raw: &str) -> CoverResult<()> {
        let height = parse_dimension("stage height", raw)?;
        self.set_stage(StageConfig {
            height,
            ..self.stage
        })
    }

    pub fn image(&self) -> Option<&ImageState> {
        self.image.as_ref()
    }

    pub fn image_mut(&mut self) -> Option<(&mut ImageState, &EditorConfig)> {
        self.image.as_mut().map(|img| (img, &self.config))
    }

    pub fn require_image_mut(&mut self) -> CoverResult<(&mut ImageState, &EditorConfig)> {
        self.image_mut()
            .ok_or_else(|| CoverError::validation("no image has been uploaded"))
    }

    pub fn set_image(&mut self, mut image: ImageState) {
        image.clamp_scale_to(&self.config);
        self.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn shapes(&self) -> &ShapeList {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> &mut ShapeList {
        &mut self.shapes
    }

    pub fn clip(&self) -> Option<&ClipMask> {
        self.clip.as_ref()
    }

    pub fn set_clip(&mut self, clip: Option<ClipMask>) -> CoverResult<()> {
        if let Some(c) = &clip {
            c.validate()?;
        }
        self.clip = clip;
        Ok(())
    }

    /// Start an upload. Any earlier ticket still in flight is superseded.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.last_ticket += 1;
        let ticket = UploadTicket(self.last_ticket);
        if let Some(prev) = self.pending.replace(ticket) {
            tracing::debug!(superseded = prev.0, ticket = ticket.0, "upload superseded");
        }
        ticket
    }

    pub fn cancel_upload(&mut self) -> Option<UploadTicket> {
        self.pending.take()
    }

    pub fn pending_upload(&self) -> Option<UploadTicket> {
        self.pending
    }

    /// Decode upload bytes. Pure; may run off the session's thread.
    pub fn decode_upload(bytes: &[u8]) -> CoverResult<DecodedImage> {
        decode_image(bytes)
    }

    /// Install a decoded image if `ticket` is still the pending upload.
    ///
    /// Returns `false` when the ticket was superseded or cancelled. The new
    /// image starts at the default placement.
    pub fn finish_upload(&mut self, ticket: UploadTicket, decoded: DecodedImage) -> bool {
        if self.pending != Some(ticket) {
            tracing::warn!(ticket = ticket.0, "discarding stale upload");
            return false;
        }
        self.pending = None;
        tracing::debug!(
            ticket = ticket.0,
            width = decoded.width,
            height = decoded.height,
            "image installed"
        );
        self.set_image(ImageState::new(Arc::new(decoded)));
        true
    }

    pub fn fail_upload(&mut self, ticket: UploadTicket) {
        if self.pending == Some(ticket) {
            self.pending = None;
        }
    }

    pub fn upload(&mut self, bytes: &[u8]) -> CoverResult<&ImageState> {
        let ticket = self.begin_upload();
        let decoded = match Self::decode_upload(bytes) {
            Ok(d) => d,
            Err(e) => {
                self.fail_upload(ticket);
                return Err(e);
            }
        };
        self.finish_upload(ticket, decoded);
        self.image
            .as_ref()
            .ok_or_else(|| CoverError::decode("upload did not produce an image"))
    }
}

fn parse_dimension(name: &str, raw: &str) -> CoverResult<u32> {
    let v: u32 = raw.trim().parse().map_err(|_| {
        CoverError::validation(format!("{name}: '{raw}' is not a positive integer"))
    })?;
    if v == 0 {
        return Err(CoverError::validation(format!("{name} must be > 0")));
    }
    Ok(v)
}
