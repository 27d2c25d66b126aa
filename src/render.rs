pub mod cpu;
pub mod pipeline;
pub mod plan;

use crate::foundation::error::CoverResult;

use self::plan::RenderPlan;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Executes a [`RenderPlan`] into pixels.
pub trait RenderBackend {
    fn render_plan(&mut self, plan: &RenderPlan) -> CoverResult<FrameRGBA>;
}
