use crate::{
    editor::session::EditorSession,
    foundation::error::CoverResult,
    render::{
        FrameRGBA, RenderBackend,
        plan::{RenderSettings, compile_scene},
    },
};

/// Compile and render the session's current composite.
///
/// Pipeline:
/// 1. [`compile_scene`]: session state to a device-space [`RenderPlan`](crate::RenderPlan)
/// 2. [`RenderBackend::render_plan`]: plan to premultiplied RGBA8
#[tracing::instrument(skip(session, backend), fields(shapes = session.shapes().len()))]
pub fn render_frame(
    session: &EditorSession,
    backend: &mut dyn RenderBackend,
    settings: &RenderSettings,
) -> CoverResult<FrameRGBA> {
    let plan = compile_scene(session, settings)?;
    tracing::debug!(
        width = plan.width,
        height = plan.height,
        ops = plan.ops.len(),
        "render plan compiled"
    );
    backend.render_plan(&plan)
}

/// Render at 1:1 density with the session's own settings, as an on-screen
/// stage would show it.
pub fn render_preview(
    session: &EditorSession,
    backend: &mut dyn RenderBackend,
) -> CoverResult<FrameRGBA> {
    let settings = RenderSettings::from_config(session.config()).preview();
    render_frame(session, backend, &settings)
}
