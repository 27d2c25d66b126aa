use std::sync::Arc;

use crate::{
    assets::decode::DecodedImage,
    foundation::core::{Affine, BezPath, Point},
    foundation::error::{CoverError, CoverResult},
    render::{
        FrameRGBA, RenderBackend,
        plan::{DrawOp, RenderPlan},
    },
};

#[derive(Default)]
pub struct CpuBackend {
    image_cache: Option<(Arc<DecodedImage>, vello_cpu::Image)>,
}

impl std::fmt::Debug for CpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuBackend")
            .field("cached_image", &self.image_cache.is_some())
            .finish()
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn image_paint_for(&mut self, img: &Arc<DecodedImage>) -> CoverResult<vello_cpu::Image> {
        if let Some((cached, paint)) = &self.image_cache
            && Arc::ptr_eq(cached, img)
        {
            return Ok(paint.clone());
        }

        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache = Some((img.clone(), paint.clone()));
        Ok(paint)
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(&mut self, plan: &RenderPlan) -> CoverResult<FrameRGBA> {
        let width: u16 = plan
            .width
            .try_into()
            .map_err(|_| CoverError::render("surface width exceeds u16"))?;
        let height: u16 = plan
            .height
            .try_into()
            .map_err(|_| CoverError::render("surface height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(CoverError::render("surface must be non-empty"));
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        let mut ctx = vello_cpu::RenderContext::new(width, height);

        if let Some([r, g, b, a]) = plan.background {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        for op in &plan.ops {
            draw_op(self, &mut ctx, op)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: plan.width,
            height: plan.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn draw_op(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
) -> CoverResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::Image {
            image,
            transform,
            clips,
        } => {
            let paint = backend.image_paint_for(image)?;

            if !clips.is_empty() {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_fill_rule(vello_cpu::peniko::Fill::EvenOdd);
                for clip in clips {
                    ctx.push_clip_layer(&bezpath_to_cpu(clip));
                }
                ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
            }

            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(image.width),
                f64::from(image.height),
            ));

            for _ in clips {
                ctx.pop_layer();
            }
            Ok(())
        }
        DrawOp::FillPath {
            path,
            transform,
            color,
        } => {
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                color[0], color[1], color[2], color[3],
            ));
            ctx.fill_path(&bezpath_to_cpu(path));
            Ok(())
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CoverResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CoverError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CoverError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CoverError::render("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}
