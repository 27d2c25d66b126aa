use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use base64::{Engine as _, engine::general_purpose};

use crate::{
    assets::decode::unpremultiply_rgba8_in_place,
    editor::session::EditorSession,
    foundation::error::{CoverError, CoverResult},
    render::{
        FrameRGBA, RenderBackend,
        cpu::CpuBackend,
        pipeline::render_frame,
        plan::RenderSettings,
    },
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl Export {
    /// `data:image/png;base64,...`
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&self.png)
        )
    }

    /// Write the PNG. An existing directory, or a path ending in a separator,
    /// receives `file_name` inside it; any other path is used as the file
    /// path. Missing directories are created.
    pub fn write_to(&self, dest: impl AsRef<Path>) -> CoverResult<PathBuf> {
        let dest = dest.as_ref();
        let names_dir = dest
            .as_os_str()
            .to_string_lossy()
            .chars()
            .next_back()
            .is_some_and(std::path::is_separator);
        let path = if names_dir || dest.is_dir() {
            dest.join(&self.file_name)
        } else {
            dest.to_path_buf()
        };
        ensure_parent_dir(&path)?;
        std::fs::write(&path, &self.png).map_err(|e| {
            CoverError::export(format!("write png '{}': {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), bytes = self.png.len(), "export written");
        Ok(path)
    }
}

pub fn ensure_parent_dir(path: &Path) -> CoverResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            CoverError::export(format!("create output dir '{}': {e}", parent.display()))
        })?;
    }
    Ok(())
}

pub fn encode_png(frame: &FrameRGBA) -> CoverResult<Vec<u8>> {
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| CoverError::export("frame buffer does not match its dimensions"))?;

    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| CoverError::export(format!("encode png: {e}")))?;
    Ok(png)
}

#[tracing::instrument(skip(session, backend))]
pub fn export_with(
    session: &EditorSession,
    backend: &mut dyn RenderBackend,
    settings: &RenderSettings,
) -> CoverResult<Export> {
    let frame = render_frame(session, backend, settings)?;
    let png = encode_png(&frame)?;
    Ok(Export {
        file_name: session.config().export_file_name.clone(),
        width: frame.width,
        height: frame.height,
        png,
    })
}

pub fn export(session: &EditorSession) -> CoverResult<Export> {
    let settings = RenderSettings::from_config(session.config());
    export_with(session, &mut CpuBackend::new(), &settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_has_png_prefix_and_roundtrips() {
        let e = Export {
            file_name: "cover-design.png".to_string(),
            width: 1,
            height: 1,
            png: vec![0x89, b'P', b'N', b'G'],
        };
        let uri = e.to_data_uri();
        let b64 = uri.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(general_purpose::STANDARD.decode(b64).unwrap(), e.png);
    }

    #[test]
    fn encode_png_unpremultiplies() {
        let frame = FrameRGBA {
            width: 1,
            height: 1,
            data: vec![64, 0, 0, 128],
            premultiplied: true,
        };
        let png = encode_png(&frame).unwrap();
        let back = image::load_from_memory(&png).unwrap().to_rgba8();
        let px = back.get_pixel(0, 0).0;
        assert_eq!(px[3], 128);
        assert!((i32::from(px[0]) - 128).abs() <= 1, "{px:?}");
    }

    #[test]
    fn encode_png_rejects_short_buffer() {
        let frame = FrameRGBA {
            width: 2,
            height: 2,
            data: vec![0; 4],
            premultiplied: false,
        };
        assert!(matches!(encode_png(&frame), Err(CoverError::Export(_))));
    }

    #[test]
    fn blank_session_exports_stage_times_ratio() {
        let s = EditorSession::default();
        let e = export(&s).unwrap();
        assert_eq!(e.file_name, "cover-design.png");
        assert_eq!((e.width, e.height), (900, 1800));
        let img = image::load_from_memory(&e.png).unwrap();
        assert_eq!((img.width(), img.height()), (900, 1800));
    }
}
