use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use image::ImageEncoder as _;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use crate::assets::source::AssetSource;
use crate::document::model::Document;
use crate::foundation::core::Size;
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::pipeline::render;
use crate::render::raster::Raster;

pub const DEFAULT_EXPORT_SCALE: u32 = 4;
pub const MIN_EXPORT_SCALE: u32 = 2;
pub const MAX_EXPORT_SCALE: u32 = 4;

pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Export settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOpts {
    pub(crate) scale: u32,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            scale: DEFAULT_EXPORT_SCALE,
        }
    }
}

impl ExportOpts {
    /// Output pixels per container pixel. Checked against `2..=4` at export time.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn validate(&self) -> StudioResult<()> {
        if !(MIN_EXPORT_SCALE..=MAX_EXPORT_SCALE).contains(&self.scale) {
            return Err(StudioError::validation(format!(
                "export scale must be in {MIN_EXPORT_SCALE}..={MAX_EXPORT_SCALE}, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Output pixel size for `container` at `scale`.
pub fn export_size(container: Size, scale: u32) -> StudioResult<(u32, u32)> {
    let dim = |v: f64| -> StudioResult<u32> {
        let px = (v * f64::from(scale)).round();
        if !px.is_finite() || px < 1.0 || px > f64::from(u32::MAX) {
            return Err(StudioError::validation(format!(
                "container size {}x{} cannot be exported",
                container.width, container.height
            )));
        }
        Ok(px as u32)
    };
    Ok((dim(container.width)?, dim(container.height)?))
}

/// Render `doc` at `opts.scale` times the unzoomed container size.
///
/// The on-screen zoom plays no part: the same container always yields the same pixel size.
#[tracing::instrument(skip(doc, source), fields(template = %doc.template.id))]
pub fn export_image(
    doc: &Document,
    container: Size,
    opts: &ExportOpts,
    source: &dyn AssetSource,
) -> StudioResult<Raster> {
    opts.validate()?;
    let (w, h) = export_size(container, opts.scale)?;
    render(doc, w, h, f64::from(opts.scale), source)
}

/// `custom-<unix-epoch-ms>.png`
pub fn download_filename(now: SystemTime) -> String {
    let ms = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("custom-{ms}.png")
}

/// The host's "save as file" primitive.
pub trait FileSaver {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> anyhow::Result<()>;
}

/// Saves downloads into a directory, creating it on first use.
#[derive(Clone, Debug)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create download dir '{}'", self.dir.display()))?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))
    }
}

/// Encode `raster` for a local download (maximum compression).
pub fn encode_download_png(raster: &Raster) -> StudioResult<Vec<u8>> {
    let straight = raster.to_straight_rgba8();
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive)
        .write_image(
            &straight,
            raster.width,
            raster.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| StudioError::encode(format!("png encode failed: {e}")))?;
    Ok(out)
}

/// Hand `raster` to `saver` as a PNG named `filename`.
pub fn download_local(
    raster: &Raster,
    filename: &str,
    saver: &mut dyn FileSaver,
) -> StudioResult<()> {
    let bytes = encode_download_png(raster)?;
    saver.save(filename, &bytes)?;
    tracing::debug!(filename, bytes = bytes.len(), "download saved");
    Ok(())
}

/// Binary payload for the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Encode `raster` as the upload payload.
pub fn prepare_for_upload(raster: &Raster, filename: &str) -> StudioResult<UploadFile> {
    let img = raster.to_rgba_image()?;
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| StudioError::encode(format!("png encode failed: {e}")))?;
    Ok(UploadFile {
        filename: filename.to_string(),
        content_type: PNG_CONTENT_TYPE,
        bytes: cursor.into_inner(),
    })
}

/// Identifier returned by the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(pub String);

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote store for finished designs.
pub trait CustomClothingStore {
    fn create(&mut self, name: &str, file: &UploadFile) -> anyhow::Result<ResourceId>;
}

/// Pass `file` to `store`. Collaborator failures come back as [`StudioError::Upload`].
pub fn save_design(
    store: &mut dyn CustomClothingStore,
    name: &str,
    file: &UploadFile,
) -> StudioResult<ResourceId> {
    match store.create(name, file) {
        Ok(id) => {
            tracing::debug!(%id, name, "design saved");
            Ok(id)
        }
        Err(e) => {
            tracing::warn!(name, error = %format!("{e:#}"), "design upload failed");
            Err(StudioError::Upload(e))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/adapter.rs"]
mod tests;
