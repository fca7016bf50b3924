use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::assets::decode::{PreparedImage, PreparedSvg, decode_image, looks_like_svg, parse_svg};
use crate::foundation::error::{StudioError, StudioResult};

/// Largest logo upload accepted by [`validate_logo_upload`].
pub const MAX_LOGO_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for logo uploads.
pub const ACCEPTED_LOGO_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Image reference: a `data:` URI (uploaded file) or a relative library asset path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Embed `bytes` as a base64 `data:` URI.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{mime};base64,{b64}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_data_uri() {
            // uploads can be megabytes long
            let head: String = self.0.chars().take(32).collect();
            write!(f, "{head}...")
        } else {
            f.write_str(&self.0)
        }
    }
}

struct DataUri {
    mime: String,
    bytes: Vec<u8>,
}

fn decode_data_uri(uri: &str) -> StudioResult<DataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| StudioError::validation("not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| StudioError::validation("data URI has no ',' separator"))?;
    let (mime, is_b64) = match meta.strip_suffix(";base64") {
        Some(m) => (m, true),
        None => (meta, false),
    };
    let bytes = if is_b64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| StudioError::validation(format!("invalid base64 payload: {e}")))?
    } else {
        percent_encoding::percent_decode_str(payload).collect()
    };
    Ok(DataUri {
        mime: mime.to_ascii_lowercase(),
        bytes,
    })
}

/// Check a logo upload and turn it into a data-URI reference.
///
/// Rejects files over `max_bytes` and anything that is not JPEG, PNG or WEBP.
pub fn validate_logo_upload(bytes: &[u8], mime: &str, max_bytes: usize) -> StudioResult<AssetRef> {
    if bytes.len() > max_bytes {
        tracing::warn!(len = bytes.len(), max_bytes, "logo upload rejected: too large");
        return Err(StudioError::validation(format!(
            "logo upload is {} bytes (max {max_bytes})",
            bytes.len()
        )));
    }
    let mime = mime.trim().to_ascii_lowercase();
    if !ACCEPTED_LOGO_MIME_TYPES.contains(&mime.as_str()) {
        tracing::warn!(%mime, "logo upload rejected: unsupported type");
        return Err(StudioError::validation(format!(
            "unsupported logo type '{mime}' (expected jpeg, png or webp)"
        )));
    }
    Ok(AssetRef::from_bytes(&mime, bytes))
}

/// Normalize and validate library-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> StudioResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StudioError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(StudioError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StudioError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StudioError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// A decoded image asset with known intrinsic size.
#[derive(Clone, Debug)]
pub enum PreparedAsset {
    Raster(PreparedImage),
    Vector(PreparedSvg),
}

impl PreparedAsset {
    /// Intrinsic `(width, height)` in pixels (SVG user units for vectors).
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match self {
            Self::Raster(img) => (f64::from(img.width), f64::from(img.height)),
            Self::Vector(svg) => {
                let s = svg.tree.size();
                (f64::from(s.width()), f64::from(s.height()))
            }
        }
    }

    /// Height divided by width, `1.0` for degenerate sizes.
    pub fn aspect_ratio(&self) -> f64 {
        let (w, h) = self.intrinsic_size();
        if w > 0.0 && h > 0.0 { h / w } else { 1.0 }
    }
}

/// Font request derived from a text layer's style.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontQuery {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

/// Font bytes plus the variant they actually are.
///
/// When `bold`/`italic` differ from the query the renderer synthesises the difference.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub bytes: Arc<Vec<u8>>,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Clone, Debug, Default)]
struct FamilyFaces {
    // indexed by `bold as usize * 2 + italic as usize`
    faces: [Option<Arc<Vec<u8>>>; 4],
}

impl FamilyFaces {
    fn best(&self, bold: bool, italic: bool) -> Option<FontFace> {
        let wanted = [(bold, italic), (bold, false), (false, italic), (false, false)];
        wanted
            .into_iter()
            .chain([(true, true), (true, false), (false, true)])
            .find_map(|(b, i)| {
                self.faces[usize::from(b) * 2 + usize::from(i)]
                    .clone()
                    .map(|bytes| FontFace {
                        bytes,
                        bold: b,
                        italic: i,
                    })
            })
    }
}

/// Registered font families, matched case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    families: HashMap<String, FamilyFaces>,
    fallback_family: Option<String>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one face of `family`, replacing a previous face of the same variant.
    pub fn register(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) {
        let entry = self.families.entry(family.trim().to_lowercase()).or_default();
        entry.faces[usize::from(bold) * 2 + usize::from(italic)] = Some(Arc::new(bytes));
    }

    /// Register the regular face of `family`.
    pub fn with_font(mut self, family: &str, bytes: Vec<u8>) -> Self {
        self.register(family, false, false, bytes);
        self
    }

    /// Read and register the regular face of `family` from disk.
    pub fn register_file(&mut self, family: &str, path: &Path) -> anyhow::Result<()> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        self.register(family, false, false, bytes);
        Ok(())
    }

    /// Family used when a requested family is not registered.
    pub fn with_fallback_family(mut self, family: &str) -> Self {
        self.fallback_family = Some(family.trim().to_lowercase());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Pick the closest registered face for `query`.
    pub fn resolve(&self, query: &FontQuery) -> StudioResult<FontFace> {
        let key = query.family.trim().to_lowercase();
        let family = self.families.get(&key).or_else(|| {
            self.fallback_family
                .as_ref()
                .and_then(|f| self.families.get(f))
        });
        family
            .and_then(|f| f.best(query.bold, query.italic))
            .ok_or_else(|| {
                StudioError::asset_load(format!("font:{}", query.family), "font family not registered")
            })
    }
}

/// Resolves asset references and fonts for the render pipeline.
///
/// Implementations own IO policy (timeouts, retries). Failures must be reported as errors, never
/// as empty images.
pub trait AssetSource {
    /// Read the raw bytes of a normalized library path.
    fn read_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>>;

    /// Fonts available to text layers.
    fn fonts(&self) -> &FontBook;

    /// Resolve and decode an image reference (data URI or library path).
    fn load_image(&self, asset: &AssetRef) -> StudioResult<PreparedAsset> {
        let fail = |reason: &dyn fmt::Display| {
            tracing::warn!(asset = %asset, %reason, "asset load failed");
            StudioError::asset_load(asset.as_str(), reason)
        };

        let (bytes, svg_hint) = if asset.is_data_uri() {
            let uri = decode_data_uri(asset.as_str()).map_err(|e| fail(&e))?;
            let hint = uri.mime == "image/svg+xml";
            (uri.bytes, hint)
        } else {
            let path = normalize_rel_path(asset.as_str()).map_err(|e| fail(&e))?;
            let bytes = self.read_bytes(&path).map_err(|e| fail(&format!("{e:#}")))?;
            (bytes, path.to_ascii_lowercase().ends_with(".svg"))
        };

        if svg_hint || looks_like_svg(&bytes) {
            parse_svg(&bytes)
                .map(PreparedAsset::Vector)
                .map_err(|e| fail(&e))
        } else {
            decode_image(&bytes)
                .map(PreparedAsset::Raster)
                .map_err(|e| fail(&e))
        }
    }

    /// Resolve a font face for a text layer.
    fn load_font(&self, query: &FontQuery) -> StudioResult<FontFace> {
        self.fonts().resolve(query).inspect_err(|e| {
            tracing::warn!(family = %query.family, error = %e, "font load failed");
        })
    }
}

/// Library assets read from a directory on disk.
#[derive(Clone, Debug)]
pub struct FsAssetSource {
    root: PathBuf,
    fonts: FontBook,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fonts: FontBook::default(),
        }
    }

    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    fn read_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let p = self.root.join(Path::new(path));
        std::fs::read(&p).with_context(|| format!("failed to read asset '{}'", p.display()))
    }

    fn fonts(&self) -> &FontBook {
        &self.fonts
    }
}

/// Library assets held in memory, keyed by normalized path.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, Arc<Vec<u8>>>,
    fonts: FontBook,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) -> StudioResult<()> {
        let key = normalize_rel_path(path)?;
        self.files.insert(key, Arc::new(bytes));
        Ok(())
    }

    pub fn with_file(mut self, path: &str, bytes: Vec<u8>) -> StudioResult<Self> {
        self.insert(path, bytes)?;
        Ok(self)
    }

    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.fonts = fonts;
        self
    }
}

impl AssetSource for MemoryAssetSource {
    fn read_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .get(path)
            .map(|b| b.as_ref().clone())
            .ok_or_else(|| anyhow::anyhow!("no in-memory asset '{path}'"))
    }

    fn fonts(&self) -> &FontBook {
        &self.fonts
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
