#![forbid(unsafe_code)]
//! Layered garment customization.
//!
//! A [`Document`] holds a garment template, its customization (tint, pattern) and an ordered
//! stack of text, logo and sticker layers. [`Editor`] wires the document to undo history,
//! pointer gestures and the viewport. [`render()`] is the single rasterizer used for both
//! preview checks and export.

pub mod assets;
pub mod document;
pub mod effects;
pub mod export;
pub mod foundation;
pub mod history;
pub mod interaction;
pub mod render;
pub mod session;

pub use assets::source::{
    AssetRef, AssetSource, FontBook, FsAssetSource, MemoryAssetSource, PreparedAsset,
};
pub use document::layer::{
    FontStyle, FontWeight, ImageStyle, ImageStylePatch, Layer, LayerId, LayerKind, LayerPatch,
    LayerStyle, Position, TextStyle, TextStylePatch,
};
pub use document::model::{
    Customization, CustomizationPatch, Document, GarmentTemplate, LayerDirection, Pattern,
};
pub use export::adapter::{
    CustomClothingStore, DirectorySaver, ExportOpts, FileSaver, ResourceId, UploadFile,
    download_filename, download_local, export_image, prepare_for_upload, save_design,
};
pub use foundation::color::Rgb8;
pub use foundation::core::{Affine, Point, Rect, Size, Vec2};
pub use foundation::error::{StudioError, StudioResult};
pub use history::History;
pub use interaction::controller::{Controller, GestureOutcome, GestureState, Key, PointerEvent};
pub use interaction::viewport::Viewport;
pub use render::pipeline::{RenderOpts, render, render_with_opts};
pub use render::raster::Raster;
pub use session::editor::{Editor, EditorOpts};
