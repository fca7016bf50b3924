pub mod decode;
pub mod source;
pub mod svg_raster;
pub(crate) mod text;
