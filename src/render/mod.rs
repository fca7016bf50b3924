/// Contain-fit placement of the garment template.
pub mod fit;
/// The document rasterizer.
pub mod pipeline;
/// Rendered pixel buffers.
pub mod raster;
