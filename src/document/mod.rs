//! Document ingestion, rasterization and output files.

mod input;
mod output;
mod raster;

pub use input::{DocumentInput, MediaKind, ACCEPTED_EXTENSIONS};
pub use output::{
    annotated_file_name, output_file_name, region_listing, write_annotated, write_text,
};
pub use raster::{
    scale_factor, PageRenderer, PopplerRenderer, RasterPage, Rasterizer, RenderedPage,
    DEFAULT_DPI, PDF_POINTS_PER_INCH,
};
