mod render;
mod summary;
pub mod views;

pub use render::render_text;
pub use views::{AllocationDocument, AllocationReport};
