pub mod layer;
pub mod model;
