pub mod geo;
pub mod layer;
pub mod vector;
