//! Individual preprocessing steps, listed in pipeline order

pub mod rotation;
pub mod color;
pub mod exposure;
pub mod denoise;
pub mod sharpen;
