//! Waveform rasterization and caching.

pub mod cache;
pub mod envelope;
pub mod raster;
