#[cfg(feature = "camera")]
pub mod camera;
pub mod frame;
pub mod shots;
pub mod tracker;
