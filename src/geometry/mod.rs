//! Geographic primitives shared by selection and rendering

pub mod clip;
pub mod region;

pub use region::BoundingRegion;
