//! Common value types shared by the math engine and its callers

pub mod errors;
pub mod fixed_point;
