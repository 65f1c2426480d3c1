pub mod curve;
pub mod mathx;
pub mod smooth;
pub mod time;
