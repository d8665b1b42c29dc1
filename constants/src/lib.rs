pub mod class;
pub mod sampling;
