pub mod japanese;
pub mod transforms;
