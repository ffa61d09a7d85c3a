pub mod ja;
pub mod text_utilities;
pub mod transformer;
