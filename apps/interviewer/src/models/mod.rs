pub mod interview;
pub mod result;
