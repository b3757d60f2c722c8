pub mod charset;
pub mod grid;
pub mod mapping;
