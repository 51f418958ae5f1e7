pub mod utils;
pub mod viewer;
