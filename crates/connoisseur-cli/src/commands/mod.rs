pub mod catalog;
pub mod config;
pub mod import;
pub mod matching;

pub use catalog::show_catalog;
pub use import::run_import;
pub use matching::{run_batch, run_match};
