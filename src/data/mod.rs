pub mod dataset;
pub mod loader;
pub mod matlab;
pub mod parser;

pub use dataset::{Dataset, DatasetStore};
pub use loader::{load_all, load_file, LoadReport};
