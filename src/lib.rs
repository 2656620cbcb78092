pub mod config;
pub mod filter;
pub mod join;
pub mod loader;
pub mod pipeline;
pub mod preprocess;
pub mod utils;
pub mod writer;
