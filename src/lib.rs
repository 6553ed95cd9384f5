pub mod cli;
pub mod combat;
pub mod config;
pub mod error;
pub mod export_csv;
pub mod optimizer;
pub mod score;
pub mod validate;

pub use error::{Error, Result};
