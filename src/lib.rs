pub mod args;
pub mod commands;
mod config;
pub mod convert;
mod db;
mod error;
pub mod model;
pub mod rates;
pub mod report;
#[cfg(test)]
pub(crate) mod test;
mod utils;

pub use config::Config;
pub use error::Error;
pub use error::Result;
