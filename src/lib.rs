pub mod api;
pub mod args;
pub mod cache;
pub mod commands;
mod config;
mod error;
pub mod model;
mod utils;
pub mod view;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::Config;
pub use error::Error;
pub use error::Result;
