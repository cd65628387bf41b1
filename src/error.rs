//! Errors are `anyhow` throughout; callers add context as they propagate them.

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
