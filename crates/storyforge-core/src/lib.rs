pub mod adapters;
pub mod artifact;
pub mod compose;
pub mod config;
pub mod document;
pub mod error;
pub mod interpret;
pub mod io;
pub mod pipeline;

pub use error::{CoreError, Result};
