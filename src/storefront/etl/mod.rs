pub mod config;
pub mod consolidate;
pub mod error;
pub mod io;
pub mod model;
pub mod normalize;
pub mod pipeline;

pub use error::{EtlError, Result};
