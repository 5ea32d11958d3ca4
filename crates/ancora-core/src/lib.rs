pub mod access;
pub mod concession;
pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod offer;
pub mod paths;
pub mod render;
pub mod session;
pub mod types;

pub use error::{AncoraError, Result};
