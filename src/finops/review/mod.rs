pub mod aggregate;
pub mod classify;
pub mod config;
pub mod cost_model;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod narrative;
pub mod pipeline;
pub mod report;

pub use error::{Result, ToolError};
