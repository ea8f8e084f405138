//! Core library for the finops-review command line application.
//!
//! The library turns an input P&L workbook into a benchmark analysis workbook
//! and a deep dive narrative. Loading and writing files live under
//! [`finops::review::io`], the data representations inside
//! [`finops::review::model`], the expense classifier and rollups in
//! [`finops::review::classify`] and [`finops::review::aggregate`], the
//! Central Finance transition in [`finops::review::cost_model`], and the
//! orchestration under [`finops::review::pipeline`].

pub mod finops;

pub use finops::review::{
    Result, ToolError, aggregate, classify, config, cost_model, error, io, logging, model,
    narrative, pipeline, report,
};
