//! Builders to construct reporters from configuration.

pub mod reporter_builder;

pub use reporter_builder::{build_http_reporter, build_reporter};
