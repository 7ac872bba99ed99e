//! Unit tests for individual components

mod audit_test;
mod config_test;
mod error_test;
mod lifecycle_test;
mod reporter_test;
