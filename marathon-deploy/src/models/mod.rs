//! Domain models

pub mod app;
pub mod deployment;
