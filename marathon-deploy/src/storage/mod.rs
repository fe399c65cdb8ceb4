//! Configuration and app definition files

pub mod descriptor;
pub mod settings;
