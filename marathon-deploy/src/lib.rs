//! Marathon Deploy Library
//!
//! Publishes an app definition to Marathon and waits until the new version
//! has replaced the old one.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod storage;
pub mod utils;
