//! Marathon API Models
//!
//! Serde types for the subset of the Marathon v2 REST API used by the deploy step.

pub mod models;

pub use models::{
    App, Deployment, DeploymentRef, ErrorResponse, GetAppResponse, HealthCheckResult, Task,
    UpdateAppResponse,
};
