//! Application models

use serde::{Deserialize, Serialize};

/// Desired application definition loaded from the Marathon config file
///
/// Only `id` and `instances` are interpreted; every other field is forwarded
/// to Marathon untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSpec {
    /// Application id, unique per Marathon cluster
    pub id: String,

    /// Desired instance count. `None` keeps Marathon's current value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,

    /// Remaining app definition
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl AppSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            instances: None,
            payload: serde_json::Map::new(),
        }
    }

    pub fn with_instances(mut self, instances: u32) -> Self {
        self.instances = Some(instances);
        self
    }
}

/// Point-in-time status of an application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppStatus {
    pub id: String,
    pub instances: u32,
    pub tasks_running: u32,
    pub tasks_staged: u32,
    pub tasks_healthy: u32,
    pub tasks_unhealthy: u32,
    pub tasks: Vec<Task>,
}

impl AppStatus {
    /// Versions of all tasks, sorted
    pub fn current_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.tasks.iter().map(|t| t.version.clone()).collect();
        versions.sort();
        versions
    }
}

/// One running instance of an application version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    pub version: String,
    pub health_check_results: Vec<HealthCheckResult>,
}

impl Task {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            health_check_results: Vec::new(),
        }
    }

    pub fn with_health(mut self, alive: bool) -> Self {
        self.health_check_results.push(HealthCheckResult { alive });
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health_check_results.iter().any(|h| h.alive)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthCheckResult {
    pub alive: bool,
}

impl From<marathon_api::App> for AppStatus {
    fn from(app: marathon_api::App) -> Self {
        Self {
            id: app.id,
            instances: app.instances.unwrap_or_default(),
            tasks_running: app.tasks_running,
            tasks_staged: app.tasks_staged,
            tasks_healthy: app.tasks_healthy,
            tasks_unhealthy: app.tasks_unhealthy,
            tasks: app.tasks.into_iter().map(Task::from).collect(),
        }
    }
}

impl From<marathon_api::Task> for Task {
    fn from(task: marathon_api::Task) -> Self {
        Self {
            version: task.version,
            health_check_results: task
                .health_check_results
                .unwrap_or_default()
                .into_iter()
                .map(|h| HealthCheckResult { alive: h.alive })
                .collect(),
        }
    }
}

/// Normalize an app id to Marathon's absolute form (`/group/app`)
pub fn absolute_app_id(id: &str) -> String {
    format!("/{}", id.trim_matches('/'))
}
