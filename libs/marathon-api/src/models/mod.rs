//! Marathon v2 API models

use serde::{Deserialize, Serialize};

/// Envelope returned by `GET /v2/apps/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAppResponse {
    pub app: App,
}

/// An application as reported by Marathon
///
/// Only the fields the deploy step reads are modelled; everything else is
/// kept in `extra` so a round trip does not lose data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub tasks_running: u32,

    #[serde(default)]
    pub tasks_staged: u32,

    #[serde(default)]
    pub tasks_healthy: u32,

    #[serde(default)]
    pub tasks_unhealthy: u32,

    #[serde(default)]
    pub tasks: Vec<Task>,

    /// Deployments currently affecting this app
    #[serde(default)]
    pub deployments: Vec<DeploymentRef>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A running instance of an app
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub health_check_results: Option<Vec<HealthCheckResult>>,
}

/// Result of one health check against a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub alive: bool,

    #[serde(default)]
    pub consecutive_failures: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// Reference to a deployment embedded in an app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRef {
    pub id: String,
}

/// An in-flight deployment from `GET /v2/deployments`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,

    pub version: String,

    #[serde(default)]
    pub affected_apps: Vec<String>,

    #[serde(default)]
    pub current_step: Option<u32>,

    #[serde(default)]
    pub total_steps: Option<u32>,
}

/// Response of `PUT /v2/apps/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppResponse {
    pub version: String,

    #[serde(default)]
    pub deployment_id: Option<String>,
}

/// Error body returned by Marathon on 4xx/5xx
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,

    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_app_response_parses_marathon_payload() {
        let body = r#"{
            "app": {
                "id": "/example-service",
                "instances": 2,
                "cpus": 0.5,
                "version": "2015-09-25T15:13:48.343Z",
                "tasksRunning": 2,
                "tasksStaged": 0,
                "tasksHealthy": 1,
                "tasksUnhealthy": 1,
                "deployments": [],
                "tasks": [
                    {
                        "id": "example-service.1",
                        "appId": "/example-service",
                        "version": "2015-09-25T15:13:48.343Z",
                        "healthCheckResults": [{"alive": true, "consecutiveFailures": 0}]
                    },
                    {
                        "id": "example-service.2",
                        "appId": "/example-service",
                        "version": "2015-09-25T15:13:48.343Z"
                    }
                ]
            }
        }"#;

        let response: GetAppResponse = serde_json::from_str(body).unwrap();
        let app = response.app;
        assert_eq!(app.id, "/example-service");
        assert_eq!(app.instances, Some(2));
        assert_eq!(app.tasks.len(), 2);
        assert_eq!(app.tasks_healthy, 1);
        assert!(app.tasks[1].health_check_results.is_none());
        assert_eq!(app.extra.get("cpus"), Some(&serde_json::json!(0.5)));
    }

    #[test]
    fn test_deployment_list_parses_affected_apps() {
        let body = r#"[{
            "id": "97c136bf-5a28-4821-9d94-480d9fbb01c8",
            "version": "2015-09-30T09:09:17.614Z",
            "affectedApps": ["/example-service"],
            "currentStep": 1,
            "totalSteps": 1
        }]"#;

        let deployments: Vec<Deployment> = serde_json::from_str(body).unwrap();
        assert_eq!(deployments[0].affected_apps, vec!["/example-service"]);
        assert_eq!(deployments[0].total_steps, Some(1));
    }
}
