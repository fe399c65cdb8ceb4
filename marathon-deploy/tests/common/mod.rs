//! Shared test fixtures

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use http::StatusCode;

use marathon_deploy::deploy::gateway::OrchestratorGateway;
use marathon_deploy::errors::GatewayError;
use marathon_deploy::models::app::{AppSpec, AppStatus, Task};
use marathon_deploy::models::deployment::{CreatedApp, DeploymentRecord, UpdatedApp};

/// Scripted failure of a gateway call
#[derive(Debug, Clone, Copy)]
pub enum Fail {
    NotFound,
    Server,
}

impl Fail {
    fn into_error(self, what: &str) -> GatewayError {
        match self {
            Fail::NotFound => GatewayError::NotFound(what.to_string()),
            Fail::Server => GatewayError::ServerError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: format!("{} failed", what),
            },
        }
    }
}

/// A recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetApp(String),
    ListDeployments,
    CreateApp(String),
    UpdateApp(String),
}

/// Responses served in order; the last one repeats
struct Script<T> {
    responses: Mutex<VecDeque<Result<T, Fail>>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
        }
    }

    fn push(&self, response: Result<T, Fail>) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn next(&self, what: &str) -> Result<T, GatewayError> {
        let mut responses = self.responses.lock().unwrap();
        let response = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        match response {
            Some(response) => response.map_err(|fail| fail.into_error(what)),
            None => panic!("unexpected call: {}", what),
        }
    }
}

/// In-memory gateway serving scripted responses and recording calls
pub struct ScriptedGateway {
    get_app: Script<AppStatus>,
    deployments: Script<Vec<DeploymentRecord>>,
    create: Script<CreatedApp>,
    update: Script<UpdatedApp>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            get_app: Script::new(),
            deployments: Script::new(),
            create: Script::new(),
            update: Script::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_get_app(self, response: Result<AppStatus, Fail>) -> Self {
        self.get_app.push(response);
        self
    }

    pub fn with_deployments(self, response: Result<Vec<DeploymentRecord>, Fail>) -> Self {
        self.deployments.push(response);
        self
    }

    pub fn with_create(self, response: Result<CreatedApp, Fail>) -> Self {
        self.create.push(response);
        self
    }

    pub fn with_update(self, response: Result<UpdatedApp, Fail>) -> Self {
        self.update.push(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl OrchestratorGateway for ScriptedGateway {
    async fn get_app(&self, app_id: &str) -> Result<AppStatus, GatewayError> {
        self.record(Call::GetApp(app_id.to_string()));
        self.get_app.next("get app")
    }

    async fn list_deployments(&self) -> Result<Vec<DeploymentRecord>, GatewayError> {
        self.record(Call::ListDeployments);
        self.deployments.next("list deployments")
    }

    async fn create_app(&self, spec: &AppSpec) -> Result<CreatedApp, GatewayError> {
        self.record(Call::CreateApp(spec.id.clone()));
        self.create.next("create app")
    }

    async fn update_app(&self, app_id: &str, _spec: &AppSpec) -> Result<UpdatedApp, GatewayError> {
        self.record(Call::UpdateApp(app_id.to_string()));
        self.update.next("update app")
    }
}

/// App status with one task per version and Marathon's healthy counter
pub fn status(instances: u32, versions: &[&str], healthy: u32) -> AppStatus {
    AppStatus {
        id: "/svc".to_string(),
        instances,
        tasks_running: versions.len() as u32,
        tasks_staged: 0,
        tasks_healthy: healthy,
        tasks_unhealthy: 0,
        tasks: versions
            .iter()
            .enumerate()
            .map(|(i, v)| Task::new(*v).with_health((i as u32) < healthy))
            .collect(),
    }
}

pub fn deployment(version: &str, app_id: &str) -> DeploymentRecord {
    DeploymentRecord {
        id: format!("deployment-{}", version),
        version: version.to_string(),
        affected_app_ids: vec![app_id.to_string()],
    }
}

pub fn created(version: Option<&str>) -> CreatedApp {
    CreatedApp {
        id: "/svc".to_string(),
        version: version.map(String::from),
        deployment_ids: vec!["deployment-1".to_string()],
    }
}

pub fn updated(version: &str) -> UpdatedApp {
    UpdatedApp {
        version: version.to_string(),
        deployment_id: Some(format!("deployment-{}", version)),
    }
}
