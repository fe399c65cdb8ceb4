//! Finite State Machine for a single deploy invocation

use serde::{Deserialize, Serialize};

/// Deployment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    /// Nothing attempted yet
    Start,

    /// Asking Marathon whether the app exists
    ProbingExistence,

    /// Waiting for an earlier rollout of the app to finish
    GuardingPriorDeployment,

    /// Creating or updating the app
    Publishing,

    /// Waiting for the new version to be rolled out and healthy
    AwaitingConvergence,

    /// Published, convergence not awaited
    Accepted,

    /// New version fully rolled out
    Converged,

    /// Deployment failed
    Failed,
}

impl DeploymentState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeploymentState::Accepted | DeploymentState::Converged | DeploymentState::Failed
        )
    }
}

/// Deployment event
#[derive(Debug, Clone)]
pub enum DeploymentEvent {
    /// Start the existence probe
    Probe,

    /// App exists and the prior deployment guard is enabled
    Guard,

    /// Publish the app definition
    Publish,

    /// Publication accepted, wait for convergence
    AwaitConvergence,

    /// Current step finished the invocation successfully
    Complete,

    /// Current step failed
    Fail(String),
}

/// Deployment FSM
#[derive(Debug, Clone)]
pub struct DeploymentFsm {
    state: DeploymentState,
    error: Option<String>,
    history: Vec<DeploymentState>,
}

impl DeploymentFsm {
    /// Create a new FSM in start state
    pub fn new() -> Self {
        Self {
            state: DeploymentState::Start,
            error: None,
            history: vec![DeploymentState::Start],
        }
    }

    /// Get current state
    pub fn state(&self) -> DeploymentState {
        self.state
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Every state entered so far, in order
    pub fn history(&self) -> &[DeploymentState] {
        &self.history
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: DeploymentEvent) -> Result<DeploymentState, String> {
        let new_state = match (&self.state, &event) {
            (DeploymentState::Start, DeploymentEvent::Probe) => DeploymentState::ProbingExistence,

            // From ProbingExistence
            (DeploymentState::ProbingExistence, DeploymentEvent::Guard) => {
                DeploymentState::GuardingPriorDeployment
            }
            (DeploymentState::ProbingExistence, DeploymentEvent::Publish) => {
                DeploymentState::Publishing
            }

            (DeploymentState::GuardingPriorDeployment, DeploymentEvent::Publish) => {
                DeploymentState::Publishing
            }

            // From Publishing
            (DeploymentState::Publishing, DeploymentEvent::AwaitConvergence) => {
                DeploymentState::AwaitingConvergence
            }
            (DeploymentState::Publishing, DeploymentEvent::Complete) => DeploymentState::Accepted,

            (DeploymentState::AwaitingConvergence, DeploymentEvent::Complete) => {
                DeploymentState::Converged
            }

            // Any step may fail
            (state, DeploymentEvent::Fail(err)) if !state.is_terminal() => {
                self.error = Some(err.clone());
                DeploymentState::Failed
            }

            // Invalid transitions
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        self.history.push(new_state);
        Ok(new_state)
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
