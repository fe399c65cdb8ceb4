//! Deployment module

pub mod fsm;
pub mod gateway;
pub mod guard;
pub mod orchestrator;
pub mod poll;
pub mod probe;
pub mod publisher;
pub mod watcher;
