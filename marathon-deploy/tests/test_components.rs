//! Probe, guard, publisher and watcher tests

mod common;

use std::time::Duration;

use tokio_test::{assert_err, assert_ok};

use common::{created, deployment, status, updated, Call, Fail, ScriptedGateway};
use marathon_deploy::deploy::guard::await_no_prior_deployment;
use marathon_deploy::deploy::poll::{Clock, ManualClock, PollOptions};
use marathon_deploy::deploy::probe::app_exists;
use marathon_deploy::deploy::publisher::publish;
use marathon_deploy::deploy::watcher::{ConvergenceWatcher, MissingVersionPolicy};
use marathon_deploy::errors::DeployError;
use marathon_deploy::models::app::{AppSpec, AppStatus};

fn secs(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

#[tokio::test]
async fn test_probe_existing_app() {
    let gateway = ScriptedGateway::new().with_get_app(Ok(status(1, &["v1"], 1)));
    assert!(assert_ok!(app_exists(&gateway, "/svc").await));
}

#[tokio::test]
async fn test_probe_missing_app() {
    let gateway = ScriptedGateway::new().with_get_app(Err(Fail::NotFound));
    assert!(!assert_ok!(app_exists(&gateway, "/svc").await));
}

#[tokio::test]
async fn test_probe_server_error() {
    let gateway = ScriptedGateway::new().with_get_app(Err(Fail::Server));
    let err = assert_err!(app_exists(&gateway, "/svc").await);
    assert!(err.gateway_error().is_some());
    assert!(matches!(err, DeployError::ProbeFailed { .. }));
}

#[tokio::test]
async fn test_guard_ignores_other_apps() {
    let gateway = ScriptedGateway::new().with_deployments(Ok(vec![deployment("v7", "/other")]));
    let clock = ManualClock::new();

    assert_ok!(await_no_prior_deployment(&gateway, &clock, "/svc", PollOptions::default()).await);
    assert_eq!(gateway.calls(), vec![Call::ListDeployments]);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_guard_times_out_at_budget() {
    let gateway = ScriptedGateway::new().with_deployments(Ok(vec![deployment("v1", "/svc")]));
    let clock = ManualClock::new();
    let options = PollOptions::new(secs(5), secs(12));

    let err = assert_err!(await_no_prior_deployment(&gateway, &clock, "/svc", options).await);

    assert!(matches!(err, DeployError::PriorDeploymentTimeout { .. }));
    // checks at 0, 5, 10 and 12 seconds
    assert_eq!(gateway.count(|c| *c == Call::ListDeployments), 4);
    assert_eq!(clock.sleeps(), vec![secs(5), secs(5), secs(2)]);
}

#[tokio::test]
async fn test_guard_read_failure() {
    let gateway = ScriptedGateway::new().with_deployments(Err(Fail::Server));
    let clock = ManualClock::new();

    let err = assert_err!(
        await_no_prior_deployment(&gateway, &clock, "/svc", PollOptions::default()).await
    );
    assert!(matches!(err, DeployError::PriorDeploymentCheckFailed { .. }));
}

#[tokio::test]
async fn test_publish_create_defaults_to_one_instance() {
    let gateway = ScriptedGateway::new().with_create(Ok(created(Some("v1"))));

    let outcome = assert_ok!(publish(&gateway, "/svc", false, &AppSpec::new("/svc")).await);

    assert_eq!(outcome.version, "v1");
    assert_eq!(outcome.instances, 1);
    assert_eq!(outcome.deployment_id.as_deref(), Some("deployment-1"));
    assert_eq!(gateway.calls(), vec![Call::CreateApp("/svc".to_string())]);
}

#[tokio::test]
async fn test_publish_create_reads_version_from_deployments() {
    let gateway = ScriptedGateway::new()
        .with_create(Ok(created(None)))
        .with_deployments(Ok(vec![deployment("v1", "/svc"), deployment("v8", "/other")]));

    let outcome = assert_ok!(publish(&gateway, "/svc", false, &AppSpec::new("/svc")).await);
    assert_eq!(outcome.version, "v1");
}

#[tokio::test]
async fn test_publish_create_ambiguous_version() {
    let gateway = ScriptedGateway::new()
        .with_create(Ok(created(None)))
        .with_deployments(Ok(vec![deployment("v1", "/svc"), deployment("v2", "/svc")]));

    let err = assert_err!(publish(&gateway, "/svc", false, &AppSpec::new("/svc")).await);
    match err {
        DeployError::AmbiguousVersion { versions, .. } => assert_eq!(versions, vec!["v1", "v2"]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_publish_update_keeps_current_size() {
    let gateway = ScriptedGateway::new()
        .with_get_app(Ok(status(4, &["v1", "v1", "v1", "v1"], 4)))
        .with_update(Ok(updated("v2")));

    let outcome = assert_ok!(publish(&gateway, "/svc", true, &AppSpec::new("/svc")).await);

    assert_eq!(outcome.version, "v2");
    assert_eq!(outcome.instances, 4);
    assert_eq!(outcome.convergence_timeout(secs(300)), secs(1200));
    assert_eq!(gateway.count(|c| matches!(c, Call::CreateApp(_))), 0);
}

#[tokio::test]
async fn test_publish_update_rejected() {
    let gateway = ScriptedGateway::new()
        .with_get_app(Ok(status(1, &["v1"], 1)))
        .with_update(Err(Fail::Server));

    let err = assert_err!(publish(&gateway, "/svc", true, &AppSpec::new("/svc")).await);
    assert!(matches!(err, DeployError::PublishFailed { .. }));
}

#[tokio::test]
async fn test_watcher_records_first_healthy_instance() {
    let gateway = ScriptedGateway::new()
        .with_get_app(Ok(status(2, &["v1", "v2"], 1)))
        .with_get_app(Ok(status(2, &["v2", "v1"], 1)))
        .with_get_app(Ok(status(2, &["v2", "v2"], 2)));
    let clock = ManualClock::new();
    let published_at = clock.now();
    clock.advance(secs(3));

    let watcher = ConvergenceWatcher::new(&gateway, &clock, MissingVersionPolicy::Reconcile);
    let report = assert_ok!(
        watcher
            .await_convergence("/svc", "v2", PollOptions::new(secs(5), secs(60)), published_at)
            .await
    );

    assert_eq!(report.polls, 3);
    assert_eq!(report.elapsed, secs(10));
    // the v2 task only passes its health check on the second poll
    assert_eq!(report.time_to_first_healthy, Some(secs(8)));
}

#[tokio::test]
async fn test_watcher_scaled_away_version_is_unreachable() {
    let scaled_down = AppStatus {
        id: "/svc".to_string(),
        ..Default::default()
    };
    let gateway = ScriptedGateway::new()
        .with_get_app(Ok(scaled_down))
        .with_deployments(Ok(vec![]));
    let clock = ManualClock::new();

    let watcher = ConvergenceWatcher::new(&gateway, &clock, MissingVersionPolicy::Reconcile);
    let err = assert_err!(
        watcher
            .await_convergence("/svc", "v2", PollOptions::default(), clock.now())
            .await
    );

    match err {
        DeployError::VersionUnreachable {
            current_versions, ..
        } => assert!(current_versions.is_empty()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(gateway.count(|c| matches!(c, Call::GetApp(_))), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_watcher_waits_while_version_is_deploying() {
    let gateway = ScriptedGateway::new()
        .with_get_app(Ok(status(1, &["v1"], 1)))
        .with_get_app(Ok(status(1, &["v2"], 1)))
        .with_deployments(Ok(vec![deployment("v2", "/svc")]));
    let clock = ManualClock::new();

    let watcher = ConvergenceWatcher::new(&gateway, &clock, MissingVersionPolicy::Reconcile);
    let report = assert_ok!(
        watcher
            .await_convergence("/svc", "v2", PollOptions::default(), clock.now())
            .await
    );

    assert_eq!(report.polls, 2);
    assert_eq!(gateway.count(|c| *c == Call::ListDeployments), 1);
}

#[tokio::test]
async fn test_watcher_empty_task_list_is_not_success() {
    let mut starting = status(2, &[], 0);
    starting.tasks_staged = 2;
    let gateway = ScriptedGateway::new()
        .with_get_app(Ok(starting))
        .with_deployments(Ok(vec![]));
    let clock = ManualClock::new();

    let watcher = ConvergenceWatcher::new(&gateway, &clock, MissingVersionPolicy::Reconcile);
    let err = assert_err!(
        watcher
            .await_convergence("/svc", "v2", PollOptions::default(), clock.now())
            .await
    );
    assert!(matches!(err, DeployError::VersionUnreachable { .. }));
}
