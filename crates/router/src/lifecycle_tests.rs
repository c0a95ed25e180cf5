use std::collections::BTreeMap;

use super::*;
use crate::driver::FakeDriver;

fn sample_spec(project_mount: impl Into<String>) -> ManagedContainer {
    ManagedContainer {
        name: "oc-abcdef12-sess".to_string(),
        image: "node:20".to_string(),
        project_mount: project_mount.into(),
        workdir: "/workspace".to_string(),
        env: BTreeMap::new(),
        network: None,
        labels: BTreeMap::new(),
        mounts: Vec::new(),
        command: vec!["sleep".to_string(), "infinity".to_string()],
    }
}

#[tokio::test]
async fn ensure_running_is_a_no_op_when_already_running() {
    let driver = FakeDriver::new();
    driver.push_success("true");
    let manager = LifecycleManager::new(&driver, "docker");

    let outcome = manager
        .ensure_running(&sample_spec("/home/user/project"), "proj", "scope", true, true, true)
        .await
        .unwrap();

    assert_eq!(outcome, EnsureOutcome::AlreadyRunning);
    assert_eq!(driver.calls().len(), 1);
}

#[tokio::test]
async fn ensure_running_starts_a_stopped_container() {
    let driver = FakeDriver::new();
    driver.push_success("false"); // inspect
    driver.push_success(""); // start
    let manager = LifecycleManager::new(&driver, "docker");

    let outcome = manager
        .ensure_running(&sample_spec("/home/user/project"), "proj", "scope", true, true, true)
        .await
        .unwrap();

    assert_eq!(outcome, EnsureOutcome::Started);
    let calls = driver.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1][0], "start");
}

#[tokio::test]
async fn ensure_running_leaves_a_stopped_container_alone_when_auto_start_disabled() {
    let driver = FakeDriver::new();
    driver.push_success("false"); // inspect
    let manager = LifecycleManager::new(&driver, "docker");

    let outcome = manager
        .ensure_running(&sample_spec("/home/user/project"), "proj", "scope", true, false, true)
        .await
        .unwrap();

    assert_eq!(outcome, EnsureOutcome::AlreadyRunning);
    assert_eq!(driver.calls().len(), 1);
}

#[tokio::test]
async fn ensure_running_creates_an_absent_container_with_a_single_run_call() {
    let driver = FakeDriver::new();
    driver.push_output("", "no such container", 1); // inspect
    driver.push_success(""); // run -d
    let manager = LifecycleManager::new(&driver, "docker");
    let mut spec = sample_spec("/home/user/project");
    spec.mounts = vec!["/host/cache:/workspace/.cache".to_string()];
    spec.env.insert("FOO".to_string(), "bar".to_string());

    let outcome = manager.ensure_running(&spec, "proj", "scope", true, true, true).await.unwrap();

    assert_eq!(outcome, EnsureOutcome::Created);
    let calls = driver.calls();
    assert_eq!(calls.len(), 2);
    let create = &calls[1];
    assert_eq!(create[0], "run");
    assert!(create.iter().any(|a| a == "-d"));
    assert!(create.iter().any(|a| a == "owner.project=proj"));
    assert!(create.iter().any(|a| a == "owner.scope=scope"));
    assert!(create.iter().any(|a| a == "/home/user/project:/workspace"));
    assert!(create.iter().any(|a| a == "/host/cache:/workspace/.cache"));
    assert!(create.iter().any(|a| a == "FOO=bar"));
    assert_eq!(create.last().map(String::as_str), Some("infinity"));
}

#[tokio::test]
async fn ensure_running_fails_when_absent_and_auto_create_disabled() {
    let driver = FakeDriver::new();
    driver.push_output("", "no such container", 1);
    let manager = LifecycleManager::new(&driver, "docker");

    let err = manager
        .ensure_running(&sample_spec("/home/user/project"), "proj", "scope", false, true, true)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::MissingAndCreationDisabled { .. }));
}

#[tokio::test]
async fn ensure_running_fails_when_project_path_is_missing() {
    let driver = FakeDriver::new();
    driver.push_output("", "no such container", 1); // inspect
    let manager = LifecycleManager::new(&driver, "docker");

    let err = manager
        .ensure_running(&sample_spec("/no/such/project"), "proj", "scope", true, true, false)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::ProjectPathMissing { .. }));
    // The path check happens before any create/run invocation is attempted.
    assert_eq!(driver.calls().len(), 1);
}

#[tokio::test]
async fn ensure_running_surfaces_create_failure() {
    let driver = FakeDriver::new();
    driver.push_output("", "no such container", 1); // inspect
    driver.push_output("", "no space left on device", 1); // run -d
    let manager = LifecycleManager::new(&driver, "docker");

    let err = manager
        .ensure_running(&sample_spec("/home/user/project"), "proj", "scope", true, true, true)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::CreateFailed { .. }));
}

#[tokio::test]
async fn ensure_running_surfaces_start_failure() {
    let driver = FakeDriver::new();
    driver.push_success("false"); // inspect
    driver.push_output("", "permission denied", 1); // start
    let manager = LifecycleManager::new(&driver, "docker");

    let err = manager
        .ensure_running(&sample_spec("/home/user/project"), "proj", "scope", true, true, true)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::StartFailed { .. }));
}
