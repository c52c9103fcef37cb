use std::fs;

use estivador::detect::{DeploymentType, detect};
use estivador::error::DeployError;
use estivador::log::RunLog;

fn run_log(dir: &tempfile::TempDir) -> RunLog {
    RunLog::at(dir.path().join("run.log")).unwrap()
}

#[test]
fn dockerfile_selects_single_container() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Dockerfile"), "FROM alpine\n").unwrap();

    let log = run_log(&dir);
    assert_eq!(
        detect(dir.path(), &log).unwrap(),
        DeploymentType::SingleContainer
    );
}

#[test]
fn compose_selects_multi_container() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("docker-compose.yml"),
        "services:\n  web:\n    build: .\n  db:\n    image: postgres:16\n",
    )
    .unwrap();

    let log = run_log(&dir);
    assert_eq!(
        detect(dir.path(), &log).unwrap(),
        DeploymentType::MultiContainer
    );
}

#[test]
fn alternate_compose_spelling_recognized() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("docker-compose.yaml"),
        "services:\n  web:\n    image: nginx\n",
    )
    .unwrap();

    let log = run_log(&dir);
    assert_eq!(
        detect(dir.path(), &log).unwrap(),
        DeploymentType::MultiContainer
    );
}

#[test]
fn dockerfile_takes_precedence_over_compose() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Dockerfile"), "FROM alpine\n").unwrap();
    fs::write(
        dir.path().join("docker-compose.yml"),
        "services:\n  web:\n    build: .\n",
    )
    .unwrap();

    let log = run_log(&dir);
    assert_eq!(
        detect(dir.path(), &log).unwrap(),
        DeploymentType::SingleContainer
    );
}

#[test]
fn empty_tree_is_fatal_before_any_remote_work() {
    let dir = tempfile::tempdir().unwrap();

    let log = run_log(&dir);
    let err = detect(dir.path(), &log).unwrap_err();
    assert!(matches!(err, DeployError::NoDescriptor(_)));
}

#[test]
fn unrelated_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
    fs::write(dir.path().join("compose.yml"), "services: {}\n").unwrap();

    let log = run_log(&dir);
    assert!(detect(dir.path(), &log).is_err());
}
