use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn flowcheck_cmd() -> Command {
    Command::cargo_bin("flowcheck").expect("flowcheck binary not found")
}

fn office_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures/office/fortigate.conf")
}

#[test]
fn resolves_address_group_members_in_order() {
    flowcheck_cmd()
        .arg("resolve")
        .arg("--config")
        .arg(office_config())
        .args(["--address", "dc-all"])
        .assert()
        .success()
        .stdout("dc-web\tipmask\t172.16.1.0/24\ndc-db\tiprange\t172.16.2.10-172.16.2.20\n");
}

#[test]
fn resolves_service_group_through_catalog() {
    flowcheck_cmd()
        .arg("resolve")
        .arg("--config")
        .arg(office_config())
        .args(["--service", "web-svc"])
        .assert()
        .success()
        .stdout("HTTP\ttcp/80\nHTTPS\ttcp/443\n");
}

#[test]
fn undefined_name_is_an_error() {
    flowcheck_cmd()
        .arg("resolve")
        .arg("--config")
        .arg(office_config())
        .args(["--address", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("address 'nope' is not defined"));
}

#[test]
fn address_and_service_are_exclusive() {
    flowcheck_cmd()
        .arg("resolve")
        .arg("--config")
        .arg(office_config())
        .args(["--address", "dc-all", "--service", "pg"])
        .assert()
        .code(1);
}
