//! Integration tests for the adogit binary.
//!
//! These tests exercise argument parsing, configuration loading and id
//! validation. None of them reach the network: every command here fails
//! before the first remote call.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REPO: &str = "6f1c2a34-1b2c-4d5e-8f90-123456789abc";

/// A command isolated from the user's configuration and credentials.
fn adogit(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("adogit").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("ADOGIT_CONFIG")
        .env_remove("AZDO_ORG_SERVICE_URL")
        .env_remove("AZDO_PERSONAL_ACCESS_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// Like [`adogit`], with an organization and token configured.
fn configured(home: &TempDir) -> Command {
    let mut cmd = adogit(home);
    cmd.env("AZDO_ORG_SERVICE_URL", "https://dev.azure.com/contoso")
        .env("AZDO_PERSONAL_ACCESS_TOKEN", "pat");
    cmd
}

#[test]
fn help_lists_resources() {
    let home = TempDir::new().unwrap();
    adogit(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("branch").and(predicate::str::contains("file")));
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    adogit(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("adogit"));
}

#[test]
fn malformed_branch_id_is_rejected() {
    let home = TempDir::new().unwrap();
    configured(&home)
        .args(["branch", "read", "--id", "no-separator"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid resource id 'no-separator'"));
}

#[test]
fn file_import_with_two_branches_is_rejected() {
    let home = TempDir::new().unwrap();
    configured(&home)
        .args(["file", "import", &format!("{REPO}/a.txt:dev:main")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<repositoryId>/<filePath>:<branch>"));
}

#[test]
fn missing_token_is_reported() {
    let home = TempDir::new().unwrap();
    adogit(&home)
        .env("AZDO_ORG_SERVICE_URL", "https://dev.azure.com/contoso")
        .args(["branch", "read", "--id", &format!("{REPO}:main")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AZDO_PERSONAL_ACCESS_TOKEN"));
}

#[test]
fn missing_organization_is_reported() {
    let home = TempDir::new().unwrap();
    adogit(&home)
        .env("AZDO_PERSONAL_ACCESS_TOKEN", "pat")
        .args(["branch", "import", &format!("{REPO}:main")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("organization URL not configured"));
}

#[test]
fn organization_flag_must_be_http() {
    let home = TempDir::new().unwrap();
    configured(&home)
        .args(["--organization-url", "ftp://contoso"])
        .args(["branch", "read", "--id", &format!("{REPO}:main")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--organization-url"));
}

#[test]
fn unknown_config_field_is_rejected() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("adogit.toml");
    std::fs::write(&path, "organization_url = \"https://dev.azure.com/contoso\"\nproject = \"x\"\n")
        .unwrap();

    configured(&home)
        .arg("--config")
        .arg(&path)
        .args(["branch", "read", "--id", &format!("{REPO}:main")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn content_flags_conflict() {
    let home = TempDir::new().unwrap();
    configured(&home)
        .args(["file", "create", "--repository-id", REPO, "--file", "a.txt"])
        .args(["--content", "x", "--content-file", "a.txt"])
        .assert()
        .code(2);
}
