use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_help_lists_seed_and_storage_flags() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("buildemy-checkout"));
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--courses"))
        .stdout(predicate::str::contains("--users"))
        .stdout(predicate::str::contains("--db-path"))
        .stdout(predicate::str::contains("--port"));

    Ok(())
}
