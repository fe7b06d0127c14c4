use std::env;
use std::ffi::OsString;
use std::fs;
use std::process::Command;

use tempfile::TempDir;

/// Drops every `SPHERES_*` variable in `inherited` from the child environment.
fn without_settings<I>(mut command: Command, inherited: I) -> Command
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    for (key, _) in inherited {
        if key.to_string_lossy().starts_with("SPHERES_") {
            command.env_remove(key);
        }
    }
    command.env("RUST_LOG", "error");
    command
}

/// Runs the binary with no `SPHERES_*` settings inherited from the caller.
fn spheres() -> Command {
    without_settings(Command::new(env!("CARGO_BIN_EXE_spheres")), env::vars_os())
}

#[test]
fn caller_environment_does_not_override_flags() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("settings.toml"), "version = 2\n").unwrap();

    let mut leaked = Command::new(env!("CARGO_BIN_EXE_spheres"));
    leaked.env("SPHERES_ANTIALIAS", "3");
    let inherited = vec![(OsString::from("SPHERES_ANTIALIAS"), OsString::from("3"))];
    let output = without_settings(leaked, env::vars_os().chain(inherited))
        .env("SPHERES_CONFIG_DIR", root.path())
        .output()
        .expect("failed to run spheres");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("anti-alias"), "stderr: {stderr}");
    assert!(stderr.contains("failed to load settings"), "stderr: {stderr}");
}

#[test]
fn help_lists_effect_flags() {
    let output = spheres()
        .arg("--help")
        .output()
        .expect("failed to run spheres --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--antialias", "--dof", "--blur", "--fov", "--speed", "--size"] {
        assert!(stdout.contains(flag), "help is missing {flag}");
    }
}

#[test]
fn unsupported_sample_count_is_rejected() {
    let output = spheres()
        .args(["--antialias", "3"])
        .output()
        .expect("failed to run spheres");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported anti-alias sample count 3"));
}

#[test]
fn invalid_settings_file_fails_before_opening_a_window() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("settings.toml"),
        "version = 1\n[render]\nantialias = 5\n",
    )
    .unwrap();

    let output = spheres()
        .env("SPHERES_CONFIG_DIR", root.path())
        .output()
        .expect("failed to run spheres");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load settings"), "stderr: {stderr}");
}

#[test]
fn malformed_size_is_rejected() {
    let output = spheres()
        .args(["--size", "huge"])
        .output()
        .expect("failed to run spheres");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("WIDTHxHEIGHT"));
}
