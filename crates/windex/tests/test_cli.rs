#![allow(clippy::disallowed_methods)] // insta macros use unwrap internally

use insta::{assert_snapshot, with_settings};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run windex inside `cwd` with discovered settings isolated to `cwd`, returning
/// (stdout, stderr, exit_code)
fn run_windex(cwd: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_windex"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "off")
        .env("XDG_CONFIG_HOME", cwd.join(".config"))
        .env("XDG_CONFIG_DIRS", cwd.join(".system"))
        .env_remove("WINDEX_OUT_DIR")
        .env_remove("WINDEX_ORDERING")
        .env_remove("WINDEX_STANDALONE")
        .env_remove("WINDEX_MODULE_DIRS")
        .env_remove("WINDEX_MODIFIERS")
        .env_remove("RUST_BACKTRACE")
        .env_remove("RUST_LIB_BACKTRACE")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

/// Filters for normalizing paths in snapshots
fn get_cli_filters() -> Vec<(&'static str, &'static str)> {
    vec![
        // Temporary directories - Unix/macOS
        (r"/[^\s]*/(absent\.toml)", "<TMP>/$1"),
        // Temporary directories - Windows
        (r"[A-Z]:\\[^\s]*\\(absent\.toml)", "<TMP>/$1"),
        (r"\r\n", "\n"),
    ]
}

#[test]
fn test_missing_config_exits_with_code_2() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, exit_code) = run_windex(dir.path(), &["absent.toml", "out"]);

    assert_eq!(exit_code, 2);
    assert_eq!(stdout, "");
    assert!(!dir.path().join("out").exists());
    assert!(!dir.path().join("_build").exists());

    with_settings!({filters => get_cli_filters()}, {
        assert_snapshot!(stderr.trim_end(), @"Error: config file not found: <TMP>/absent.toml");
    });
}

#[test]
fn test_writes_both_lists_into_out_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("windex.config.toml"),
        "content = [\"./js/**/*.js\"]\n[theme.extend.colors]\nbrand = \"#FD4F00\"\n",
    )
    .unwrap();

    let (_, stderr, exit_code) = run_windex(dir.path(), &["windex.config.toml", "build/lists"]);
    assert_eq!(exit_code, 0, "stderr: {stderr}");

    let classes = fs::read_to_string(dir.path().join("build/lists/classes.txt")).unwrap();
    let variants = fs::read_to_string(dir.path().join("build/lists/variants.txt")).unwrap();
    assert!(classes.lines().any(|line| line == "bg-brand"));
    assert!(variants.lines().any(|line| line == "hover"));
    assert!(!classes.ends_with('\n'));
}

#[test]
fn test_default_out_dir_and_project_settings() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("windex.config.toml"), "content = [\"index.html\"]").unwrap();

    let (_, stderr, exit_code) = run_windex(dir.path(), &["windex.config.toml"]);
    assert_eq!(exit_code, 0, "stderr: {stderr}");
    assert!(dir.path().join("_build/classes.txt").is_file());
    assert!(dir.path().join("_build/variants.txt").is_file());

    // A project windex.toml moves the default, an explicit argument still wins
    fs::write(dir.path().join("windex.toml"), "out-dir = \"from-settings\"\n").unwrap();
    let (_, _, exit_code) = run_windex(dir.path(), &["windex.config.toml"]);
    assert_eq!(exit_code, 0);
    assert!(dir.path().join("from-settings/classes.txt").is_file());

    let (_, _, exit_code) = run_windex(dir.path(), &["windex.config.toml", "explicit"]);
    assert_eq!(exit_code, 0);
    assert!(dir.path().join("explicit/classes.txt").is_file());
}

#[test]
fn test_ordering_flag_changes_class_order() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("windex.config.toml"),
        "plugins = [\"@tailwindcss/forms\"]",
    )
    .unwrap();

    let (_, _, exit_code) = run_windex(
        dir.path(),
        &["windex.config.toml", "simple", "--ordering", "simple"],
    );
    assert_eq!(exit_code, 0);
    let (_, _, exit_code) = run_windex(dir.path(), &["windex.config.toml", "ordered"]);
    assert_eq!(exit_code, 0);

    let simple = fs::read_to_string(dir.path().join("simple/classes.txt")).unwrap();
    let ordered = fs::read_to_string(dir.path().join("ordered/classes.txt")).unwrap();
    assert_eq!(simple.lines().next(), Some("container"));
    assert_eq!(ordered.lines().next(), Some("form-input"));
}

#[test]
fn test_no_standalone_requires_installed_plugins() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("windex.config.toml"),
        "plugins = [\"@tailwindcss/forms\"]",
    )
    .unwrap();

    let (_, stderr, exit_code) = run_windex(dir.path(), &["windex.config.toml", "--no-standalone"]);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("cannot find module '@tailwindcss/forms'"));
    assert!(!dir.path().join("_build").exists());
}

#[test]
fn test_malformed_config_exits_with_code_1() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("windex.config.toml"), "plugins = [").unwrap();

    let (_, stderr, exit_code) = run_windex(dir.path(), &["windex.config.toml"]);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Failed to load config"));
}
