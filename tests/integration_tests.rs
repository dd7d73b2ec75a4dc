mod common;

use common::{CommandOutput, TestContext};
use std::fs;

const MANIFEST: &str = r#"
binaries:
  - name: foo
    org: bar
    repo: foo
    version: 1.2.3
    source: "https://github.com/bar/foo/releases/download/v{{ .Version }}/foo-{{ .Platform }}-{{ .Arch }}.tar.gz"
  - name: baz
    org: qux
    repo: baz
    version: 0.1.0
    release_name: "v{{ .Version }}"
    asset: "baz_{{ .Platform }}.gz"
"#;

#[test]
fn test_help_and_version() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .arg("--help")
        .output()
        .expect("Failed to run grab")
        .into();

    output
        .assert_success()
        .assert_stdout_contains("User centric dotfile dependency manager")
        .assert_stdout_contains("Usage: grab");

    let output: CommandOutput = ctx
        .cmd()
        .arg("version")
        .output()
        .expect("Failed to run grab")
        .into();

    output.assert_success().assert_stdout_contains("grab");
}

#[test]
fn test_install_skips_present_binaries() {
    let ctx = TestContext::new();
    ctx.write_manifest(MANIFEST);
    fs::write(ctx.bin_dir.join("foo"), "existing foo").unwrap();
    fs::write(ctx.bin_dir.join("baz"), "existing baz").unwrap();

    let output: CommandOutput = ctx
        .cmd()
        .arg("install")
        .output()
        .expect("Failed to run grab")
        .into();

    output
        .assert_success()
        .assert_stdout_contains("foo already installed")
        .assert_stdout_contains("baz already installed");

    assert_eq!(fs::read_to_string(ctx.bin_dir.join("foo")).unwrap(), "existing foo");
    assert_eq!(fs::read_to_string(ctx.bin_dir.join("baz")).unwrap(), "existing baz");
}

#[test]
fn test_install_stops_at_first_failure() {
    let ctx = TestContext::new();
    ctx.write_manifest(
        r#"
binaries:
  - name: broken
    org: bar
    repo: broken
    version: 1.0.0
    source: "https://example.com/{{ .Version"
  - name: never
    org: bar
    repo: never
    version: 1.0.0
    source: "https://example.com/never"
"#,
    );

    let output: CommandOutput = ctx
        .cmd()
        .arg("install")
        .output()
        .expect("Failed to run grab")
        .into();

    output
        .assert_failure()
        .assert_stdout_contains("Installing broken...")
        .assert_stderr_contains("Error getting source url for broken")
        .assert_stderr_contains("error parsing source template");

    assert!(!output.stdout.contains("never"));
    assert!(!ctx.bin_dir.join("never").exists());
}

#[test]
fn test_install_rejects_duplicate_names() {
    let ctx = TestContext::new();
    ctx.write_manifest(
        r#"
binaries:
  - {name: foo, org: a, repo: foo, version: 1.0.0, source: "https://x/foo"}
  - {name: foo, org: b, repo: foo, version: 2.0.0, source: "https://x/foo"}
"#,
    );

    let output: CommandOutput = ctx
        .cmd()
        .arg("install")
        .output()
        .expect("Failed to run grab")
        .into();

    output
        .assert_failure()
        .assert_stderr_contains("binary \"foo\" is declared more than once");
}

#[test]
fn test_missing_manifest_is_reported() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .arg("install")
        .output()
        .expect("Failed to run grab")
        .into();

    output
        .assert_failure()
        .assert_stderr_contains("Error loading config");
}

#[test]
fn test_invalid_log_level() {
    let ctx = TestContext::new();
    ctx.write_manifest(MANIFEST);

    let output: CommandOutput = ctx
        .cmd()
        .args(["--log-level", "loud", "install"])
        .output()
        .expect("Failed to run grab")
        .into();

    output
        .assert_failure()
        .assert_stderr_contains("invalid log level \"loud\"");
}
