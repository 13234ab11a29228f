//! Integration tests for the `fppt-ctl` binary.
//!
//! Creates search locations and topology trees in temp directories and runs
//! the compiled binary against them, checking exit status, stdout and the
//! files left on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Get the path to the compiled fppt-ctl binary.
fn fppt_ctl_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_fppt-ctl"))
}

fn run_fppt_ctl(work_dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(fppt_ctl_bin())
        .args(args)
        .current_dir(work_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute fppt-ctl")
}

/// Create `<base>/<name>/topology-templates/` holding the given files.
fn create_location(base: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let location = base.join(name);
    let templates = location.join("topology-templates");
    fs::create_dir_all(&templates).unwrap();
    for (relative, body) in files {
        let path = templates.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
    location
}

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

// ==========================================================================
// Success paths
// ==========================================================================

#[test]
fn test_expands_and_lists_produced_files() {
    let temp = TempDir::new().unwrap();
    create_location(
        temp.path(),
        "lib",
        &[
            ("a.fppt", "instance {{ template_name }} base id {{ template_offset }}\n"),
            ("snippets/readme.txt", "hello\n"),
        ],
    );
    fs::write(
        temp.path().join("topo.fpp"),
        "include \"a.x.fppt\"\ninclude \"a.y.fppt\"\n",
    )
    .unwrap();

    let output = run_fppt_ctl(
        temp.path(),
        &["-l", "lib", "-t", "topo.fpp", "--offset-multiple", "2"],
    );

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        stdout_lines(&output),
        vec![
            "a.x.fppt",
            "a.y.fppt",
            "lib/topology-templates/a.fppt",
            "snippets/readme.txt",
        ]
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("a.y.fppt")).unwrap(),
        "instance y base id 2\n"
    );
}

#[test]
fn test_config_and_start_offset() {
    let temp = TempDir::new().unwrap();
    create_location(
        temp.path(),
        "lib",
        &[("a.fppt", "{{ deployment }}:{{ template_offset | hex }}\n")],
    );
    fs::write(temp.path().join("topo.fpp"), "include \"a.x.fppt\"\n").unwrap();
    fs::write(temp.path().join("settings.toml"), "deployment = \"Ref\"\n").unwrap();

    let output = run_fppt_ctl(
        temp.path(),
        &[
            "--fprime-locations",
            "lib",
            "--topology-files",
            "topo.fpp",
            "-m",
            "256",
            "--start-offset",
            "4096",
            "--config",
            "settings.toml",
        ],
    );

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(temp.path().join("a.x.fppt")).unwrap(),
        "Ref:0x1000\n"
    );
}

#[test]
fn test_project_local_config_is_used() {
    let temp = TempDir::new().unwrap();
    create_location(temp.path(), "lib", &[("a.fppt", "{{ deployment }}\n")]);
    fs::write(temp.path().join("topo.fpp"), "include \"a.x.fppt\"\n").unwrap();
    fs::write(temp.path().join(".fppt.toml"), "deployment = \"Local\"\n").unwrap();

    let output = run_fppt_ctl(temp.path(), &["-l", "lib", "-t", "topo.fpp", "-m", "1"]);

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(temp.path().join("a.x.fppt")).unwrap(),
        "Local\n"
    );
}

// ==========================================================================
// Failure paths
// ==========================================================================

#[test]
fn test_ambiguous_definition_fails() {
    let temp = TempDir::new().unwrap();
    create_location(temp.path(), "one", &[("b.fppt", "one")]);
    create_location(temp.path(), "two", &[("b.fppt", "two")]);
    fs::write(temp.path().join("topo.fpp"), "include \"b.main.fppt\"\n").unwrap();

    let output = run_fppt_ctl(
        temp.path(),
        &["-l", "one", "two", "-t", "topo.fpp", "-m", "1"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.lines().count(), 1, "stderr: {stderr}");
    assert!(stderr.contains("[ERROR]"));
    assert!(stderr.contains("one/topology-templates/b.fppt"));
    assert!(stderr.contains("two/topology-templates/b.fppt"));
}

#[test]
fn test_no_template_directories_fails() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("empty")).unwrap();
    fs::write(temp.path().join("topo.fpp"), "").unwrap();

    let output = run_fppt_ctl(temp.path(), &["-l", "empty", "-t", "topo.fpp", "-m", "1"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no template directories found"));
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    create_location(temp.path(), "lib", &[("a.fppt", "x")]);
    fs::write(temp.path().join("topo.fpp"), "include \"a.x.fppt\"\n").unwrap();
    fs::write(temp.path().join("bad.toml"), "= nope").unwrap();

    let output = run_fppt_ctl(
        temp.path(),
        &["-l", "lib", "-t", "topo.fpp", "-m", "1", "-c", "bad.toml"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid config file bad.toml"));
    assert!(!temp.path().join("a.x.fppt").exists());
}

#[test]
fn test_missing_arguments_exit_one() {
    let temp = TempDir::new().unwrap();
    let output = run_fppt_ctl(temp.path(), &["-l", "lib"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_offset_overflow_fails_with_one_line() {
    let temp = TempDir::new().unwrap();
    create_location(temp.path(), "lib", &[("a.fppt", "{{ template_offset }}\n")]);
    fs::write(
        temp.path().join("topo.fpp"),
        "include \"a.x.fppt\"\ninclude \"a.y.fppt\"\n",
    )
    .unwrap();

    let output = run_fppt_ctl(
        temp.path(),
        &[
            "-l",
            "lib",
            "-t",
            "topo.fpp",
            "-m",
            "1",
            "--start-offset",
            "9223372036854775807",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.lines().count(), 1, "stderr: {stderr}");
    assert!(stderr.contains("without overflowing"));
}

#[test]
fn test_unused_broken_template_is_ignored() {
    let temp = TempDir::new().unwrap();
    create_location(
        temp.path(),
        "lib",
        &[("a.fppt", "ok\n"), ("other.fppt", "{% if %}")],
    );
    fs::write(temp.path().join("topo.fpp"), "include \"a.x.fppt\"\n").unwrap();

    let output = run_fppt_ctl(temp.path(), &["-l", "lib", "-t", "topo.fpp", "-m", "1"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(fs::read_to_string(temp.path().join("a.x.fppt")).unwrap(), "ok\n");
}
