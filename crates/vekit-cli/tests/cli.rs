use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const STORAGE_VARS: &[&str] = &[
    "VOLCENGINE_ACCESS_KEY",
    "VOLCENGINE_SECRET_KEY",
    "TOOL_USER_SESSION_ID",
    "DATABASE_TOS_BUCKET",
    "DATABASE_TOS_REGION",
    "DATABASE_TOS_ENDPOINT",
    "REGION",
    "CLOUD_PROVIDER",
];

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let iam = dir.join("no-such-credential");
    let content = format!(
        "[storage]\niam_credential_path = {:?}\n\n{}",
        iam.display().to_string(),
        extra
    );
    std::fs::write(&path, content).unwrap();
    path
}

fn vekit(config: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vekit"));
    cmd.arg("--config").arg(config).args(args);
    for var in STORAGE_VARS {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "off");
    cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = cmd.spawn().unwrap();
    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).unwrap();
        }
    }
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_redact_argument() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let output = vekit(&config, &["redact", "call me at 13812345678"], None);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "call me at [phone number Hidden]\n");
}

#[test]
fn test_unwritable_config_dir_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().join("home-is-a-file");
    std::fs::write(&home, "").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_vekit"))
        .args(["redact", "call 13812345678"])
        .env("HOME", &home)
        .env_remove("XDG_CONFIG_HOME")
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "call [phone number Hidden]\n");
}

#[test]
fn test_redact_stdin_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let output = vekit(
        &config,
        &["redact", "--report"],
        Some("mail a@b.com or b@c.org"),
    );

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "mail [email Hidden] or [email Hidden]"
    );
    assert!(stderr(&output).contains("email: 2"));
}

#[test]
fn test_redact_custom_rules_replace_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "[[redaction.rules]]\nname = \"ticket\"\npattern = 'TCK-\\d+'\n",
    );

    let output = vekit(&config, &["redact", "TCK-42 from 13812345678"], None);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "[ticket Hidden] from 13812345678\n");
}

#[test]
fn test_screen_blocked_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let blocked = vekit(&config, &["screen", "this has MinGanCi inside"], None);
    assert!(!blocked.status.success());
    assert!(stdout(&blocked).contains("inappropriate words"));

    let allowed = vekit(&config, &["screen", "hello there"], None);
    assert!(allowed.status.success());
    assert_eq!(stdout(&allowed), "allowed\n");
}

#[test]
fn test_upload_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let missing = dir.path().join("nope.txt");

    let output = vekit(
        &config,
        &["upload", missing.to_str().unwrap(), "--bucket", "my-bucket"],
        None,
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Path does not exist"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_upload_without_bucket_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let file = dir.path().join("a.txt");
    std::fs::write(&file, "hello").unwrap();

    let output = vekit(&config, &["upload", file.to_str().unwrap()], None);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No bucket specified"));
}

#[test]
fn test_upload_without_credentials_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let file = dir.path().join("a.txt");
    std::fs::write(&file, "hello").unwrap();

    let output = vekit(
        &config,
        &["upload", file.to_str().unwrap(), "--bucket", "my-bucket"],
        None,
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Credential error"));
}

#[test]
fn test_download_filename_mismatch_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let save_dir = dir.path().join("out");

    let output = vekit(
        &config,
        &[
            "download",
            "http://127.0.0.1:9/a.txt",
            "http://127.0.0.1:9/b.txt",
            "--save-dir",
            save_dir.to_str().unwrap(),
            "--filenames",
            "one.txt",
        ],
        None,
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Validation error"));
    assert!(!save_dir.exists());
}

#[test]
fn test_publish_rejects_unknown_type() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let file = dir.path().join("page.md");
    std::fs::write(&file, "# hi").unwrap();

    let output = vekit(
        &config,
        &["publish", file.to_str().unwrap(), "--type", "md", "--bucket", "b"],
        None,
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unsupported code type"));
}

#[test]
fn test_skill_push_requires_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let skill = dir.path().join("no-manifest");
    std::fs::create_dir(&skill).unwrap();

    let output = vekit(
        &config,
        &["skill", "push", skill.to_str().unwrap(), "--bucket", "b"],
        None,
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("has no SKILL.md"));
}

#[test]
fn test_skill_pull_rejects_non_tos_url() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let output = vekit(&config, &["skill", "pull", "https://example.com/a.zip"], None);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Not a tos://bucket/key URL"));
}
