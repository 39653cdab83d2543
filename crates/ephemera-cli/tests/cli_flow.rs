use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rusqlite::Connection;
use tempfile::TempDir;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ephemera"))
}

/// Isolated XDG directories for one test.
struct TestEnv {
    _root: TempDir,
    config_home: PathBuf,
    data_home: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let root = TempDir::new().expect("tempdir should succeed");
        let config_home = root.path().join("c");
        let data_home = root.path().join("d");
        std::fs::create_dir_all(&config_home).expect("create config dir");
        std::fs::create_dir_all(&data_home).expect("create data dir");
        Self {
            _root: root,
            config_home,
            data_home,
        }
    }

    /// A fresh environment with `ephemera init` already run.
    fn initialized() -> Self {
        let env = Self::new();
        let output = env.run(&["init"]);
        assert_success(&output);
        env
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("XDG_CONFIG_HOME", &self.config_home)
            .env("XDG_DATA_HOME", &self.data_home)
            .env("HOME", self._root.path())
            .env_remove("EPHEMERA_DB")
            .env_remove("EPHEMERA_KEY")
            .env_remove("EPHEMERA_CONFIG")
            .env_remove("EPHEMERA_PASSWORD")
            .env_remove("EPHEMERA_NEW_PASSWORD")
            .env_remove("EPHEMERA_NOTE_PASSWORD")
            .env_remove("EPHEMERA_LOG")
            .env_remove("EDITOR")
            .stdin(Stdio::null());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("run ephemera")
    }

    fn run_with_env(&self, args: &[&str], vars: &[(&str, &str)]) -> Output {
        let mut cmd = self.command();
        for (key, value) in vars {
            cmd.env(key, value);
        }
        cmd.args(args).output().expect("run ephemera")
    }

    fn database_path(&self) -> PathBuf {
        self.data_home.join("ephemera").join("notes.db")
    }

    fn key_path(&self) -> PathBuf {
        self.config_home.join("ephemera").join("server.key")
    }

    /// Create a note and return its id.
    fn create(&self, args: &[&str]) -> String {
        let mut full = vec!["create", "--json"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        assert_success(&output);
        let value: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("create output should be JSON");
        value["id"].as_str().expect("id").to_string()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed\nstdout: {}\nstderr: {}",
        stdout(output),
        stderr(output)
    );
}

fn assert_exit_code(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "unexpected exit code\nstdout: {}\nstderr: {}",
        stdout(output),
        stderr(output)
    );
}

#[test]
fn test_init_creates_config_key_and_database() {
    let env = TestEnv::initialized();

    assert!(env.database_path().exists());
    let key = std::fs::read_to_string(env.key_path()).expect("read key file");
    let decoded = STANDARD.decode(key.trim()).expect("key should be base64");
    assert_eq!(decoded.len(), 32);

    let config = std::fs::read_to_string(env.config_home.join("ephemera").join("config.toml"))
        .expect("read config");
    assert!(config.contains("[database]"));
    assert!(config.contains("key_file"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(env.key_path())
            .expect("key metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn test_init_refuses_to_overwrite_config() {
    let env = TestEnv::initialized();
    let key_before = std::fs::read(env.key_path()).expect("read key");

    let output = env.run(&["init"]);
    assert_exit_code(&output, 4);

    let output = env.run(&["init", "--force"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Using existing server key"));
    assert_eq!(std::fs::read(env.key_path()).expect("read key"), key_before);
}

#[test]
fn test_view_once_flow() {
    let env = TestEnv::initialized();
    let id = env.create(&["--content", "secret", "--title", "Hello"]);

    let output = env.run(&["status", &id, "--json"]);
    assert_success(&output);
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(status["isPasswordProtected"], false);
    assert_eq!(status["title"], "Hello");

    let output = env.run(&["view", &id, "--json"]);
    assert_success(&output);
    let note: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(note["content"], "secret");
    assert_eq!(note["isPasswordProtected"], false);

    let output = env.run(&["view", &id]);
    assert_exit_code(&output, 3);
    assert!(stderr(&output).contains("Note not found"));
}

#[test]
fn test_password_flow_with_time_expiry() {
    let env = TestEnv::initialized();
    let id = env.create(&[
        "--content",
        "x",
        "--expire",
        "time",
        "--ttl",
        "5 minutes",
        "--password",
        "pw",
    ]);

    let output = env.run(&["view", &id]);
    assert_exit_code(&output, 8);

    let output = env.run(&["unlock", &id, "--password", "wrong"]);
    assert_exit_code(&output, 5);

    let output = env.run_with_env(&["unlock", &id, "--quiet"], &[("EPHEMERA_NOTE_PASSWORD", "pw")]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "x");

    // Time-based notes survive disclosure until they expire.
    let output = env.run(&["unlock", &id, "--password", "pw", "--json"]);
    assert_success(&output);
    let note: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(note["isPasswordProtected"], true);
}

#[test]
fn test_unlock_without_password_and_tty_fails() {
    let env = TestEnv::initialized();
    let id = env.create(&["--content", "x", "--password", "pw"]);

    let output = env.run(&["unlock", &id]);
    assert_exit_code(&output, 4);
    assert!(stderr(&output).contains("no TTY"));
}

#[test]
fn test_create_rejects_unknown_window() {
    let env = TestEnv::initialized();
    let output = env.run(&["create", "--content", "x", "--expire", "time", "--ttl", "2 hours"]);
    assert_exit_code(&output, 4);

    let output = env.run(&["create", "--content", "x", "--expire", "time"]);
    assert_exit_code(&output, 4);
}

#[test]
fn test_content_from_stdin() {
    let env = TestEnv::initialized();
    let mut child = env
        .command()
        .args(["create", "--json", "--expire", "never"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn ephemera");
    {
        use std::io::Write;
        let mut stdin = child.stdin.take().expect("stdin");
        stdin
            .write_all(b"piped content\n  indented  \n\n")
            .expect("write stdin");
    }
    let output = child.wait_with_output().expect("wait");
    assert_success(&output);
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let id = summary["id"].as_str().expect("id");
    assert!(summary.get("content").is_none());

    let output = env.run(&["view", id, "--quiet"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "piped content\n  indented  \n\n");
}

#[test]
fn test_edit_keeps_protection() {
    let env = TestEnv::initialized();
    let id = env.create(&["--content", "old", "--expire", "never", "--password", "pw"]);

    let output = env.run(&["edit", &id, "--content", "new", "--title", "Renamed", "--json"]);
    assert_success(&output);
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(summary["passwordProtected"], true);
    assert_eq!(summary["expirationType"], "never");
    assert_eq!(summary["title"], "Renamed");

    let output = env.run(&["unlock", &id, "--password", "pw", "--quiet"]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "new");
}

#[test]
fn test_delete_then_not_found() {
    let env = TestEnv::initialized();
    let id = env.create(&["--content", "x", "--expire", "never"]);

    assert_success(&env.run(&["delete", &id]));
    assert_exit_code(&env.run(&["delete", &id]), 3);
    assert_exit_code(&env.run(&["status", &id]), 3);
}

#[test]
fn test_invalid_note_id_is_invalid_input() {
    let env = TestEnv::initialized();
    assert_exit_code(&env.run(&["status", "not-a-uuid"]), 4);
}

#[test]
fn test_missing_key_is_fatal() {
    let env = TestEnv::new();
    let db = env.data_home.join("bare.db");
    create_empty_database(&db);
    let db = db.to_string_lossy().to_string();

    let output = env.run(&["--db", &db, "list"]);
    assert_exit_code(&output, 1);
    assert!(stderr(&output).contains("EPHEMERA_KEY"));

    let output = env.run_with_env(&["--db", &db, "list"], &[("EPHEMERA_KEY", "dG9vIHNob3J0")]);
    assert_exit_code(&output, 1);
    assert!(stderr(&output).contains("32 bytes"));
}

#[test]
fn test_key_is_checked_before_note_commands_run() {
    let env = TestEnv::new();
    let missing = env.data_home.join("missing.db");
    let missing = missing.to_string_lossy().to_string();

    // No content, no database: the key error still comes first.
    let output = env.run(&["--db", &missing, "create"]);
    assert_exit_code(&output, 1);
    assert!(stderr(&output).contains("EPHEMERA_KEY"));

    let output = env.run(&["--db", &missing, "view", "not-an-id"]);
    assert_exit_code(&output, 1);
    assert!(stderr(&output).contains("EPHEMERA_KEY"));
}

#[test]
fn test_env_key_and_db_without_config() {
    let env = TestEnv::new();
    let db = env.data_home.join("notes.db");
    create_empty_database(&db);
    let db = db.to_string_lossy().to_string();
    let key = STANDARD.encode([7u8; 32]);
    let vars = [("EPHEMERA_DB", db.as_str()), ("EPHEMERA_KEY", key.as_str())];

    let output = env.run_with_env(&["create", "--content", "hi", "--quiet"], &vars);
    assert_success(&output);
    let id = stdout(&output).trim().to_string();

    let output = env.run_with_env(&["view", &id, "--quiet"], &vars);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "hi");
}

#[test]
fn test_missing_database_is_not_found() {
    let env = TestEnv::new();
    let key = STANDARD.encode([7u8; 32]);
    let output = env.run_with_env(&["list"], &[("EPHEMERA_KEY", key.as_str())]);
    assert_exit_code(&output, 3);
    assert!(stderr(&output).contains("ephemera init"));
}

#[test]
fn test_accounts_own_their_notes() {
    let env = TestEnv::initialized();
    let user = [("EPHEMERA_PASSWORD", "password1")];

    let output = env.run_with_env(
        &["account", "register", "Owner@Example.com", "--name", "Owner"],
        &user,
    );
    assert_success(&output);

    let output = env.run_with_env(
        &["--user", "owner@example.com", "create", "--content", "mine", "--expire", "never", "--json"],
        &user,
    );
    assert_success(&output);
    let owned: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(owned["isGuest"], false);

    env.create(&["--content", "guest", "--expire", "never"]);

    let output = env.run_with_env(&["--user", "owner@example.com", "list", "--json"], &user);
    assert_success(&output);
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let listed = listed.as_array().expect("array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], owned["id"]);

    let output = env.run(&["list", "--json"]);
    assert_success(&output);
    let guests: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(guests.as_array().expect("array").len(), 1);

    let output = env.run_with_env(
        &["--user", "owner@example.com", "account", "stats", "--json"],
        &user,
    );
    assert_success(&output);
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(stats["totalNotes"], 1);

    let output = env.run_with_env(
        &["--user", "owner@example.com", "list"],
        &[("EPHEMERA_PASSWORD", "wrong-password")],
    );
    assert_exit_code(&output, 5);
}

#[test]
fn test_account_password_change() {
    let env = TestEnv::initialized();
    let output = env.run_with_env(
        &["account", "register", "a@example.com"],
        &[("EPHEMERA_PASSWORD", "password1")],
    );
    assert_success(&output);

    let output = env.run_with_env(
        &["--user", "a@example.com", "account", "password"],
        &[
            ("EPHEMERA_PASSWORD", "password1"),
            ("EPHEMERA_NEW_PASSWORD", "password2"),
        ],
    );
    assert_success(&output);

    let output = env.run_with_env(
        &["--user", "a@example.com", "list"],
        &[("EPHEMERA_PASSWORD", "password1")],
    );
    assert_exit_code(&output, 5);
    let output = env.run_with_env(
        &["--user", "a@example.com", "list"],
        &[("EPHEMERA_PASSWORD", "password2")],
    );
    assert_success(&output);
}

#[test]
fn test_account_commands_require_user() {
    let env = TestEnv::initialized();
    assert_exit_code(&env.run(&["account", "stats"]), 4);
    assert_exit_code(&env.run(&["account", "profile", "--name", "x"]), 4);
}

#[test]
fn test_check_detects_corrupted_expiration() {
    let env = TestEnv::initialized();
    env.create(&["--content", "x", "--expire", "time", "--ttl", "1h"]);

    assert_success(&env.run(&["check"]));

    corrupt_expiration(&env.database_path());
    let output = env.run(&["check"]);
    assert_exit_code(&output, 6);
    assert!(stderr(&output).contains("Integrity check: FAILED"));
}

#[test]
fn test_purge_keeps_live_notes() {
    let env = TestEnv::initialized();
    env.create(&["--content", "x", "--expire", "time", "--ttl", "1d"]);

    let output = env.run(&["purge", "--quiet"]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "0");
}

#[test]
fn test_keygen_prints_valid_key() {
    let env = TestEnv::new();
    let output = env.run(&["keygen"]);
    assert_success(&output);
    let decoded = STANDARD
        .decode(stdout(&output).trim())
        .expect("keygen output should be base64");
    assert_eq!(decoded.len(), 32);
}

#[test]
fn test_completions() {
    let env = TestEnv::new();
    let output = env.run(&["completions", "bash"]);
    assert_success(&output);
    assert!(stdout(&output).contains("ephemera"));
}

fn create_empty_database(path: &Path) {
    let conn = Connection::open(path).expect("open database");
    conn.execute_batch("PRAGMA user_version = 1;")
        .expect("write database header");
}

fn corrupt_expiration(path: &Path) {
    let conn = Connection::open(path).expect("open database");
    conn.execute(
        "UPDATE notes SET expiration = 'forever' WHERE expiration_type = 'time'",
        [],
    )
    .expect("corrupt expiration");
}
