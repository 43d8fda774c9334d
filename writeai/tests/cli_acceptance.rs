use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;
use writeai_core::Database;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("writeai/data.db")
    }
}

fn run_writeai(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("writeai"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("OPENAI_API_KEY")
        .env_remove("ELEVENLABS_API_KEY")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute writeai: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "writeai {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn created_id(output: &Output) -> String {
    stdout(output)
        .lines()
        .find(|line| line.starts_with("Created project"))
        .and_then(|line| line.rsplit(' ').next())
        .expect("project id in output")
        .to_string()
}

#[test]
fn new_creates_project_and_database() {
    let env = CliTestEnv::new();

    let args = ["new", "My first article", "--tool", "article"];
    let output = run_writeai(&env, &args);
    assert_success(&args, &output);

    let out = stdout(&output);
    assert!(out.contains("Created project"));
    assert!(out.contains("My first article"));

    let db_path = env.db_path();
    assert!(
        db_path.exists(),
        "database file should exist at {}",
        db_path.display()
    );

    let db = Database::open(&db_path).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    let projects = db
        .list_projects("default", &writeai_core::ProjectQuery::default())
        .expect("failed to list projects");
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].title, "My first article");
}

#[test]
fn list_filters_by_status_and_search() {
    let env = CliTestEnv::new();

    let output = run_writeai(&env, &["new", "Alpha piece"]);
    assert_success(&["new", "Alpha piece"], &output);
    let output = run_writeai(&env, &["new", "Beta piece"]);
    assert_success(&["new", "Beta piece"], &output);

    let args = ["list", "--status", "draft"];
    let output = run_writeai(&env, &args);
    assert_success(&args, &output);
    let out = stdout(&output);
    assert!(out.contains("Alpha piece"));
    assert!(out.contains("Beta piece"));
    assert!(out.contains("2 project(s)"));

    let args = ["list", "-q", "alpha"];
    let output = run_writeai(&env, &args);
    assert_success(&args, &output);
    let out = stdout(&output);
    assert!(out.contains("Alpha piece"));
    assert!(!out.contains("Beta piece"));

    // Unknown filter fails cleanly
    let output = run_writeai(&env, &["list", "--status", "bogus"]);
    assert!(!output.status.success());
}

#[test]
fn stats_reports_dashboard() {
    let env = CliTestEnv::new();

    let output = run_writeai(&env, &["new", "Numbers"]);
    assert_success(&["new", "Numbers"], &output);

    let output = run_writeai(&env, &["stats"]);
    assert_success(&["stats"], &output);
    let out = stdout(&output);
    assert!(out.contains("Projects:       1 total"));
    assert!(out.contains("Productivity:"));
    assert!(out.contains("Last 7 days:"));
}

#[test]
fn usage_shows_free_plan_quota() {
    let env = CliTestEnv::new();

    let output = run_writeai(&env, &["usage"]);
    assert_success(&["usage"], &output);
    let out = stdout(&output);
    assert!(out.contains("Plan:            free"));
    assert!(out.contains("0/10000 words used"));

    let output = run_writeai(&env, &["reset-usage"]);
    assert_success(&["reset-usage"], &output);
    assert!(stdout(&output).contains("Usage counter reset"));
}

#[test]
fn edit_changes_content_and_status() {
    let env = CliTestEnv::new();

    let output = run_writeai(&env, &["new", "Essay"]);
    assert_success(&["new", "Essay"], &output);
    let id = created_id(&output);

    let args = [
        "edit",
        &id,
        "--content",
        "one two three",
        "--status",
        "completed",
    ];
    let output = run_writeai(&env, &args);
    assert_success(&args, &output);
    let out = stdout(&output);
    assert!(out.contains("Status: completed"));
    assert!(out.contains("Words:  3"));

    // The completed project now shows up under the status filter
    let args = ["list", "--status", "completed"];
    let output = run_writeai(&env, &args);
    assert_success(&args, &output);
    assert!(stdout(&output).contains("Essay"));

    // An edit with nothing to change fails cleanly
    let output = run_writeai(&env, &["edit", &id]);
    assert!(!output.status.success());

    // So does an unknown status
    let output = run_writeai(&env, &["edit", &id, "--status", "bogus"]);
    assert!(!output.status.success());
}

#[test]
fn projects_are_private_to_each_user() {
    let env = CliTestEnv::new();

    let output = run_writeai(&env, &["new", "Mine"]);
    assert_success(&["new", "Mine"], &output);
    let id = created_id(&output);

    // Another user can neither read, edit, nor delete the project
    let output = run_writeai(&env, &["--user", "bob", "show", &id]);
    assert!(!output.status.success());
    let output = run_writeai(&env, &["--user", "bob", "edit", &id, "--title", "Stolen"]);
    assert!(!output.status.success());
    let output = run_writeai(&env, &["--user", "bob", "rm", &id]);
    assert!(!output.status.success());

    // The owner still sees it untouched
    let output = run_writeai(&env, &["show", &id]);
    assert_success(&["show", &id], &output);
    assert!(stdout(&output).contains("Mine"));
}

#[test]
fn generate_without_provider_fails_cleanly() {
    let env = CliTestEnv::new();

    let output = run_writeai(&env, &["generate", "write a haiku"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not configured"),
        "expected configuration error, got:\n{stderr}"
    );
}

#[test]
fn template_create_and_render() {
    let env = CliTestEnv::new();

    let args = [
        "new-template",
        "Greeting",
        "Hello {name}, welcome to {place}!",
        "--category",
        "email",
    ];
    let output = run_writeai(&env, &args);
    assert_success(&args, &output);

    let out = stdout(&output);
    let id = out
        .trim()
        .rsplit(' ')
        .next()
        .expect("template id in output")
        .to_string();

    let args = [
        "render",
        &id,
        "--var",
        "name=Ada",
        "--var",
        "place=the studio",
    ];
    let output = run_writeai(&env, &args);
    assert_success(&args, &output);
    assert!(stdout(&output).contains("Hello Ada, welcome to the studio!"));

    // Rendering bumped the usage counter shown in the last column
    let output = run_writeai(&env, &["templates"]);
    assert_success(&["templates"], &output);
    let out = stdout(&output);
    let row = out
        .lines()
        .find(|line| line.contains("Greeting"))
        .expect("template row in listing");
    assert!(
        row.trim_end().ends_with(" 1"),
        "expected usage count 1 in row: {row}"
    );
}

#[test]
fn catalogs_and_status_work_without_database() {
    let env = CliTestEnv::new();

    let output = run_writeai(&env, &["tools"]);
    assert_success(&["tools"], &output);
    let out = stdout(&output);
    assert!(out.contains("article"));
    assert!(out.contains("Text-to-Speech"));

    let output = run_writeai(&env, &["voices"]);
    assert_success(&["voices"], &output);
    assert!(stdout(&output).contains("en-us-ana"));

    let output = run_writeai(&env, &["status"]);
    assert_success(&["status"], &output);
    let out = stdout(&output);
    assert!(out.contains("Text provider:   not configured"));
    assert!(out.contains("10000 words/month"));
}
