use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Run the CLI against `api_url` with an isolated session file.
pub fn run_cli_with_env(args: &[&str], session_file: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fintrack"));
    cmd.args(args);
    cmd.env("FINTRACK_API_URL", api_url);
    cmd.env("FINTRACK_SESSION_FILE", session_file);
    cmd.env_remove("FINTRACK_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI off the async runtime so the mock server keeps serving.
pub async fn run_cli(args: &[&str], session_file: &Path, api_url: &str) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let session_file: PathBuf = session_file.to_path_buf();
    let api_url = api_url.to_string();

    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli_with_env(&args, &session_file, &api_url)
    })
    .await
    .expect("CLI task panicked")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], session_file: &Path, api_url: &str) -> String {
    let output = run_cli(args, session_file, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}
