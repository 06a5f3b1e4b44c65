use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Run the `sylo` binary in `dir` against a SQLite store inside it
#[allow(dead_code)]
pub fn sylo(dir: &Path, args: &[&str]) -> Output {
    sylo_with_stdin(dir, args, None)
}

#[allow(dead_code)]
pub fn sylo_with_stdin(dir: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sylo"))
        .current_dir(dir)
        .args(args)
        .env("SYLO_LOG__PROFILE", "test")
        .env("SYLO_STORE__KIND", "sqlite")
        .env("SYLO_STORE__PATH", dir.join("store.db"))
        .env_remove("SYLO_CONFIG")
        .env_remove("SYLO_USER_ID")
        .env_remove("SYLO_USER_ROLE")
        .env_remove("SYLO_USER_EMAIL")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI");

    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).unwrap();
        }
    }
    child.wait_with_output().unwrap()
}

#[allow(dead_code)]
pub fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout is not JSON ({err}): {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}
