mod common;

use serde_json::Value;
use std::fs;

use common::{command, run, serve_once, unique_temp_dir, write_credentials};

#[test]
fn ok_response_prints_reply_and_exits_zero() {
    let dir = unique_temp_dir("cli", "ok");
    let (base_url, server) = serve_once("200 OK", r#"{"choices":[{"message":{"content":"hello"}}]}"#);
    let creds = write_credentials(&dir, &base_url);

    let output = run(command(&creds).args(["say", "hello"]));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0), "stdout:\n{stdout}");
    assert!(stdout.contains("Prompt: say hello"), "stdout:\n{stdout}");
    assert!(
        stdout.contains(&format!("Using API endpoint: {base_url}/v1")),
        "stdout:\n{stdout}"
    );
    assert!(
        stdout.contains("Response from Qwen:\nhello\n"),
        "stdout:\n{stdout}"
    );
    assert!(
        stdout.contains("Direct API call successful!"),
        "stdout:\n{stdout}"
    );

    let request = server.join().expect("server thread should join");
    assert!(
        request.starts_with("POST /v1/chat/completions "),
        "request:\n{request}"
    );
    let body = request
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .expect("request should have a body");
    let payload: Value = serde_json::from_str(body).expect("body should be JSON");
    assert_eq!(payload["messages"][0]["content"], "say hello");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn server_error_prints_status_and_body_and_exits_one() {
    let dir = unique_temp_dir("cli", "500");
    let (base_url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
    let creds = write_credentials(&dir, &format!("{base_url}/"));

    let output = run(command(&creds).arg("hi"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "stdout:\n{stdout}");
    assert!(
        stdout.contains("API call failed with status code: 500\n{\"error\":\"boom\"}"),
        "stdout:\n{stdout}"
    );
    assert!(stdout.contains("Test failed"), "stdout:\n{stdout}");
    assert!(!stderr.contains("panicked"), "stderr:\n{stderr}");

    server.join().expect("server thread should join");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn file_argument_sends_file_contents() {
    let dir = unique_temp_dir("cli", "file");
    let (base_url, server) = serve_once("200 OK", r#"{"choices":[{"message":{"content":"done"}}]}"#);
    let creds = write_credentials(&dir, &base_url);
    let prompt_path = dir.join("prompt.md");
    fs::write(&prompt_path, "Summarize:\nfirst\nsecond").expect("write prompt");

    let output = run(command(&creds).arg(&prompt_path));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0), "stdout:\n{stdout}");
    assert!(
        stdout.contains(&format!(
            "Using content of file '{}' as prompt",
            prompt_path.display()
        )),
        "stdout:\n{stdout}"
    );

    let request = server.join().expect("server thread should join");
    let body = request
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .expect("request should have a body");
    let payload: Value = serde_json::from_str(body).expect("body should be JSON");
    assert_eq!(
        payload["messages"][0]["content"],
        "Summarize:\nfirst\nsecond"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_credentials_exits_one_without_network() {
    let dir = unique_temp_dir("cli", "nocreds");

    let output = run(command(&dir.join("oauth_creds.json")).arg("hi"));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1), "stdout:\n{stdout}");
    assert!(stdout.contains("No credentials found"), "stdout:\n{stdout}");
    assert!(!stdout.contains("Using API endpoint"), "stdout:\n{stdout}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn no_arguments_prints_usage_and_exits_two() {
    let dir = unique_temp_dir("cli", "usage");

    let output = run(&mut command(&dir.join("oauth_creds.json")));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(2), "stdout:\n{stdout}");
    assert!(stdout.starts_with("Usage: qwen-direct"), "stdout:\n{stdout}");

    let _ = fs::remove_dir_all(&dir);
}
