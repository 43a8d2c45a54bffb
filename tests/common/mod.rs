#![allow(dead_code)]

use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn unique_temp_dir(prefix: &str, suffix: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "qwen-direct-{prefix}-{suffix}-{stamp}-{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("failed to create temp directory");
    dir
}

/// A `qwen-direct` invocation isolated from the caller's environment.
pub fn command(credentials_path: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qwen-direct"));
    cmd.env("QWEN_CREDENTIALS_PATH", credentials_path)
        .env("QWEN_TIMEOUT_SECS", "5")
        .env_remove("QWEN_MODEL")
        .env_remove("QWEN_TEMPERATURE")
        .env_remove("RUST_LOG")
        .env_remove("LOG_OUTPUT")
        .env_remove("LOG_FORMAT")
        .env_remove("LOG_FILE_PATH")
        .env_remove("LOG_FILE_LIMIT");
    for proxy_var in ["http_proxy", "HTTP_PROXY", "all_proxy", "ALL_PROXY"] {
        cmd.env_remove(proxy_var);
    }
    cmd
}

pub fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run qwen-direct binary")
}

pub fn write_credentials(dir: &Path, resource_url: &str) -> PathBuf {
    let path = dir.join("oauth_creds.json");
    let body = serde_json::json!({
        "access_token": "integration-token",
        "refresh_token": "unused",
        "resource_url": resource_url,
    });
    fs::write(&path, body.to_string()).expect("failed to write credentials");
    path
}

pub fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept should succeed");
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .expect("write should succeed");
        request
    });
    (format!("http://{addr}"), handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let read = stream.read(&mut chunk).expect("read should succeed");
        if read == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..read]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
