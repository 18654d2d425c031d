/*!
Test support helpers shared across integration tests.

- serve(status, body): one-route HTTP server on 127.0.0.1, answers every request the same way
- serve_hanging(): accepts connections and never answers
- closed_port(): a local port with nothing listening
- helper(): `ecs-task-helper` command with a clean ECS environment
- METADATA_BODY / METADATA_ENVIRON: the task metadata document and its environment projection
*/

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Metadata endpoint payload (task metadata v4 shape).
#[allow(dead_code)]
pub const METADATA_BODY: &str = r#"{"ContainerARN":"arn:a","Name":"curl","Image":"img","Labels":{"com.amazonaws.ecs.cluster":"default","com.amazonaws.ecs.task-arn":"arn:t","com.amazonaws.ecs.task-definition-family":"fam","com.amazonaws.ecs.task-definition-version":"3"}}"#;

/// The seven entries derived from `METADATA_BODY`, in order.
#[allow(dead_code)]
pub const METADATA_ENVIRON: [&str; 7] = [
    "ECS_CONTAINER_ARN=arn:a",
    "ECS_CONTAINER_NAME=curl",
    "ECS_CONTAINER_IMAGE=img",
    "ECS_TASK_ARN=arn:t",
    "ECS_TASK_DEFINITION_FAMILY=fam",
    "ECS_TASK_DEFINITION_VERSION=3",
    "ECS_CLUSTER_NAME=default",
];

/// The built binary with endpoint, timeout and ECS_* variables removed.
#[allow(dead_code)]
pub fn helper() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ecs-task-helper"));
    cmd.env_remove("ECS_CONTAINER_METADATA_URI_V4")
        .env_remove("ECS_CONTAINER_METADATA_URI_V4_TIMEOUT")
        .env_remove("ECS_TASK_HELPER_LOG")
        .env_remove("RUST_LOG");
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("ECS_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn read_request_head(stream: &mut TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    loop {
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&tmp[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => break,
        }
    }
}

/// Start a background server answering every request with `status` and `body`.
/// Returns the base URL (`http://127.0.0.1:<port>/`).
#[allow(dead_code)]
pub fn serve(status: u16, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let port = listener.local_addr().expect("local_addr failed").port();
    let body = body.to_string();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            read_request_head(&mut stream);
            let resp = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                reason(status),
                body.len()
            );
            let _ = stream.write_all(resp.as_bytes());
            let _ = stream.flush();
        }
    });
    format!("http://127.0.0.1:{port}/")
}

/// Start a background server that accepts connections and never responds.
#[allow(dead_code)]
pub fn serve_hanging() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let port = listener.local_addr().expect("local_addr failed").port();
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    format!("http://127.0.0.1:{port}/")
}

/// A port on 127.0.0.1 with no listener (bound, then released).
#[allow(dead_code)]
pub fn closed_port() -> u16 {
    let l = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    l.local_addr().expect("local_addr failed").port()
}
