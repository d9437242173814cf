#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    /// Path, optionally with the exact query string (`/api/v2/items?page=1`).
    pub target: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Route {
    pub fn new(method: &'static str, target: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

pub struct FakeApi {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeApi {
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

fn matches(route: &Route, method: &str, target: &str) -> bool {
    if route.method != method {
        return false;
    }
    if route.target.contains('?') {
        return route.target == target;
    }
    target.split('?').next() == Some(route.target.as_str())
}

fn handle(stream: TcpStream, routes: &[Route], requests: &Mutex<Vec<RecordedRequest>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            if name == "content-length" {
                content_length = value.trim().parse().unwrap_or(0);
            } else if name == "authorization" {
                authorization = Some(value.trim().to_string());
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).expect("read body");

    requests.lock().expect("lock").push(RecordedRequest {
        method: method.clone(),
        target: target.clone(),
        authorization,
        body: String::from_utf8_lossy(&body).to_string(),
    });

    let route = routes.iter().find(|r| matches(r, &method, &target));
    let (status, headers, body) = match route {
        Some(r) => (r.status, r.headers.clone(), r.body.clone()),
        None => (404, Vec::new(), r#"{"message":"Not found"}"#.to_string()),
    };

    let mut response = format!(
        "HTTP/1.1 {status} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        body.len()
    );
    for (name, value) in headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(&body);

    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Serve `routes` on an ephemeral port until the test process exits.
pub fn spawn(routes: Vec<Route>) -> FakeApi {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else {
                continue;
            };
            handle(stream, &routes, &recorded);
        }
    });

    FakeApi {
        base_url: format!("http://{addr}/api/v2/"),
        requests,
    }
}

pub fn item_json(id: &str, title: &str, created_at: &str, updated_at: &str) -> String {
    serde_json::json!({
        "body": format!("# {title}\n"),
        "created_at": created_at,
        "id": id,
        "private": false,
        "tags": [{"name": "Go", "versions": ["1.14"]}],
        "title": title,
        "updated_at": updated_at,
        "url": format!("https://qiita.com/tester/items/{id}"),
        "user": {"id": "tester", "name": "Tester"}
    })
    .to_string()
}

pub fn qiisync(workdir: &std::path::Path, base_dir: &std::path::Path, api: Option<&FakeApi>) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("qiisync");
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("QIISYNC_HOME", workdir)
        .env("QIISYNC_CONFIG_PATH", workdir.join("no-config.toml"))
        .env("QIISYNC_API_TOKEN", "test-token")
        .env("QIISYNC_BASE_DIR", base_dir)
        .env("QIISYNC_FILENAME_MODE", "id")
        .env_remove("QIISYNC_QUIET")
        .env_remove("QIISYNC_LOG_FORMAT")
        .env_remove("QIISYNC_PER_PAGE")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy");
    if let Some(api) = api {
        cmd.env("QIISYNC_BASE_URL", &api.base_url);
    } else {
        cmd.env_remove("QIISYNC_BASE_URL");
    }
    cmd
}
