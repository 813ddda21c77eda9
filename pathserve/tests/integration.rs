use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

struct TestServer {
    process: Child,
}

impl TestServer {
    fn spawn(args: &[&str]) -> Self {
        // Use the compiled binary directly to avoid cargo lock contention
        let bin_path = env!("CARGO_BIN_EXE_pathserve");
        let process = Command::new(bin_path)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to start server");
        Self { process }
    }

    fn dump_stderr(&mut self) {
        if let Some(mut stderr) = self.process.stderr.take() {
            let mut s = String::new();
            let _ = stderr.read_to_string(&mut s);
            eprintln!("STDERR:\n{}", s);
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

async fn wait_for_server(url: &str, server: &mut TestServer) -> bool {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(Some(status)) = server.process.try_wait() {
            eprintln!("Server exited unexpectedly with status: {}", status);
            server.dump_stderr();
            return false;
        }
        if client.get(url).send().await.is_ok() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    eprintln!("Timeout waiting for server!");
    let _ = server.process.kill();
    server.dump_stderr();
    false
}

/// Ask the OS for a port that is free right now
fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Hello World</h1>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
    std::fs::write(dir.path().join("app.js.gz"), b"\x1f\x8bfake").unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/guide.html"), "guide").unwrap();
    dir
}

#[tokio::test]
async fn test_serve_command() {
    let dir = site();
    let root = dir.path().to_str().unwrap();
    let listen = format!("127.0.0.1:{}", free_port());
    let base = format!("http://{}", listen);
    let mut server = TestServer::spawn(&[
        "serve",
        "--root",
        root,
        "--listen",
        listen.as_str(),
        "--gzip",
        "--ext",
        "html",
        "--maxage",
        "60000",
    ]);
    assert!(
        wait_for_server(&format!("{}/", base), &mut server).await,
        "Server failed to start"
    );

    let resp = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
    assert_eq!(resp.headers()["cache-control"], "max-age=60");
    assert_eq!(resp.text().await.unwrap(), "<h1>Hello World</h1>");

    let resp = reqwest::get(format!("{}/docs/guide", base)).await.unwrap();
    assert_eq!(resp.text().await.unwrap(), "guide");

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/app.js", base))
        .header("accept-encoding", "gzip")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-encoding"], "gzip");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"\x1f\x8bfake");

    let resp = client.post(format!("{}/index.html", base)).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    let resp = reqwest::get(format!("{}/missing.txt", base)).await.unwrap();
    assert_eq!(resp.status(), 404);

    let resp = reqwest::get(format!("{}/%fdsa", base)).await.unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_run_with_config_mounts() {
    let public = site();
    let assets = tempfile::tempdir().unwrap();
    std::fs::write(assets.path().join("logo.svg"), "<svg/>").unwrap();

    let config_dir = tempfile::tempdir().unwrap();
    let config_path = config_dir.path().join("pathserve.toml");
    let listen = format!("127.0.0.1:{}", free_port());
    let base = format!("http://{}", listen);
    let mut file = std::fs::File::create(&config_path).unwrap();
    write!(
        file,
        r#"
listen = "{listen}"

[[mounts]]
root = "{assets}"
public_path = {{ regex = "^/assets/v[0-9]+" }}
headers = {{ "X-Served-By" = "pathserve" }}

[[mounts]]
root = "{public}"
public_path = "/site"
index = false
"#,
        listen = listen,
        assets = assets.path().to_str().unwrap().replace('\\', "/"),
        public = public.path().to_str().unwrap().replace('\\', "/"),
    )
    .unwrap();

    let mut server = TestServer::spawn(&["run", config_path.to_str().unwrap()]);
    assert!(
        wait_for_server(&format!("{}/", base), &mut server).await,
        "Server failed to start"
    );

    let resp = reqwest::get(format!("{}/assets/v2/logo.svg", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-served-by"], "pathserve");
    assert_eq!(resp.headers()["content-type"], "image/svg+xml");

    let resp = reqwest::get(format!("{}/site/index.html", base)).await.unwrap();
    assert_eq!(resp.text().await.unwrap(), "<h1>Hello World</h1>");

    // index disabled: the directory falls through every mount
    let resp = reqwest::get(format!("{}/site/", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.text().await.unwrap(), "Not Found");
}

#[test]
fn test_validate_command() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.json");
    std::fs::write(&good, r#"{"mounts": [{"root": "."}]}"#).unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"mounts": [{"root": ".", "index": "../escape.html"}]}"#).unwrap();

    let bin_path = env!("CARGO_BIN_EXE_pathserve");
    let status = Command::new(bin_path).arg("validate").arg(&good).status().unwrap();
    assert!(status.success());
    let status = Command::new(bin_path)
        .arg("validate")
        .arg(&bad)
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}
