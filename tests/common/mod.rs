//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use preview_gateway::config::GatewayConfig;
use preview_gateway::lifecycle::{bootstrap, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// A request as seen by the mock upstream.
#[derive(Debug)]
#[allow(dead_code)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then(|| v.trim().to_string())
        })
    }
}

/// Start a mock upstream that answers every request with `status` and `body`,
/// reporting each received request on the returned channel.
#[allow(dead_code)]
pub async fn start_programmable_backend(
    status: u16,
    body: &'static str,
    delay: Duration,
) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let Some(captured) = read_request(&mut socket).await else {
                            return;
                        };
                        let _ = tx.send(captured);
                        tokio::time::sleep(delay).await;

                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            401 => "401 Unauthorized",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start a mock upstream that aborts every connection with an RST after
/// reading the request.
#[allow(dead_code)]
pub async fn start_resetting_backend() -> SocketAddr {
    start_hanging_up_backend(true).await
}

/// Start a mock upstream that closes every connection normally (FIN) after
/// reading the request, without writing a response.
#[allow(dead_code)]
pub async fn start_closing_backend() -> SocketAddr {
    start_hanging_up_backend(false).await
}

async fn start_hanging_up_backend(reset: bool) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                if reset {
                    // Zero linger turns the close into an RST.
                    let _ = socket2::SockRef::from(&socket).set_linger(Some(Duration::ZERO));
                } else {
                    let _ = socket.shutdown().await;
                }
                drop(socket);
            });
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let length = head
        .lines()
        .find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);

    while buf.len() < head_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(CapturedRequest {
        head,
        body: buf[head_end..].to_vec(),
    })
}

/// A gateway running on an ephemeral port.
#[allow(dead_code)]
pub struct RunningGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Config rooted in `dir`, relaying to `upstream`.
#[allow(dead_code)]
pub fn gateway_config(dir: &Path, upstream: SocketAddr) -> GatewayConfig {
    std::fs::write(dir.join("obert-ai.html"), "<main>app</main>").unwrap();
    std::fs::write(dir.join("landing.html"), "<main>landing</main>").unwrap();

    let mut config = GatewayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.upstream.api_key = "sk-integration".into();
    config.upstream.url = format!("http://{}/chat/completions", upstream);
    config.content.preview_path = dir.join("preview.html");
    config.content.app_document = dir.join("obert-ai.html");
    config.content.landing_document = dir.join("landing.html");
    config
}

/// Bootstrap and serve a gateway in the background.
#[allow(dead_code)]
pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let server = bootstrap(config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningGateway { addr, shutdown }
}

/// HTTP client that never reuses connections.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
