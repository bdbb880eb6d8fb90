//! Local HTTP stand-ins for the remote providers used in tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A loopback server answering every request with the same canned response.
pub struct StubServer {
  pub base: String,
  requests: Arc<Mutex<Vec<String>>>,
  handle: JoinHandle<()>,
}

impl StubServer {
  pub async fn start(status: u16, body: &str) -> Self {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    let body = body.to_string();

    let handle = tokio::spawn(async move {
      while let Ok((mut socket, _)) = listener.accept().await {
        let seen = Arc::clone(&seen);
        let body = body.clone();
        tokio::spawn(async move {
          let request = read_request(&mut socket).await;
          seen.lock().expect("stub request log").push(request);
          let reason = if status == 200 { "OK" } else { "Error" };
          let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
          );
          let _ = socket.write_all(response.as_bytes()).await;
          let _ = socket.shutdown().await;
        });
      }
    });

    Self { base: format!("http://{}", addr), requests, handle }
  }

  /// Raw text (head and body) of every request received so far.
  pub fn requests(&self) -> Vec<String> {
    self.requests.lock().expect("stub request log").clone()
  }
}

impl Drop for StubServer {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

async fn read_request(socket: &mut TcpStream) -> String {
  let mut data = Vec::new();
  let mut buf = [0u8; 4096];
  loop {
    let n = match tokio::time::timeout(Duration::from_secs(5), socket.read(&mut buf)).await {
      Ok(Ok(n)) if n > 0 => n,
      _ => break,
    };
    data.extend_from_slice(&buf[..n]);
    let text = String::from_utf8_lossy(&data);
    if let Some(head_end) = text.find("\r\n\r\n") {
      let content_length = text[..head_end]
        .lines()
        .find_map(|line| {
          let (name, value) = line.split_once(':')?;
          name.trim().eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
      if data.len() >= head_end + 4 + content_length {
        break;
      }
    }
  }
  String::from_utf8_lossy(&data).into_owned()
}

/// Base URL of a loopback port that refuses connections.
pub async fn dead_endpoint() -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe listener");
  let addr = listener.local_addr().expect("probe address");
  drop(listener);
  format!("http://{}", addr)
}

pub fn test_client() -> reqwest::Client {
  reqwest::Client::builder().timeout(Duration::from_secs(5)).build().expect("test client")
}
