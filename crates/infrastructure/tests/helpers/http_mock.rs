use super::dns_server_mock::{build_response, MockAnswer};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What a mock HTTP server sends back for every request.
#[derive(Debug, Clone)]
pub enum MockHttpReply {
    /// RFC 8484 answer built from the query carried by the request.
    DnsMessage(MockAnswer),
    Json(&'static str),
    Status(u16),
    /// 200 with a non-DNS content type.
    Html,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub body: Vec<u8>,
}

/// Plain HTTP/1.1 server answering one request per connection.
pub struct MockHttpServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl MockHttpServer {
    pub async fn start(reply: MockHttpReply) -> std::io::Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let reply = reply.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, reply, recorded).await;
                });
            }
        });

        Ok(Self {
            addr,
            requests,
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    reply: MockHttpReply,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let header = |name: &str| {
        head.split("\r\n")
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim().to_string())
    };
    let content_length: usize = header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    let request = RecordedRequest {
        method,
        target,
        content_type: header("content-type"),
        accept: header("accept"),
        body,
    };
    let (status, content_type, payload) = respond(&request, &reply);
    recorded.lock().unwrap().push(request);

    let mut response = format!(
        "HTTP/1.1 {} Mock\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        payload.len()
    )
    .into_bytes();
    response.extend_from_slice(&payload);
    stream.write_all(&response).await?;
    stream.shutdown().await
}

fn respond(request: &RecordedRequest, reply: &MockHttpReply) -> (u16, &'static str, Vec<u8>) {
    match reply {
        MockHttpReply::DnsMessage(answer) => {
            let query = if request.method == "POST" {
                Some(request.body.clone())
            } else {
                request
                    .target
                    .split_once("dns=")
                    .and_then(|(_, encoded)| URL_SAFE_NO_PAD.decode(encoded).ok())
            };
            match query.and_then(|q| build_response(&q, answer)) {
                Some(message) => (200, "application/dns-message", message),
                None => (400, "text/plain", b"bad query".to_vec()),
            }
        }
        MockHttpReply::Json(body) => (200, "application/json", body.as_bytes().to_vec()),
        MockHttpReply::Status(status) => (*status, "text/plain", Vec::new()),
        MockHttpReply::Html => (200, "text/html", b"<html></html>".to_vec()),
    }
}
