use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::TransportError;

const WHOIS_PORT: u16 = 43;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB

/// Raw WHOIS probe: one TCP connection, one query line, read to EOF.
///
/// The transport knows nothing about fallback hosts or retries. It performs
/// exactly one exchange per call and reports how that exchange ended.
#[derive(Debug, Clone)]
pub struct WhoisTransport {
    timeout: Duration,
}

impl Default for WhoisTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisTransport {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Query a WHOIS server for one domain.
    ///
    /// The whole exchange (connect, send, drain to EOF) shares a single
    /// timeout budget, so the caller's wait is bounded by it.
    pub async fn query(&self, server: &str, domain: &str) -> Result<String, TransportError> {
        let addr = if server.contains(':') {
            server.to_string()
        } else {
            format!("{}:{}", server, WHOIS_PORT)
        };

        debug!(server = %server, domain = %domain, "Querying WHOIS server");

        match timeout(self.timeout, exchange(&addr, domain)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(source)) => Err(TransportError::Unreachable {
                server: server.to_string(),
                source,
            }),
            Err(_) => Err(TransportError::Timeout {
                server: server.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

async fn exchange(addr: &str, domain: &str) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(addr).await?;

    // Send query with CRLF
    let query = format!("{}\r\n", domain);
    stream.write_all(query.as_bytes()).await?;

    // Read until the server closes the connection
    let mut response = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break; // EOF
        }
        response.extend_from_slice(&buf[..n]);
        if response.len() > MAX_RESPONSE_SIZE {
            warn!(addr = %addr, "WHOIS response exceeds size cap, truncating");
            response.truncate(MAX_RESPONSE_SIZE);
            break;
        }
    }

    Ok(decode(response))
}

// Try UTF-8, fall back to Latin-1
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn reads_full_response_to_eof() {
        let addr = serve_once("Domain Name: EXAMPLE.COM\r\nRegistrar: Example Registrar\r\n").await;

        let transport = WhoisTransport::new();
        let response = transport.query(&addr, "example.com").await.unwrap();

        assert!(response.contains("Domain Name: EXAMPLE.COM"));
        assert!(response.contains("Registrar: Example Registrar"));
    }

    #[tokio::test]
    async fn sends_query_line_with_crlf() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 256];
            let n = socket.read(&mut buf).await.unwrap();
            tx.send(buf[..n].to_vec()).unwrap();
            socket.write_all(b"ok\r\n").await.unwrap();
        });

        let transport = WhoisTransport::new();
        transport.query(&addr, "example.com").await.unwrap();

        assert_eq!(rx.await.unwrap(), b"example.com\r\n");
    }

    #[tokio::test]
    async fn times_out_on_silent_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let transport = WhoisTransport::new().with_timeout(Duration::from_millis(100));
        let err = transport.query(&addr, "example.com").await.unwrap_err();

        assert!(matches!(err, TransportError::Timeout { .. }));
        assert_eq!(err.server(), addr);
    }

    #[tokio::test]
    async fn reports_unreachable_server() {
        // Bind to grab a free port, then drop it so the connect is refused.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let transport = WhoisTransport::new().with_timeout(Duration::from_secs(2));
        let err = transport.query(&addr, "example.com").await.unwrap_err();

        assert!(matches!(err, TransportError::Unreachable { .. }));
    }

    #[test]
    fn decodes_latin1_when_not_utf8() {
        let text = decode(vec![b'R', b'e', b'g', 0xE9]);
        assert_eq!(text, "Reg\u{e9}");
    }
}
