//! HTTP transport seam.
//!
//! The request assembler produces a [`RequestDescription`]; something
//! implementing [`HttpTransport`] performs it and hands back an
//! [`HttpResponse`]. Production code uses [`ReqwestTransport`], which posts
//! through a shared pooled [`reqwest::Client`]; tests script their own
//! implementations so the assembler and the tool-call loop can be exercised
//! without a network.
//!
//! # Example
//!
//! ```rust,no_run
//! use palaver::transport::{HttpTransport, ReqwestTransport};
//! use palaver::{Client, Provider, ToolChoice};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), palaver::Error> {
//! let mut client = Client::new(Provider::OpenAI, "sk-...", "gpt-4o-mini")?;
//! client.add_user("Hello, computer!", false);
//! let request = client.build_http_request(ToolChoice::Auto)?;
//! let response = ReqwestTransport.send(&request).await?;
//! client.update_messages(&response)?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use lazy_static::lazy_static;
use std::time::Duration;

use crate::palaver::error::Error;

/// Wire-level description of one provider request.
///
/// Fully materialised: headers, URL, body bytes, and the caller's timeout
/// bound. The assembler never talks to the network itself.
#[derive(Debug, Clone)]
pub struct RequestDescription {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// `None` means no client-side bound; the transport's own defaults apply.
    pub timeout: Option<Duration>,
}

impl RequestDescription {
    /// Body bytes interpreted as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A fully materialised provider response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A bodyless response with the given status, mostly useful in tests.
    pub fn with_status(status: u16) -> Self {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Body bytes interpreted as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The HTTP collaborator contract.
///
/// Implementations must be `Send + Sync` so one transport can serve
/// concurrent conversations. The core issues requests strictly sequentially
/// within a single conversation.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &RequestDescription) -> Result<HttpResponse, Error>;
}

lazy_static! {
    /// Shared HTTP client with persistent connection pooling.
    ///
    /// A single instance keeps TLS sessions and DNS lookups warm across
    /// requests and across conversations.
    static ref SHARED_HTTP_CLIENT: reqwest::Client = {
        reqwest::ClientBuilder::new()
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build shared HTTP client")
    };
}

/// Borrow the lazily initialised shared [`reqwest::Client`].
pub fn get_shared_http_client() -> &'static reqwest::Client {
    &SHARED_HTTP_CLIENT
}

/// Production transport backed by the shared pooled client.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &RequestDescription) -> Result<HttpResponse, Error> {
        let mut builder = get_shared_http_client()
            .request(request.method.clone(), &request.url)
            .body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        if log::log_enabled!(log::Level::Debug) {
            log::debug!("{} {} -> {}", request.method, request.url, status);
        }

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
