use super::client::HttpClient;
use async_trait::async_trait;
use std::time::Duration;

/// Connection settings for [`BasicClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// `host:port` or a full proxy URL. Applied to every request.
    pub proxy: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }

    /// Builds a client with timeouts and an optional proxy.
    pub fn with_options(options: &ClientOptions) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout);

        if let Some(proxy) = &options.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url(proxy))?);
        }

        Ok(Self(builder.build()?))
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Bare `host:port` addresses are taken as HTTPS proxies.
fn proxy_url(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("https://{}/", address)
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
