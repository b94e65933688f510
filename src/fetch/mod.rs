mod basic;
mod client;

pub use basic::{BasicClient, ClientOptions};
pub use client::HttpClient;

use reqwest::{StatusCode, Url};

/// Issues a GET and returns the status together with the body text.
///
/// Non-success statuses are returned, not raised, so callers can inspect the
/// body of error responses.
pub async fn get_text<C: HttpClient + ?Sized>(
    client: &C,
    url: Url,
) -> reqwest::Result<(StatusCode, String)> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    Ok((status, resp.text().await?))
}
