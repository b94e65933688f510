use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. The seam upstream clients are written against.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
