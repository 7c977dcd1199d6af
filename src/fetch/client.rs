use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes prepared requests against the data source. Implemented by
/// [`super::BasicClient`] and by canned clients in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
