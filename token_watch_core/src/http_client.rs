// HTTP client abstraction for the price-quote services

use crate::error::CoreError;
use async_trait::async_trait;
use std::rc::Rc;

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, CoreError>;

/// Abstract HTTP client trait.
/// Implementations should handle platform-specific HTTP requests and treat
/// any non-2xx status as an error.
#[async_trait(?Send)]
pub trait HttpClient {
    /// Fetch text content from a URL with a GET request
    async fn fetch_text(&self, url: &str) -> HttpResult<String>;
}

#[async_trait(?Send)]
impl<T: HttpClient + ?Sized> HttpClient for Rc<T> {
    async fn fetch_text(&self, url: &str) -> HttpResult<String> {
        (**self).fetch_text(url).await
    }
}
