mod http;
mod local;

pub use http::HttpFetcher;
pub use local::{LocalFetcher, write_atomically};

use anyhow::Result;
use async_trait::async_trait;

/// Trait for retrieving the full contents of a resource
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch every byte of `resource`
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>>;

    /// Full location `resource` is fetched from, used to name archive entries
    fn locate(&self, resource: &str) -> String {
        resource.to_string()
    }
}

/// Returns `true` for resources that must be retrieved over HTTP(S)
pub fn is_http_url(resource: &str) -> bool {
    resource.starts_with("http://") || resource.starts_with("https://")
}

/// Fetcher that routes each resource by scheme
///
/// A base prefix is prepended to every resource first, so relative paths can
/// be resolved against either a server root or a local directory.
pub struct SourceFetcher {
    base: String,
    http: HttpFetcher,
    local: LocalFetcher,
}

impl SourceFetcher {
    pub fn new(base: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base: base.into(),
            http: HttpFetcher::new()?,
            local: LocalFetcher::new("."),
        })
    }

    /// Resolve a resource against the base prefix
    pub fn resolve(&self, resource: &str) -> String {
        if is_http_url(resource) {
            resource.to_string()
        } else {
            format!("{}{}", self.base, resource)
        }
    }

    /// Get total bytes received over HTTP
    pub fn transferred_bytes(&self) -> u64 {
        self.http.transferred_bytes()
    }
}

#[async_trait]
impl Fetch for SourceFetcher {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>> {
        let location = self.resolve(resource);
        if is_http_url(&location) {
            self.http.fetch(&location).await
        } else {
            self.local.fetch(&location).await
        }
    }

    fn locate(&self, resource: &str) -> String {
        self.resolve(resource)
    }
}
