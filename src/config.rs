use http::HeaderMap;
use url::Url;

use crate::store::{RequestCookieStore, cookie_header, origin_header};

/// How [`CookieStoreLayer`](crate::CookieStoreLayer) builds the store for each request.
#[derive(Debug, Clone)]
pub struct CookieStoreConfig {
    pub(crate) use_origin_header: bool,
    pub(crate) default_origin: Option<Url>,
}

impl Default for CookieStoreConfig {
    fn default() -> Self {
        Self {
            use_origin_header: true,
            default_origin: None,
        }
    }
}

impl CookieStoreConfig {
    /// Whether the request's `Origin` header decides `Secure` and domain matching.
    #[must_use]
    pub fn with_origin_header(mut self, use_origin_header: bool) -> Self {
        self.use_origin_header = use_origin_header;
        self
    }

    /// Origin to assume when the request does not provide one.
    #[must_use]
    pub fn with_default_origin(mut self, origin: Url) -> Self {
        self.default_origin = Some(origin);
        self
    }

    #[must_use]
    pub fn without_default_origin(mut self) -> Self {
        self.default_origin = None;
        self
    }

    pub(crate) fn build_store(&self, headers: &HeaderMap) -> RequestCookieStore {
        let origin = self
            .use_origin_header
            .then(|| origin_header(headers))
            .flatten()
            .or_else(|| self.default_origin.clone());

        RequestCookieStore::new(cookie_header(headers).as_deref(), origin)
    }
}
