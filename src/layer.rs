use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use http::{HeaderValue, Request, Response};
use tower_layer::Layer;
use tower_service::Service;

use crate::{config::CookieStoreConfig, store::SharedCookieStore};

/// Inserts a [`SharedCookieStore`] into request extensions and writes its recorded changes to
/// the response as `Set-Cookie` headers.
#[derive(Debug, Clone, Default)]
pub struct CookieStoreLayer {
    config: CookieStoreConfig,
}

impl CookieStoreLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: CookieStoreConfig) -> Self {
        self.config = config;
        self
    }
}

#[derive(Debug, Clone)]
pub struct CookieStoreManager<S> {
    inner: S,
    config: CookieStoreConfig,
}

impl<S> Layer<S> for CookieStoreLayer {
    type Service = CookieStoreManager<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieStoreManager {
            inner,
            config: self.config.clone(),
        }
    }
}

impl<ReqBody, ResBody, S> Service<Request<ReqBody>> for CookieStoreManager<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let store = SharedCookieStore::new(self.config.build_store(req.headers()));
        req.extensions_mut().insert(store.clone());

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut res = inner.call(req).await?;

            for (name, value) in store.headers() {
                match HeaderValue::try_from(value) {
                    Ok(value) => {
                        res.headers_mut().append(name, value);
                    }
                    Err(err) => {
                        tracing::warn!(err = %err, "dropping unrepresentable set-cookie header");
                    }
                }
            }

            Ok(res)
        })
    }
}
