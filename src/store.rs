use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use http::{HeaderMap, HeaderName, Request, header};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::{
    error::Result,
    parse::parse_cookie_header,
    set_cookie::{AttributeList, CookieInit, CookieInput, DeleteOptions, set_cookie},
};

/// A cookie as returned by [`RequestCookieStore::get`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieListItem {
    pub name: String,
    pub value: String,
}

/// Cookie Store API for a single request.
///
/// The store is populated from the request's `Cookie` header and records every change so they
/// can be exported as `Set-Cookie` headers with [`headers`](Self::headers). This is not a
/// browser polyfill: nothing is persisted and no change events are dispatched.
#[derive(Debug, Clone, Default)]
pub struct RequestCookieStore {
    origin: Option<Url>,
    cookies: IndexMap<String, String>,
    changes: IndexMap<String, AttributeList>,
}

impl RequestCookieStore {
    pub fn new(cookie_header: Option<&str>, origin: Option<Url>) -> Self {
        Self {
            origin,
            cookies: parse_cookie_header(cookie_header),
            changes: IndexMap::new(),
        }
    }

    /// Build a store from the `Cookie` and `Origin` request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(
            cookie_header(headers).as_deref(),
            origin_header(headers),
        )
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self::from_headers(req.headers())
    }

    pub fn origin(&self) -> Option<&Url> {
        self.origin.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<CookieListItem> {
        self.cookies.get(name).map(|value| CookieListItem {
            name: name.to_owned(),
            value: value.clone(),
        })
    }

    pub fn get_all(&self) -> Vec<CookieListItem> {
        self.cookies
            .iter()
            .map(|(name, value)| CookieListItem {
                name: name.clone(),
                value: value.clone(),
            })
            .collect()
    }

    /// Set a cookie, either from a `(name, value)` pair or a [`CookieInit`].
    ///
    /// Cookies with disallowed characters are ignored without an error and leave the store
    /// untouched. A cookie whose expiry is already in the past removes the name.
    pub fn set<I: Into<CookieInput>>(&mut self, input: I) -> Result<()> {
        let Some(cookie) = set_cookie(input, self.origin.as_ref())? else {
            return Ok(());
        };

        let expired = cookie.is_expired_at(OffsetDateTime::now_utc());
        let attributes = cookie.attributes;
        let name = attributes.name().to_owned();

        if expired {
            self.cookies.shift_remove(&name);
        } else {
            self.cookies
                .insert(name.clone(), attributes.value().to_owned());
        }
        self.changes.insert(name, attributes);

        Ok(())
    }

    /// Delete a cookie by name, or by name scoped to a domain and path.
    pub fn delete<D: Into<DeleteOptions>>(&mut self, options: D) -> Result<()> {
        self.set(CookieInit::from(options.into()))
    }

    /// The recorded changes as `Set-Cookie` headers, one per changed name.
    pub fn headers(&self) -> Vec<(HeaderName, String)> {
        self.changes
            .values()
            .map(|attrs| (header::SET_COOKIE, attrs.to_string()))
            .collect()
    }

    /// The recorded attribute lists, keyed by cookie name.
    pub fn changes(&self) -> &IndexMap<String, AttributeList> {
        &self.changes
    }

    /// The current cookies as a `Cookie` header string.
    pub fn to_cookie_string(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Serialize a single cookie into a `Set-Cookie` value, without any origin context.
    ///
    /// Returns `Ok(None)` for cookies that would be silently ignored by [`set`](Self::set).
    pub fn to_set_cookie(init: CookieInit) -> Result<Option<String>> {
        Ok(set_cookie(init, None)?.map(|cookie| cookie.attributes.to_string()))
    }
}

/// Clonable handle to one [`RequestCookieStore`], shared between the middleware and a handler.
#[derive(Debug, Clone, Default)]
pub struct SharedCookieStore {
    inner: Arc<Mutex<RequestCookieStore>>,
}

impl SharedCookieStore {
    pub fn new(store: RequestCookieStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    // Every mutation leaves the store consistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, RequestCookieStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<CookieListItem> {
        self.lock().get(name)
    }

    pub fn get_all(&self) -> Vec<CookieListItem> {
        self.lock().get_all()
    }

    pub fn set<I: Into<CookieInput>>(&self, input: I) -> Result<()> {
        self.lock().set(input)
    }

    pub fn delete<D: Into<DeleteOptions>>(&self, options: D) -> Result<()> {
        self.lock().delete(options)
    }

    pub fn headers(&self) -> Vec<(HeaderName, String)> {
        self.lock().headers()
    }

    pub fn to_cookie_string(&self) -> String {
        self.lock().to_cookie_string()
    }
}

impl From<RequestCookieStore> for SharedCookieStore {
    fn from(store: RequestCookieStore) -> Self {
        Self::new(store)
    }
}

/// All `Cookie` header fields joined into one value.
pub(crate) fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| match value.to_str() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(err = %err, "skipping non-ascii cookie header");
                None
            }
        })
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

pub(crate) fn origin_header(headers: &HeaderMap) -> Option<Url> {
    let origin = headers.get(header::ORIGIN)?;
    let origin = match origin.to_str() {
        Ok(origin) => origin,
        Err(err) => {
            tracing::warn!(err = %err, "origin header is not valid ascii");
            return None;
        }
    };

    match Url::parse(origin) {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::warn!(err = %err, origin, "ignoring unparsable origin header");
            None
        }
    }
}
