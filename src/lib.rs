//! A request-scoped cookie store with a browser-style API.
//!
//! The store is populated from a request's `Cookie` header, lets handlers read and change
//! cookies the way the [Cookie Store API](https://wicg.github.io/cookie-store) does in a
//! browser, and records every change so it can be written back as `Set-Cookie` headers.
//!
//! Use [`RequestCookieStore`] directly, or add [`CookieStoreLayer`] to a `tower` stack to get a
//! [`SharedCookieStore`] in request extensions and have the changes appended to the response.
//!
//! # Validation
//! Outbound cookies are validated strictly. Malformed input such as an empty name and value, a
//! `, ` sequence in the value, a relative path or an unknown `sameSite` value is a
//! [`CookieError`]. Borderline input that a browser would quietly drop (control characters, `=`
//! in the name, `;` in the value, domain or path) is ignored without an error.
//!
//! Inbound `Cookie` headers are parsed leniently and never fail.
//!
//! # Origin
//! When the request carries an `Origin` header, a cookie's Domain must domain-match its host
//! and every cookie gets `Secure` unless the host is `localhost`. Without an origin neither
//! rule applies.

mod config;
mod error;
pub mod layer;
pub mod parse;
pub mod set_cookie;
mod store;

pub use crate::config::CookieStoreConfig;
pub use crate::error::{CookieError, Result};
pub use crate::layer::CookieStoreLayer;
pub use crate::parse::parse_cookie_header;
pub use crate::set_cookie::{
    AttributeList, CookieInit, CookieInput, CookieSameSite, DeleteOptions, Directive, Expires,
    SetCookie, attrs_to_set_cookie, set_cookie,
};
pub use crate::store::{CookieListItem, RequestCookieStore, SharedCookieStore};
