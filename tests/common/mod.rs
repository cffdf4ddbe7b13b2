#![allow(dead_code)]

// Shared helpers for integration tests.
//
// Emitted `Set-Cookie` headers are also checked with `tower_cookies::Cookie` parsing, so the
// output is verified by a cookie parser other than our own.
use std::convert::Infallible;

use axum::body::Body;
use http::{HeaderMap, Request, Response, header};
use http_body_util::BodyExt as _;
use request_cookie_store::{CookieInit, SharedCookieStore};
use tower_cookies::Cookie;

pub const COOKIE: &str = "foo=bar; user=bert; no=mad";

pub async fn body_string(body: Body) -> String {
    // Collect an Axum body into a UTF-8 string for assertions.
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn store_of<B>(req: &Request<B>) -> SharedCookieStore {
    req.extensions()
        .get::<SharedCookieStore>()
        .cloned()
        .expect("request includes SharedCookieStore extension")
}

pub async fn handler(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    // Basic handler used by many tests: set a single cookie.
    store_of(&req)
        .set(CookieInit::new("bee", "hive"))
        .expect("cookie set succeeds");

    Ok(Response::new(Body::empty()))
}

pub async fn noop_handler(_: Request<Body>) -> Result<Response<Body>, Infallible> {
    // Handler that does not touch the cookie store at all.
    Ok(Response::new(Body::empty()))
}

pub fn set_cookie_values(headers: &HeaderMap) -> Vec<String> {
    // All `Set-Cookie` values in header order.
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| {
            value
                .to_str()
                .expect("set-cookie header is valid utf-8")
                .to_owned()
        })
        .collect()
}

pub fn parse_set_cookie(value: &str) -> Cookie<'static> {
    Cookie::parse(value.to_owned()).expect("set-cookie parses successfully")
}

pub fn get_set_cookie(headers: &HeaderMap, name: &str) -> Cookie<'static> {
    // Find and parse the `Set-Cookie` header for `name`.
    set_cookie_values(headers)
        .iter()
        .map(|value| parse_set_cookie(value))
        .find(|cookie| cookie.name() == name)
        .expect("response includes set-cookie header for name")
}
