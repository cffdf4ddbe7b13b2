use std::net::SocketAddr;

use axum::{Extension, Router, routing::get};
use request_cookie_store::{CookieInit, CookieStoreConfig, CookieStoreLayer, SharedCookieStore};

async fn index(Extension(cookies): Extension<SharedCookieStore>) -> String {
    let n: usize = cookies
        .get("n")
        .and_then(|cookie| cookie.value.parse().ok())
        .unwrap_or(0);
    cookies
        .set(
            CookieInit::new("n", (n + 1).to_string())
                .with_http_only(true)
                .with_same_site("lax"),
        )
        .expect("cookie set succeeds");
    format!("n={n}")
}

async fn reset(Extension(cookies): Extension<SharedCookieStore>) -> &'static str {
    cookies.delete("n").expect("cookie delete succeeds");
    "reset"
}

#[tokio::main]
async fn main() {
    let config = CookieStoreConfig::default()
        // Default: true (Secure and Domain checks follow the request's Origin header)
        .with_origin_header(true)
        // Default: None
        .without_default_origin();
    let cookie_layer = CookieStoreLayer::new().with_config(config);

    let app = Router::new()
        .route("/", get(index))
        .route("/reset", get(reset))
        .layer(cookie_layer);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("tcp listener binds successfully");
    let local_addr = listener.local_addr().expect("local address is available");
    println!("listening at http://{local_addr}");

    axum::serve(listener, app)
        .await
        .expect("server runs successfully");
}
