//! Purpose: Provide the HTTP echo server for `qcoerce serve`.
//! Exports: `ServeConfig`, `serve`, `app`.
//! Role: Axum-based loopback server that answers every request with its coerced query.
//! Invariants: `/healthz` answers `{"ok":true}`; every other path and method answers `{"query": ...}`.
//! Invariants: Loopback-only unless explicitly allowed.
//! Notes: Coercion runs in the query middleware; handlers only read `CoercedQuery`.

use axum::Router;
use axum::Json;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::json;
use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use tokio::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use query_coerce::json::to_json;
use query_coerce::{CoercedQuery, Error, ErrorKind, Policy, with_query_coercion};

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub allow_non_loopback: bool,
    pub policy: Policy,
}

pub async fn serve(config: ServeConfig) -> Result<(), Error> {
    validate_config(&config)?;

    init_tracing();

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to bind server")
                .with_hint("Check that the address is free, or pick another --bind.")
                .with_source(err)
        })?;
    let local_addr = listener.local_addr().unwrap_or(config.bind);
    tracing::info!(
        addr = %local_addr,
        boolean = config.policy.parse_boolean,
        null = config.policy.parse_null,
        number = config.policy.parse_number,
        undefined = config.policy.parse_undefined,
        "query echo server listening"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app(config.policy))
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("server failed")
                    .with_source(err)
            })?;
        }
        _ = shutdown_signal() => {
            tracing::info!("shutting down");
            let _ = shutdown_tx.send(());
            match tokio::time::timeout(Duration::from_secs(10), &mut server).await {
                Ok(result) => result.map_err(|err| {
                    Error::new(ErrorKind::Io)
                        .with_message("server failed")
                        .with_source(err)
                })?,
                Err(_) => {
                    return Err(Error::new(ErrorKind::Io).with_message("server shutdown timed out"));
                }
            }
        }
    };
    Ok(())
}

/// Router with coercion and request tracing installed.
pub fn app(policy: Policy) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .fallback(echo_query);
    with_query_coercion(router, policy).layer(TraceLayer::new_for_http())
}

fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(addr) => addr.is_loopback(),
        IpAddr::V6(addr) => addr.is_loopback(),
    }
}

fn validate_config(config: &ServeConfig) -> Result<(), Error> {
    if !is_loopback(config.bind.ip()) && !config.allow_non_loopback {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("non-loopback bind requires explicit opt-in")
            .with_hint("Re-run with --allow-non-loopback or use a loopback address."));
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

async fn healthz() -> Response {
    json_response(json!({ "ok": true }))
}

async fn echo_query(CoercedQuery(query): CoercedQuery) -> Response {
    json_response(json!({ "query": to_json(&query) }))
}

fn json_response(payload: serde_json::Value) -> Response {
    Json(payload).into_response()
}

#[cfg(test)]
mod tests {
    use super::{ServeConfig, app, serve, validate_config};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use query_coerce::{ErrorKind, Policy};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn config(bind: &str, allow_non_loopback: bool) -> ServeConfig {
        ServeConfig {
            bind: bind.parse().expect("bind"),
            allow_non_loopback,
            policy: Policy::default(),
        }
    }

    async fn call(policy: Policy, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let response = app(policy).oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn serve_rejects_non_loopback_bind() {
        let err = serve(config("0.0.0.0:0", false))
            .await
            .expect_err("expected usage error");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn non_loopback_requires_allow_flag() {
        let err = validate_config(&config("0.0.0.0:9780", false)).expect_err("usage error");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.hint().is_some());
        assert!(validate_config(&config("0.0.0.0:9780", true)).is_ok());
        assert!(validate_config(&config("127.0.0.1:9780", false)).is_ok());
        assert!(validate_config(&config("[::1]:9780", false)).is_ok());
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let (status, body) = call(Policy::default(), Method::GET, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn echo_returns_coerced_query_for_any_path() {
        let (status, body) = call(
            Policy::default(),
            Method::GET,
            "/anything/here?n=42&flag=true&gone=undefined&list=1&list=undefined",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "query": { "n": 42, "flag": true, "list": [1, null] } })
        );
    }

    #[tokio::test]
    async fn echo_answers_other_methods() {
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let (status, body) = call(Policy::default(), method, "/x?v=1.5").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "query": { "v": 1.5 } }));
        }
    }

    #[tokio::test]
    async fn echo_respects_policy() {
        let (_, body) = call(Policy::none(), Method::GET, "/?n=42&flag=true").await;
        assert_eq!(body, json!({ "query": { "n": "42", "flag": "true" } }));
    }
}
