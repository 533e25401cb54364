//! Purpose: Attach coerced query values to axum requests.
//! Exports: `CoercedQuery`, `coerce_query`, `coerce_or_keep`, `with_query_coercion`.
//! Role: HTTP adapter around the pure engine; sources the query and stores the result.
//! Invariants: Coercion failures never reject a request; the decoded tree is used instead.
//! Invariants: The result lives in request extensions; the request URI is left untouched.
//! Notes: `CoercedQuery` still works without the middleware, minus coercion.
use std::convert::Infallible;

use axum::Router;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::Response;

use crate::core::coerce::coerce;
use crate::core::policy::Policy;
use crate::core::value::Value;
use crate::query;

/// The effective query of a request, as seen by handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct CoercedQuery(pub Value);

impl CoercedQuery {
    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// Installs [`coerce_query`] on every route of `router`.
pub fn with_query_coercion<S>(router: Router<S>, policy: Policy) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(policy, coerce_query))
}

/// Middleware body: decode, coerce, and store the query for later extractors.
pub async fn coerce_query(
    State(policy): State<Policy>,
    mut request: Request,
    next: Next,
) -> Response {
    let decoded = query::decode(request.uri().query().unwrap_or_default());
    let effective = coerce_or_keep(decoded, &policy);
    request.extensions_mut().insert(CoercedQuery(effective));
    next.run(request).await
}

/// Coerces `decoded`, falling back to it unchanged when the engine refuses.
pub fn coerce_or_keep(decoded: Value, policy: &Policy) -> Value {
    match coerce(&decoded, policy) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "failed to coerce query parameters; keeping decoded values");
            decoded
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CoercedQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<CoercedQuery>() {
            return Ok(existing.clone());
        }
        tracing::warn!(
            path = %parts.uri.path(),
            "query coercion middleware is not installed; using decoded values"
        );
        Ok(CoercedQuery(query::decode(
            parts.uri.query().unwrap_or_default(),
        )))
    }
}
