//! Cross-origin boundary: the CORS response layer plus an origin gate that
//! keeps disallowed origins away from the handlers entirely.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use configs::CorsConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::errors::{ApiError, StartupError};

#[derive(Clone, Debug)]
pub enum OriginPolicy {
    Any,
    AllowList(Arc<Vec<HeaderValue>>),
}

impl OriginPolicy {
    pub fn from_config(cfg: &CorsConfig) -> Result<Self, StartupError> {
        if cfg.allow_any_origin {
            return Ok(Self::Any);
        }
        let origins = cfg
            .allowed_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o)
                    .map_err(|_| StartupError::InvalidConfig(format!("bad allowed origin {o:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::AllowList(Arc::new(origins)))
    }

    pub fn allows(&self, origin: &HeaderValue) -> bool {
        match self {
            Self::Any => true,
            Self::AllowList(list) => list.iter().any(|o| o == origin),
        }
    }

    pub fn cors_layer(&self) -> CorsLayer {
        match self {
            Self::Any => CorsLayer::permissive(),
            Self::AllowList(list) => CorsLayer::new()
                .allow_origin(AllowOrigin::list(list.iter().cloned()))
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        }
    }
}

/// Middleware: reject requests whose `Origin` is not allowed.
/// Requests without an `Origin` header are same-origin or non-browser and pass.
pub async fn enforce_origin(State(policy): State<OriginPolicy>, req: Request, next: Next) -> Response {
    if let Some(origin) = req.headers().get(header::ORIGIN) {
        if !policy.allows(origin) {
            warn!(event = "origin_rejected", origin = ?origin, path = %req.uri().path(), "cross-origin request rejected");
            return ApiError::new(StatusCode::FORBIDDEN, "Origin not allowed").into_response();
        }
    }
    next.run(req).await
}
