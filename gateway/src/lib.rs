//! Custody API Gateway
//!
//! 接收 JSON 请求，转发给 custody gRPC 服务，原样返回 JSON 响应。

pub mod custody;
pub mod grpc;
pub mod routing;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use custody::{custody_routes, CustodyPort, CustodyState};

/// 构建网关路由
pub fn app(
    custody: Arc<dyn CustodyPort>,
    metrics: Option<PrometheusHandle>,
    cors_allowed_origins: &[String],
) -> Router {
    // 先创建带状态的路由，再合并无状态的路由
    custody_routes()
        .with_state(CustodyState::new(custody))
        .merge(routing::api_routes(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_allowed_origins))
}

/// CORS 配置，未配置来源时放行所有来源
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custody::MockCustodyPort;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/custody/get")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = app(
            Arc::new(MockCustodyPort::new()),
            None,
            &["http://localhost:3000".to_string()],
        );

        let response = app.oneshot(preflight("http://localhost:3000")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let app = app(
            Arc::new(MockCustodyPort::new()),
            None,
            &["http://localhost:3000".to_string()],
        );

        let response = app.oneshot(preflight("http://evil.example")).await.unwrap();
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_health_is_merged_into_app() {
        let app = app(Arc::new(MockCustodyPort::new()), None, &[]);

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
