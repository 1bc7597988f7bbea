use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use cfgd_container::{Container, MemoryConfiguration, Registry};
use cfgd_kernel::domain::config::ApiConfig;
use cfgd_kernel::server::ApiState;
use cfgd_kernel::server::router::system_router;
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_container_size() {
    let registry = Registry::new();
    registry.insert(MemoryConfiguration::new("alpha", "Alpha"));
    registry.insert(MemoryConfiguration::new("beta", "Beta"));

    let state = ApiState::builder()
        .config(ApiConfig::default())
        .container(Container::new(registry))
        .build()
        .unwrap();
    let (router, _api) = system_router().with_state(state).split_for_parts();

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store, no-cache, must-revalidate"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "up");
    assert_eq!(json["configurations"], 2);
    assert_eq!(json["listeners"], 0);
}
