use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;

use crate::api::{ApiError, ApiRecommendRequest, ApiRecommendResponse, ApiUserRecommendRequest};
use crate::history::{new_entry_id, HistoryEntry, HistoryStore};
use socioprice::audience::{AccountSnapshotInput, AccountStore, Platform, SocialAccountSnapshot};
use socioprice::config::PricingConfig;
use socioprice::pricing::PricingPipeline;
use socioprice::{input_fingerprint, PricingRequest};

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<PricingPipeline>,
    accounts: Arc<AccountStore>,
    history: Arc<HistoryStore>,
}

impl AppState {
    pub async fn from_config(config: &PricingConfig) -> Result<Self, String> {
        let accounts = AccountStore::load(config.storage.accounts_path())
            .await
            .map_err(|err| err.to_string())?;
        let history = HistoryStore::load(
            config.storage.history_path(),
            config.storage.history_limit,
        )
        .await
        .map_err(|err| err.to_string())?;
        Ok(Self {
            pipeline: Arc::new(PricingPipeline::from_config(config)),
            accounts: Arc::new(accounts),
            history: Arc::new(history),
        })
    }
}

pub async fn serve(args: crate::ServeArgs, config: PricingConfig) -> Result<(), String> {
    let state = AppState::from_config(&config).await?;
    let app = build_router(state, args.web_root.as_deref());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!(%addr, data_dir = %config.storage.data_dir.display(), "starting pricing service");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| format!("failed to bind server: {}", err))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

pub fn build_router(state: AppState, web_root: Option<&str>) -> Router {
    let api = Router::new()
        .route("/api/health", get(health))
        .route("/api/recommend", post(recommend_handler))
        .route(
            "/api/users/:user_id/accounts",
            get(list_accounts_handler).put(upsert_account_handler),
        )
        .route(
            "/api/users/:user_id/accounts/:platform",
            delete(delete_account_handler),
        )
        .route("/api/users/:user_id/recommend", post(user_recommend_handler))
        .route("/api/history", get(list_history_handler))
        .route(
            "/api/history/:entry_id",
            get(get_history_handler).delete(delete_history_handler),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match web_root {
        Some(web_root) => {
            let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
            let static_service =
                ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));
            api.fallback_service(static_service)
        }
        None => api,
    }
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn recommend_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiRecommendRequest>,
) -> Result<Json<ApiRecommendResponse>, ApiError> {
    let save = request.save;
    let (product, accounts) = request.into_parts(Utc::now())?;
    respond(&state, product, &accounts, save).await
}

async fn user_recommend_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<ApiUserRecommendRequest>,
) -> Result<Json<ApiRecommendResponse>, ApiError> {
    let accounts = state.accounts.accounts(&user_id).await;
    info!(%user_id, accounts = accounts.len(), "pricing against stored accounts");
    respond(&state, request.product, &accounts, request.save).await
}

async fn respond(
    state: &AppState,
    product: PricingRequest,
    accounts: &[SocialAccountSnapshot],
    save: bool,
) -> Result<Json<ApiRecommendResponse>, ApiError> {
    let fingerprint = input_fingerprint(&product, accounts);
    let analysis = state.pipeline.analyze(&product, accounts)?;

    let history_id = if save {
        let entry = HistoryEntry {
            id: new_entry_id(&fingerprint),
            created_at: Utc::now(),
            fingerprint: fingerprint.clone(),
            request: product,
            recommendation: analysis.recommendation.clone(),
        };
        let saved = state.history.add(entry).await?;
        Some(saved.id)
    } else {
        None
    };

    Ok(Json(ApiRecommendResponse::from_analysis(
        analysis,
        fingerprint,
        history_id,
    )))
}

async fn list_accounts_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<SocialAccountSnapshot>> {
    Json(state.accounts.accounts(&user_id).await)
}

async fn upsert_account_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(input): Json<AccountSnapshotInput>,
) -> Result<Json<Vec<SocialAccountSnapshot>>, ApiError> {
    let snapshot = input.into_snapshot(Utc::now())?;
    info!(%user_id, platform = snapshot.platform.label(), "storing account snapshot");
    let accounts = state.accounts.upsert(&user_id, snapshot).await?;
    Ok(Json(accounts))
}

async fn delete_account_handler(
    State(state): State<AppState>,
    Path((user_id, platform)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let platform = Platform::from_str(&platform)
        .ok_or_else(|| ApiError::not_found(format!("unknown platform: {}", platform)))?;
    if state.accounts.remove(&user_id, platform).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("account not found"))
    }
}

async fn list_history_handler(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.list().await)
}

async fn get_history_handler(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<HistoryEntry>, ApiError> {
    state
        .history
        .get(&entry_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("history entry not found"))
}

async fn delete_history_handler(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.history.delete(&entry_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("history entry not found"))
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down pricing service");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn test_state(dir: &std::path::Path) -> AppState {
        let mut config = PricingConfig::default();
        config.storage.data_dir = dir.to_path_buf();
        AppState::from_config(&config).await.unwrap()
    }

    async fn call(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn recommend_returns_wire_shape() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await, None);

        let body = serde_json::json!({
            "product": { "name": "Guide", "productType": "ebook" },
            "accounts": [ { "platform": "instagram", "followerCount": 100 } ]
        });
        let (status, value) = call(app, Method::POST, "/api/recommend", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["overallRecommendation"]["optimalPrice"], 27.0);
        assert_eq!(value["overallRecommendation"]["minPrice"], 22.0);
        assert_eq!(value["overallRecommendation"]["maxPrice"], 32.0);
        assert_eq!(value["segments"][0]["name"], "Core Audience");
        assert_eq!(value["segments"][0]["recommendedPrices"][0]["amount"], 27.0);
        assert!(value["historyId"].is_null());
    }

    #[tokio::test]
    async fn invalid_product_type_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await, None);

        let body = serde_json::json!({ "product": { "name": "X", "productType": "spaceship" } });
        let (status, value) = call(app, Method::POST, "/api/recommend", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].as_str().unwrap().contains("spaceship"));
    }

    #[tokio::test]
    async fn negative_followers_are_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await, None);

        let body = serde_json::json!({
            "product": { "name": "X", "productType": "course" },
            "accounts": [ { "platform": "tiktok", "followerCount": -5 } ]
        });
        let (status, _) = call(app, Method::POST, "/api/recommend", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stored_accounts_feed_user_recommendations_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await, None);

        let account = serde_json::json!({
            "platform": "linkedin",
            "followerCount": 10000,
            "demographics": { "location": { "United States": 1.0 } }
        });
        let (status, stored) = call(
            app.clone(),
            Method::PUT,
            "/api/users/u1/accounts",
            Some(account),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stored.as_array().unwrap().len(), 1);

        let body = serde_json::json!({
            "product": { "name": "Course", "productType": "course" },
            "save": true
        });
        let (status, value) = call(
            app.clone(),
            Method::POST,
            "/api/users/u1/recommend",
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["totalFollowers"], 10000);
        let history_id = value["historyId"].as_str().unwrap().to_string();

        let uri = format!("/api/history/{}", history_id);
        let (status, entry) = call(app.clone(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entry["request"]["productType"], "course");

        let (status, _) = call(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_unknown_account_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await, None);

        let (status, _) = call(
            app,
            Method::DELETE,
            "/api/users/nobody/accounts/instagram",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
