use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socioprice::audience::{snapshots_from_inputs, AccountSnapshotInput, SocialAccountSnapshot};
use socioprice::pricing::PricingAnalysis;
use socioprice::{PricingError, PricingRecommendation, PricingRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecommendRequest {
    pub product: PricingRequest,
    #[serde(default)]
    pub accounts: Vec<AccountSnapshotInput>,
    #[serde(default)]
    pub save: bool,
}

impl ApiRecommendRequest {
    pub fn into_parts(
        self,
        received_at: DateTime<Utc>,
    ) -> Result<(PricingRequest, Vec<SocialAccountSnapshot>), PricingError> {
        let accounts = snapshots_from_inputs(self.accounts, received_at)?;
        Ok((self.product, accounts))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUserRecommendRequest {
    pub product: PricingRequest,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecommendResponse {
    #[serde(flatten)]
    pub recommendation: PricingRecommendation,
    pub fingerprint: String,
    pub history_id: Option<String>,
    pub total_followers: u64,
    pub accounts_used: usize,
}

impl ApiRecommendResponse {
    pub fn from_analysis(
        analysis: PricingAnalysis,
        fingerprint: String,
        history_id: Option<String>,
    ) -> Self {
        Self {
            total_followers: analysis.aggregated.total_followers,
            accounts_used: analysis.accounts_used,
            recommendation: analysis.recommendation,
            fingerprint,
            history_id,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
