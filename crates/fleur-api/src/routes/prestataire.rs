//! 판매자 endpoint.
//!
//! - `GET /api/v1/prestataire/dashboard` - 판매자 대시보드
//!   (prestataire 또는 admin 역할 필요)

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::PrestataireAuth;
use crate::state::AppState;

/// 판매자 대시보드 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub username: String,
    pub roles: Vec<String>,
}

/// 판매자 라우터 생성.
pub fn prestataire_router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}

/// 판매자 대시보드.
///
/// `{admin, prestataire}` 중 하나의 역할만 있으면 접근 가능합니다
/// (OR 시맨틱). client 역할만 가진 호출자는 403을 받습니다.
async fn dashboard(PrestataireAuth(claims): PrestataireAuth) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        username: claims.username,
        roles: claims.roles,
    })
}
