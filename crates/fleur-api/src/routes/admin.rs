//! 관리자 endpoint.
//!
//! - `GET /api/v1/admin/users` - 전체 사용자/역할 목록 (admin 역할 필요)

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::AdminAuth;
use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 사용자 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct UsersListResponse {
    pub users: Vec<AdminUserResponse>,
    pub total: usize,
}

/// 관리자 화면용 사용자 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminUserResponse {
    pub id: String,
    pub username: String,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub created_at: String,
}

/// 관리자 라우터 생성.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new().route("/users", get(list_users))
}

/// 전체 사용자 목록 조회.
///
/// `AdminAuth` 추출기가 게이트 역할을 합니다. admin 역할이 없는
/// 호출자는 이 핸들러에 도달하지 못합니다.
async fn list_users(
    AdminAuth(_claims): AdminAuth,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UsersListResponse>> {
    let users = state.store.list_users().await.map_err(|e| {
        warn!(error = %e, "사용자 목록 조회 실패");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiErrorResponse::new("STORE_ERROR", "저장소에 접근할 수 없습니다")),
        )
    })?;

    let mut out = Vec::with_capacity(users.len());
    for user in users {
        let roles = state.store.roles_of(user.id).await.map_err(|e| {
            warn!(error = %e, "역할 조회 실패");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiErrorResponse::new("STORE_ERROR", "저장소에 접근할 수 없습니다")),
            )
        })?;

        out.push(AdminUserResponse {
            id: user.id.to_string(),
            username: user.username,
            is_active: user.is_active,
            roles,
            created_at: user.created_at.to_rfc3339(),
        });
    }

    Ok(Json(UsersListResponse {
        total: out.len(),
        users: out,
    }))
}
