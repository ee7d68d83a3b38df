//! 인증 endpoint.
//!
//! - `POST /api/v1/auth/register` - 회원 가입 (client 역할 부여)
//! - `POST /api/v1/auth/login` - 로그인 (Bearer 토큰 발급)
//! - `GET  /api/v1/auth/me` - 현재 인증된 사용자 조회
//! - `GET  /api/v1/auth/session` - 세션 상태 조회 (공개, 토큰 선택)

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::auth::{jwt, password, roles, AuthRejection, JwtAuth, OptionalJwtAuth, RoleSet};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;
use crate::store::StoreError;

// ==================== 요청/응답 타입 ====================

/// 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// 발급된 Bearer 토큰
    pub access_token: String,
    /// 항상 "Bearer"
    pub token_type: String,
    /// 토큰 만료까지 남은 시간 (초)
    pub expires_in: i64,
    /// 발급 시점의 역할 목록
    pub roles: Vec<String>,
}

/// 회원 가입 요청.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// 회원 가입 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub roles: Vec<String>,
}

/// 현재 사용자 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub roles: Vec<String>,
}

/// 세션 상태 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/session", get(session))
}

// ==================== 핸들러 ====================

/// 로그인.
///
/// 모든 실패(없는 사용자, 틀린 비밀번호, 비활성 계정, 저장소 장애)가
/// 동일한 401로 응답합니다. 어느 단계에서 실패했는지 호출자가
/// 구분할 수 있으면 계정 탐색에 악용됩니다. 저장소 장애 시에도
/// 401인 것은 의도된 동작입니다. 저장소가 복구될 때까지 인증 라우트는
/// 모든 호출자를 거부합니다.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthRejection> {
    let user = state
        .store
        .find_by_username(req.username.trim())
        .await
        .map_err(|e| {
            warn!(error = %e, "로그인 중 저장소 접근 실패");
            AuthRejection::Unauthenticated
        })?
        .ok_or(AuthRejection::Unauthenticated)?;

    if !user.is_active {
        return Err(AuthRejection::Unauthenticated);
    }

    let verified = state
        .store
        .verify_password(&user, &req.password)
        .await
        .map_err(|e| {
            warn!(error = %e, "로그인 중 비밀번호 대조 실패");
            AuthRejection::Unauthenticated
        })?;
    if !verified {
        return Err(AuthRejection::Unauthenticated);
    }

    let role_names = state.store.roles_of(user.id).await.map_err(|e| {
        warn!(error = %e, "로그인 중 역할 조회 실패");
        AuthRejection::Unauthenticated
    })?;
    let role_set = RoleSet::from_names(&role_names);

    let token = jwt::issue(
        &state.auth,
        &user.id.to_string(),
        &user.username,
        &role_set,
        Utc::now(),
    )
    .map_err(|e| {
        error!(error = %e, "토큰 발급 실패");
        AuthRejection::Unauthenticated
    })?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.ttl_seconds(),
        roles: role_set.to_vec(),
    }))
}

/// 회원 가입.
///
/// 새 계정은 활성 상태로 생성되며 `client` 역할을 받습니다.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::new(
                "VALIDATION_ERROR",
                "사용자 이름이 비어 있습니다",
            )),
        ));
    }
    if req.password.len() < 6 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::new(
                "VALIDATION_ERROR",
                "비밀번호는 최소 6자 이상이어야 합니다",
            )),
        ));
    }

    let hash = password::hash_password(&req.password).map_err(|e| {
        error!(error = %e, "가입 중 비밀번호 해싱 실패");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new("INTERNAL_ERROR", "요청을 처리할 수 없습니다")),
        )
    })?;

    let user = state
        .store
        .create_user(username, &hash)
        .await
        .map_err(|e| match e {
            StoreError::DuplicateUsername(name) => (
                StatusCode::CONFLICT,
                Json(ApiErrorResponse::new(
                    "USERNAME_TAKEN",
                    format!("이미 존재하는 사용자 이름: {}", name),
                )),
            ),
            other => store_unavailable(other),
        })?;

    state
        .store
        .add_role(user.id, roles::CLIENT)
        .await
        .map_err(store_unavailable)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id.to_string(),
            username: user.username,
            roles: vec![roles::CLIENT.to_string()],
        }),
    ))
}

/// 현재 인증된 사용자 조회.
///
/// 토큰의 클레임을 그대로 되돌려줍니다. 발급 이후 역할이 바뀌었어도
/// 토큰이 만료될 때까지는 발급 시점 스냅샷이 보입니다.
async fn me(JwtAuth(claims): JwtAuth) -> Json<MeResponse> {
    Json(MeResponse {
        id: claims.sub,
        username: claims.username,
        roles: claims.roles,
    })
}

/// 세션 상태 조회.
///
/// 공개 라우트입니다. 유효한 토큰이 있으면 사용자 이름을 채우고,
/// 없거나 유효하지 않으면 익명으로 응답합니다. 요청을 거부하지
/// 않습니다.
async fn session(OptionalJwtAuth(claims): OptionalJwtAuth) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: claims.is_some(),
        username: claims.map(|c| c.username),
    })
}

fn store_unavailable(e: StoreError) -> (StatusCode, Json<ApiErrorResponse>) {
    warn!(error = %e, "저장소 접근 실패");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiErrorResponse::new("STORE_ERROR", "저장소에 접근할 수 없습니다")),
    )
}
