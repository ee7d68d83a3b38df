//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/auth` - 가입/로그인/현재 사용자
//! - `/api/v1/prestataire` - 판매자 전용 (prestataire 또는 admin 역할 필요)
//! - `/api/v1/admin` - 관리자 전용 (admin 역할 필요)

pub mod admin;
pub mod auth;
pub mod health;
pub mod prestataire;

pub use admin::{admin_router, AdminUserResponse, UsersListResponse};
pub use auth::{
    auth_router, LoginRequest, LoginResponse, MeResponse, RegisterResponse, SessionResponse,
};
pub use health::{health_router, ComponentStatus, HealthResponse, ReadinessResponse};
pub use prestataire::{prestataire_router, DashboardResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/auth", auth_router())
        .nest("/api/v1/prestataire", prestataire_router())
        .nest("/api/v1/admin", admin_router())
}
