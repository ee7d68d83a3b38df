//! FleurMarket 인증/인가 REST API.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 가입/로그인 및 Bearer 토큰 발급 (HS256)
//! - JWT 검증 미들웨어 (발급자/대상/만료 엄격 검사, 스큐 허용 0초)
//! - 평탄한 역할 집합 기반 접근 제어 (admin / prestataire / client)
//! - 기동 시 역할·슈퍼 관리자 시드 (멱등)
//!
//! # 모듈 구성
//!
//! - [`config`]: 환경 변수 설정 (JWT 설정은 기동 시 fail-fast 검증)
//! - [`auth`]: 토큰 발급/검증, 역할 게이트, 비밀번호 해싱
//! - [`store`]: 자격 증명 저장소 추상화 및 Postgres 구현
//! - [`seed`]: 기동 시 역할/슈퍼 관리자 부트스트랩
//! - [`routes`]: REST API 엔드포인트
//! - [`state`]: 애플리케이션 공유 상태 (AppState)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

pub use auth::{
    hash_password, require_any_role, verify_password, AdminAuth, AuthContext, AuthRejection,
    Claims, JwtAuth, OptionalJwtAuth, RoleSet,
};
pub use config::{AppConfig, AuthConfig, ConfigError, SeedConfig, ServerConfig};
pub use error::{ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use seed::{ensure_bootstrapped, SeedError};
pub use state::AppState;
pub use store::{CredentialStore, PgCredentialStore, StoreError, User};

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
