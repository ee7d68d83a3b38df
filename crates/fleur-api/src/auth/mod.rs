//! 인증 및 권한 부여.
//!
//! JWT 기반 인증과 평탄한 역할 집합 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`Claims`]: JWT 페이로드 구조체
//! - [`jwt`]: 토큰 발급/검증 (HS256, 스큐 허용 0초)
//! - [`JwtAuth`] / [`AdminAuth`]: Axum 추출기
//! - [`roles`]: 역할 이름 정규화 및 집합 연산
//! - [`password`]: Argon2id 해싱
//!
//! # 알려진 제약
//!
//! 토큰 폐기 목록은 없습니다. 탈취된 토큰은 자연 만료 시까지
//! 유효하며, 로그아웃은 클라이언트가 토큰을 버리는 것으로 끝납니다.
//! 이는 수용된 한계이지 조용히 고칠 결함이 아닙니다.

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod roles;

pub use jwt::{issue, validate, Claims, TokenRejection};
pub use middleware::{
    require_any_role, AdminAuth, AuthContext, AuthRejection, JwtAuth, OptionalJwtAuth,
    PrestataireAuth,
};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::RoleSet;
