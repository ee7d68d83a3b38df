//! 자격 증명 저장소 추상화.
//!
//! 인증 코어는 [`CredentialStore`] trait을 통해서만 사용자/역할
//! 데이터에 접근합니다. 구체 저장 엔진(Postgres 등)은 trait 구현
//! 교체로 바꿀 수 있고, 인증 코어는 수정할 필요가 없습니다.
//!
//! 역할 이름은 구현이 저장/조회 시 정규화합니다
//! ([`crate::auth::roles::normalize`] 기준).

mod postgres;

#[cfg(any(test, feature = "test-utils"))]
mod memory;

pub use postgres::PgCredentialStore;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryCredentialStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::password::{self, PasswordError};

/// 저장소 오류.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 동일한 사용자 이름이 이미 존재
    #[error("이미 존재하는 사용자 이름: {0}")]
    DuplicateUsername(String),
    /// 대상 사용자 없음
    #[error("사용자를 찾을 수 없음: {0}")]
    UserNotFound(Uuid),
    /// 비밀번호 해시 처리 실패
    #[error("비밀번호 처리 실패: {0}")]
    Password(#[from] PasswordError),
    /// 저장소 접근 실패 (연결 불가 등)
    #[error("저장소 접근 실패: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// 사용자 레코드.
///
/// 계정은 삭제하지 않습니다. 비활성화가 필요하면 `is_active`를
/// 내립니다 (소프트 비활성화).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// 자격 증명 저장소 인터페이스.
///
/// 시드와 로그인 경로가 필요로 하는 최소 능력 집합입니다.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 사용자 이름으로 조회.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// 사용자 생성. `password_hash`는 이미 해시된 값이어야 합니다.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    /// 역할이 없으면 생성 (멱등).
    async fn ensure_role(&self, name: &str) -> Result<(), StoreError>;

    /// 역할 부여 (이미 보유 중이면 no-op).
    async fn add_role(&self, user_id: Uuid, role: &str) -> Result<(), StoreError>;

    /// 역할 보유 여부.
    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, StoreError>;

    /// 사용자의 역할 목록 (정렬됨).
    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<String>, StoreError>;

    /// 전체 사용자 목록 (관리자 화면용).
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// 평문 비밀번호를 저장된 해시와 대조.
    async fn verify_password(&self, user: &User, candidate: &str) -> Result<bool, StoreError> {
        Ok(password::verify_password(candidate, &user.password_hash)?)
    }
}
