//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! Arc로 래핑되어 Axum의 State extractor를 통해 핸들러에 주입됩니다.
//! 인증 코어는 요청별 상태를 갖지 않으므로 여기에는 불변 핸들만
//! 들어 있습니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::config::AuthConfig;
use crate::store::CredentialStore;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 자격 증명 저장소 (사용자/역할)
    pub store: Arc<dyn CredentialStore>,

    /// JWT 발급/검증 설정 (기동 시점에 검증 완료)
    pub auth: Arc<AuthConfig>,

    /// readiness 체크용 DB 풀. 저장소 구현이 Postgres가 아닐 수
    /// 있으므로 선택적입니다.
    pub db_pool: Option<PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, auth: Arc<AuthConfig>) -> Self {
        Self {
            store,
            auth,
            db_pool: None,
            started_at: Utc::now(),
        }
    }

    /// readiness 체크용 DB 풀 설정.
    #[must_use]
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

/// 테스트용 AppState 생성 (인메모리 저장소).
///
/// 상태와 함께 저장소 핸들도 돌려주므로 테스트에서 사용자를 직접
/// 심을 수 있습니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> (Arc<AppState>, Arc<crate::store::MemoryCredentialStore>) {
    let store = Arc::new(crate::store::MemoryCredentialStore::new());
    let auth = Arc::new(
        AuthConfig::new(
            "fleur-api",
            "fleur-clients",
            "test-secret-key-for-jwt-testing-minimum-32-chars",
            60,
        )
        .expect("test auth config"),
    );

    let state = AppState::new(store.clone(), auth);
    (Arc::new(state), store)
}
