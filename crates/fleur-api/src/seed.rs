//! 기동 시 역할/슈퍼 관리자 시드.
//!
//! 프로세스 시작 시 한 번 실행되어 기본 역할 집합과 슈퍼 관리자
//! 계정의 존재를 보장합니다. 몇 번을 실행해도 결과가 같도록(멱등)
//! 작성되어 있습니다.
//!
//! 실패 처리: 호출 지점(`main`)에서 로그만 남기고 기동을 계속합니다.
//! 저장소 장애로 시드가 실패해도 서비스는 떠서 공개 라우트를
//! 제공해야 하고, 보호된 라우트는 저장소가 복구될 때까지 호출자를
//! 거부하는 것으로 충분합니다.

use tracing::{info, warn};

use crate::auth::{password, roles};
use crate::config::SeedConfig;
use crate::store::{CredentialStore, StoreError};

/// 시드 실패.
///
/// `main`에서 로그로 소비되고, 프로세스를 죽이지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("SUPER_ADMIN_PASSWORD가 설정되지 않아 슈퍼 관리자를 생성할 수 없습니다")]
    MissingSuperAdminPassword,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 역할과 슈퍼 관리자 계정의 존재를 보장.
///
/// 1. `required_roles`의 각 역할을 생성 (이미 있으면 no-op)
/// 2. 슈퍼 관리자 계정이 없으면 생성하고 역할 부여
/// 3. 계정은 있는데 역할이 빠져 있으면 역할만 보수
///    (이전 시드가 중간에 끊긴 경우)
pub async fn ensure_bootstrapped(
    store: &dyn CredentialStore,
    cfg: &SeedConfig,
) -> Result<(), SeedError> {
    for role in &cfg.required_roles {
        store.ensure_role(role).await?;
    }
    info!(count = cfg.required_roles.len(), "필수 역할 시드 완료");

    let admin_role = roles::normalize(&cfg.super_admin_role);

    match store.find_by_username(&cfg.super_admin_username).await? {
        Some(user) => {
            if !store.has_role(user.id, &admin_role).await? {
                store.add_role(user.id, &admin_role).await?;
                warn!(
                    username = %user.username,
                    role = %admin_role,
                    "슈퍼 관리자 역할 누락을 보수했습니다"
                );
            }
        }
        None => {
            let password = cfg
                .super_admin_password
                .as_deref()
                .ok_or(SeedError::MissingSuperAdminPassword)?;

            let hash = password::hash_password(password).map_err(StoreError::from)?;
            let user = store.create_user(&cfg.super_admin_username, &hash).await?;
            store.add_role(user.id, &admin_role).await?;
            info!(
                username = %user.username,
                role = %admin_role,
                "슈퍼 관리자 계정을 생성했습니다"
            );
        }
    }

    Ok(())
}
