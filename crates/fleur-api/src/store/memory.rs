//! 테스트용 인메모리 자격 증명 저장소.
//!
//! 단위 테스트에서 Postgres 없이 시드/로그인 경로를 검증할 때
//! 사용합니다. `unavailable()`로 만들면 저장소 장애를 흉내냅니다.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CredentialStore, StoreError, User};
use crate::auth::roles;

#[derive(Default)]
struct Inner {
    users: BTreeMap<Uuid, User>,
    roles: BTreeSet<String>,
    memberships: BTreeSet<(Uuid, String)>,
}

/// 인메모리 구현.
pub struct MemoryCredentialStore {
    inner: Mutex<Inner>,
    unavailable: bool,
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            unavailable: false,
        }
    }

    /// 모든 호출이 `StoreError::Unavailable`로 실패하는 저장소.
    ///
    /// 저장소 장애 시에도 서비스가 기동해야 한다는 계약을
    /// 테스트할 때 사용합니다.
    pub fn unavailable() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            unavailable: true,
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    /// 저장된 역할 수 (테스트 검증용).
    pub fn role_count(&self) -> usize {
        self.inner.lock().unwrap().roles.len()
    }

    /// 계정 활성 플래그 변경 (테스트 검증용, 소프트 비활성화).
    pub fn set_active(&self, user_id: Uuid, active: bool) {
        if let Some(user) = self.inner.lock().unwrap().users.get_mut(&user_id) {
            user.is_active = active;
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username.trim())
            .cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        self.check_available()?;
        let username = username.trim();
        let mut inner = self.inner.lock().unwrap();

        if inner.users.values().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn ensure_role(&self, name: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.inner
            .lock()
            .unwrap()
            .roles
            .insert(roles::normalize(name));
        Ok(())
    }

    async fn add_role(&self, user_id: Uuid, role: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let role = roles::normalize(role);
        let mut inner = self.inner.lock().unwrap();

        if !inner.users.contains_key(&user_id) {
            return Err(StoreError::UserNotFound(user_id));
        }
        inner.roles.insert(role.clone());
        inner.memberships.insert((user_id, role));
        Ok(())
    }

    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .memberships
            .contains(&(user_id, roles::normalize(role))))
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .memberships
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, role)| role.clone())
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryCredentialStore::new();
        let user = store.create_user("marie", "hash").await.unwrap();

        let found = store.find_by_username("marie").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(found.is_active);
        assert!(store.find_by_username("paul").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryCredentialStore::new();
        store.create_user("marie", "hash").await.unwrap();

        let result = store.create_user("marie", "other-hash").await;
        assert!(matches!(result, Err(StoreError::DuplicateUsername(_))));
    }

    #[tokio::test]
    async fn test_role_membership_normalized() {
        let store = MemoryCredentialStore::new();
        let user = store.create_user("marie", "hash").await.unwrap();

        store.add_role(user.id, "Admin").await.unwrap();

        // 대소문자가 달라도 같은 역할로 취급
        assert!(store.has_role(user.id, "ADMIN").await.unwrap());
        assert_eq!(store.roles_of(user.id).await.unwrap(), vec!["admin"]);

        // 중복 부여는 no-op
        store.add_role(user.id, "admin").await.unwrap();
        assert_eq!(store.roles_of(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_everything() {
        let store = MemoryCredentialStore::unavailable();

        assert!(matches!(
            store.find_by_username("marie").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.ensure_role("admin").await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
