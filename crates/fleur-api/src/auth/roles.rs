//! 역할 기반 접근 제어 (RBAC).
//!
//! 마켓플레이스 역할 이름과 역할 집합 연산을 정의합니다.
//! 역할은 계층 없는 평탄한 문자열 집합이며, 이름은 항상
//! 정규화(트림 + 소문자)된 형태로만 저장/비교합니다.

use std::collections::BTreeSet;

/// 관리자 역할 (정규화된 이름).
pub const ADMIN: &str = "admin";
/// 판매자 역할.
pub const PRESTATAIRE: &str = "prestataire";
/// 구매자 역할.
pub const CLIENT: &str = "client";

/// 역할 이름 정규화.
///
/// 설정, 토큰, 저장소 어디에서 온 이름이든 이 함수를 거친
/// 형태로만 비교합니다. 역할 이름 유일성 불변식은 정규화된
/// 이름 기준입니다.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 정규화된 역할 이름 집합.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// 빈 집합 생성.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// 이름 목록에서 생성.
    ///
    /// 정규화를 거치므로 대소문자만 다른 이름은 하나로 합쳐지고,
    /// 빈 이름은 버려집니다.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|n| normalize(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect(),
        )
    }

    /// 역할 추가 (정규화 포함).
    pub fn insert(&mut self, name: &str) {
        let name = normalize(name);
        if !name.is_empty() {
            self.0.insert(name);
        }
    }

    /// 특정 역할 포함 여부.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&normalize(name))
    }

    /// 다른 집합과 교집합이 비어 있지 않은지 확인.
    ///
    /// 접근 게이트의 OR 시맨틱이 이 연산 하나로 표현됩니다.
    /// 요구 역할 중 하나라도 보유하면 통과입니다.
    pub fn intersects(&self, other: &RoleSet) -> bool {
        self.0.iter().any(|r| other.0.contains(r))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// 정렬된 `Vec<String>`으로 변환 (토큰 클레임용).
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_vec().join(","))
    }
}
