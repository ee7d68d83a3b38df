//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 대조.
//! 가입, 로그인, 슈퍼 관리자 시드가 모두 이 경로를 사용합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("저장된 해시 형식이 유효하지 않음")]
    InvalidHashFormat,
}

/// 비밀번호 해싱.
///
/// 솔트는 호출마다 새로 생성되므로 같은 비밀번호라도
/// 매번 다른 해시가 나옵니다.
///
/// # Returns
///
/// PHC 형식 해시 문자열 (솔트 포함)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 평문 비밀번호를 저장된 해시와 대조.
///
/// 불일치는 에러가 아니라 `Ok(false)`입니다. 에러는 저장된 해시
/// 자체가 깨져 있는 경우에만 발생합니다.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("fleur-secret-1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("fleur-secret-1", &hash).unwrap());
        assert!(!verify_password("fleur-secret-2", &hash).unwrap());
    }

    #[test]
    fn test_salted_hashes_differ() {
        let h1 = hash_password("same-password").unwrap();
        let h2 = hash_password("same-password").unwrap();

        // 솔트가 다르므로 해시는 다르지만 둘 다 대조 가능
        assert_ne!(h1, h2);
        assert!(verify_password("same-password", &h1).unwrap());
        assert!(verify_password("same-password", &h2).unwrap());
    }

    #[test]
    fn test_broken_stored_hash() {
        let result = verify_password("password", "not-a-phc-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }
}
