//! JWT 토큰 발급 및 검증.
//!
//! 대칭 키(HS256) 서명 기반의 시간 제한 Bearer 토큰을 다룹니다.
//!
//! # 설계 메모
//!
//! - 만료 검사는 호출자가 넘긴 `now` 기준이며 스큐 허용치는 0초입니다.
//!   토큰은 정확히 `[iat, exp)` 구간에서만 유효합니다. 이 엄격함은
//!   의도된 보안 자세이므로 느슨한 기본값으로 되돌리지 마세요.
//! - 발급 이후 사용자 역할이 바뀌어도 이미 발급된 토큰의 클레임은
//!   만료 시까지 그대로 유효합니다 (수용된 트레이드오프).
//! - 검증 실패 사유는 내부 로깅용으로만 구분하고, 호출자에게는
//!   한 가지 401로만 응답합니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::roles::RoleSet;
use crate::config::AuthConfig;

/// JWT 페이로드.
///
/// 발급 시점 사용자 상태의 불변 스냅샷입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// 사용자 이름
    pub username: String,
    /// 발급 시점의 역할 목록 (정규화된 이름)
    pub roles: Vec<String>,
    /// 발급자
    pub iss: String,
    /// 대상
    pub aud: String,
    /// 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 역할 클레임을 `RoleSet`으로 변환.
    pub fn role_set(&self) -> RoleSet {
        RoleSet::from_names(&self.roles)
    }
}

/// 토큰 검증 거부 사유.
///
/// trace 로그 전용입니다. 만료와 위조를 호출자가 구분할 수 있으면
/// 토큰 오라클로 악용될 수 있으므로, 응답 계층에서는 모든 variant가
/// 동일한 401로 합쳐집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("서명 또는 형식이 유효하지 않음")]
    Invalid,
    #[error("발급자 불일치")]
    IssuerMismatch,
    #[error("대상 불일치")]
    AudienceMismatch,
    #[error("유효 구간 밖")]
    OutsideValidity,
}

/// 토큰 발급.
///
/// 클레임은 `now` 기준으로 `[now, now + ttl)` 동안 유효합니다.
///
/// # Arguments
///
/// * `cfg` - 발급자/대상/서명 키/TTL 설정 (기동 시점에 이미 검증됨)
/// * `user_id` - 사용자 ID (subject)
/// * `username` - 사용자 이름
/// * `roles` - 발급 시점의 역할 집합
/// * `now` - 발급 기준 시간
pub fn issue(
    cfg: &AuthConfig,
    user_id: &str,
    username: &str,
    roles: &RoleSet,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        roles: roles.to_vec(),
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(cfg.token_ttl_minutes)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(cfg.signing_key.as_bytes()),
    )
}

/// 토큰 검증.
///
/// 서명, 발급자(완전 일치), 대상(완전 일치), 유효 구간을 전부
/// 만족해야 합니다. 하나라도 어긋나면 거부입니다.
///
/// 만료는 라이브러리 내부 시계가 아니라 호출자가 넘긴 `now`로 직접
/// 검사합니다. jsonwebtoken의 기본 leeway(60초)는 스큐 0초 계약에
/// 어긋나므로 쓰지 않습니다.
pub fn validate(cfg: &AuthConfig, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenRejection> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = false;
    validation.set_issuer(&[&cfg.issuer]);
    validation.set_audience(&[&cfg.audience]);
    validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.signing_key.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => TokenRejection::IssuerMismatch,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => TokenRejection::AudienceMismatch,
        _ => TokenRejection::Invalid,
    })?;

    let ts = now.timestamp();
    if ts < data.claims.iat || ts >= data.claims.exp {
        return Err(TokenRejection::OutsideValidity);
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig::new(
            "fleur-api",
            "fleur-clients",
            "test-secret-key-for-jwt-testing-minimum-32-chars",
            60,
        )
        .unwrap()
    }

    fn other_key_config() -> AuthConfig {
        AuthConfig::new(
            "fleur-api",
            "fleur-clients",
            "another-secret-key-for-jwt-testing-min-32-chars",
            60,
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_reproduces_roles() {
        let cfg = test_config();
        let roles = RoleSet::from_names(["Admin", "Prestataire"]);
        let t0 = Utc::now();

        let token = issue(&cfg, "user-1", "marie", &roles, t0).unwrap();
        let claims = validate(&cfg, &token, t0).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "marie");
        // 발급 시점의 역할 집합이 그대로 복원되어야 함
        assert_eq!(claims.role_set(), roles);
        assert_eq!(claims.iss, "fleur-api");
        assert_eq!(claims.aud, "fleur-clients");
    }

    #[test]
    fn test_same_token_validates_to_equal_claims() {
        let cfg = test_config();
        let roles = RoleSet::from_names(["client"]);
        let t0 = Utc::now();

        // 같은 토큰은 언제 검증해도 동일한 클레임 값으로 복원되어야 함
        let token = issue(&cfg, "user-1", "marie", &roles, t0).unwrap();
        assert_eq!(validate(&cfg, &token, t0), validate(&cfg, &token, t0));
    }

    #[test]
    fn test_valid_until_just_before_expiry() {
        let cfg = test_config();
        let roles = RoleSet::from_names(["client"]);
        let t0 = Utc::now();

        let token = issue(&cfg, "user-1", "marie", &roles, t0).unwrap();

        // 만료 1초 전까지는 유효
        let just_before = t0 + Duration::minutes(60) - Duration::seconds(1);
        assert!(validate(&cfg, &token, just_before).is_ok());
    }

    #[test]
    fn test_rejected_at_exact_expiry() {
        let cfg = test_config();
        let roles = RoleSet::from_names(["client"]);
        let t0 = Utc::now();

        let token = issue(&cfg, "user-1", "marie", &roles, t0).unwrap();

        // now == exp 인 순간부터 거부 (유예 0초)
        let at_expiry = t0 + Duration::minutes(60);
        assert_eq!(
            validate(&cfg, &token, at_expiry),
            Err(TokenRejection::OutsideValidity)
        );
    }

    #[test]
    fn test_rejected_before_issued_at() {
        let cfg = test_config();
        let roles = RoleSet::from_names(["client"]);
        let t0 = Utc::now();

        let token = issue(&cfg, "user-1", "marie", &roles, t0).unwrap();

        let before = t0 - Duration::seconds(1);
        assert_eq!(
            validate(&cfg, &token, before),
            Err(TokenRejection::OutsideValidity)
        );
    }

    #[test]
    fn test_wrong_key_rejected() {
        let cfg = test_config();
        let roles = RoleSet::from_names(["admin"]);
        let t0 = Utc::now();

        let token = issue(&other_key_config(), "user-1", "marie", &roles, t0).unwrap();
        assert_eq!(validate(&cfg, &token, t0), Err(TokenRejection::Invalid));
    }

    #[test]
    fn test_issuer_mismatch_rejected() {
        let cfg = test_config();
        let mut other = test_config();
        other.issuer = "someone-else".to_string();
        let roles = RoleSet::from_names(["admin"]);
        let t0 = Utc::now();

        let token = issue(&other, "user-1", "marie", &roles, t0).unwrap();
        assert_eq!(
            validate(&cfg, &token, t0),
            Err(TokenRejection::IssuerMismatch)
        );
    }

    #[test]
    fn test_audience_mismatch_rejected() {
        let cfg = test_config();
        let mut other = test_config();
        other.audience = "other-audience".to_string();
        let roles = RoleSet::from_names(["admin"]);
        let t0 = Utc::now();

        let token = issue(&other, "user-1", "marie", &roles, t0).unwrap();
        assert_eq!(
            validate(&cfg, &token, t0),
            Err(TokenRejection::AudienceMismatch)
        );
    }

    #[test]
    fn test_malformed_token_rejected() {
        let cfg = test_config();
        assert_eq!(
            validate(&cfg, "not.a.token", Utc::now()),
            Err(TokenRejection::Invalid)
        );
        assert_eq!(validate(&cfg, "", Utc::now()), Err(TokenRejection::Invalid));
    }
}
