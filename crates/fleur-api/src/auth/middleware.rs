//! Axum용 JWT 인증 미들웨어.
//!
//! Axum 핸들러에서 사용할 인증 추출기와 역할 게이트.
//!
//! 인증(401)과 인가(403)는 서로 다른 실패입니다. 토큰이 없거나
//! 깨졌거나 만료된 경우는 전부 `UNAUTHENTICATED` 하나로 응답하고,
//! 토큰은 유효하지만 역할이 모자란 경우에만 `FORBIDDEN`을 돌려줍니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::roles::{self, RoleSet};
use super::{jwt, Claims};
use crate::config::AuthConfig;
use crate::error::ApiErrorResponse;

/// 요청 Extension으로 주입되는 인증 컨텍스트.
///
/// `main`에서 검증이 끝난 설정을 라우터 전체에 `Extension` 레이어로
/// 주입합니다. 환경 변수 fallback 같은 우회로는 없습니다. 설정이
/// 없으면 기동 자체가 실패해야 합니다.
#[derive(Clone)]
pub struct AuthContext(pub Arc<AuthConfig>);

/// 인증/인가 거부.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    /// 토큰 없음/형식 오류/만료/위조. 사유는 구분하지 않습니다.
    #[error("인증이 필요합니다")]
    Unauthenticated,
    /// 인증은 되었으나 요구 역할이 없음.
    #[error("접근 권한이 없습니다")]
    Forbidden,
    /// 인증 컨텍스트가 라우터에 주입되지 않음 (배선 오류).
    #[error("인증 설정이 초기화되지 않았습니다")]
    Misconfigured,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AuthRejection::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AuthRejection::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AuthRejection::Misconfigured => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_NOT_CONFIGURED")
            }
        };

        let body = Json(ApiErrorResponse::new(code, self.to_string()));
        (status, body).into_response()
    }
}

/// JWT 인증 추출기.
///
/// `Authorization: Bearer <token>` 헤더를 검증하고 클레임을 핸들러에
/// 넘깁니다. 검증에 실패하면 핸들러는 실행되지 않습니다.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(JwtAuth(claims): JwtAuth) -> impl IntoResponse {
///     format!("Hello, {}!", claims.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JwtAuth(pub Claims);

impl<S> FromRequestParts<S> for JwtAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthRejection::Misconfigured)?;

        authenticate(&ctx.0, parts).map(JwtAuth)
    }
}

/// Authorization 헤더에서 Bearer 토큰을 꺼내 검증.
///
/// 거부 사유는 trace 로그로만 남기고 호출자에게는 단일
/// `Unauthenticated`로 응답합니다.
fn authenticate(cfg: &AuthConfig, parts: &Parts) -> Result<Claims, AuthRejection> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthRejection::Unauthenticated)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthRejection::Unauthenticated)?;

    jwt::validate(cfg, token, chrono::Utc::now()).map_err(|reason| {
        tracing::debug!(%reason, "토큰 거부");
        AuthRejection::Unauthenticated
    })
}

/// 선택적 JWT 인증 추출기.
///
/// 공개 라우트에서 사용합니다. 토큰이 있고 유효하면 클레임을 채우고,
/// 없거나 유효하지 않으면 None입니다. 요청을 거부하지 않습니다.
#[derive(Debug, Clone)]
pub struct OptionalJwtAuth(pub Option<Claims>);

impl<S> FromRequestParts<S> for OptionalJwtAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match JwtAuth::from_request_parts(parts, state).await {
            Ok(JwtAuth(claims)) => Ok(OptionalJwtAuth(Some(claims))),
            Err(_) => Ok(OptionalJwtAuth(None)),
        }
    }
}

/// 역할 게이트.
///
/// 요구 역할 집합과 클레임 역할 집합의 교집합이 비어 있지 않으면
/// 통과입니다 (OR 시맨틱). `{admin, prestataire}`를 요구하는 라우트는
/// 둘 중 어느 역할로도 들어올 수 있습니다. 요구 집합이 비어 있으면
/// 공개 라우트이므로 항상 통과합니다.
pub fn require_any_role(claims: &Claims, required: &RoleSet) -> Result<(), AuthRejection> {
    if required.is_empty() || claims.role_set().intersects(required) {
        Ok(())
    } else {
        Err(AuthRejection::Forbidden)
    }
}

/// 관리자 역할을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub Claims);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let JwtAuth(claims) = JwtAuth::from_request_parts(parts, state).await?;
        require_any_role(&claims, &RoleSet::from_names([roles::ADMIN]))?;
        Ok(AdminAuth(claims))
    }
}

/// 판매자 또는 관리자 역할을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct PrestataireAuth(pub Claims);

impl<S> FromRequestParts<S> for PrestataireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let JwtAuth(claims) = JwtAuth::from_request_parts(parts, state).await?;
        require_any_role(
            &claims,
            &RoleSet::from_names([roles::ADMIN, roles::PRESTATAIRE]),
        )?;
        Ok(PrestataireAuth(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::Request;
    use chrono::{Duration, Utc};

    fn test_config() -> Arc<AuthConfig> {
        Arc::new(
            AuthConfig::new(
                "fleur-api",
                "fleur-clients",
                "test-secret-key-for-jwt-testing-minimum-32-chars",
                60,
            )
            .unwrap(),
        )
    }

    fn claims_with_roles(names: &[&str]) -> Claims {
        let now = Utc::now();
        Claims {
            sub: "user-1".to_string(),
            username: "marie".to_string(),
            roles: RoleSet::from_names(names).to_vec(),
            iss: "fleur-api".to_string(),
            aud: "fleur-clients".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(60)).timestamp(),
        }
    }

    fn parts_with_token(cfg: &Arc<AuthConfig>, token: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/admin/users");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        parts.extensions.insert(AuthContext(cfg.clone()));
        parts
    }

    #[test]
    fn test_require_any_role_scenarios() {
        let required = RoleSet::from_names(["Admin"]);

        // prestataire만 보유 → 거부
        let prestataire = claims_with_roles(&["prestataire"]);
        assert_eq!(
            require_any_role(&prestataire, &required),
            Err(AuthRejection::Forbidden)
        );

        // admin + prestataire 보유 → 통과
        let both = claims_with_roles(&["admin", "prestataire"]);
        assert!(require_any_role(&both, &required).is_ok());

        // 요구 집합이 비어 있으면 공개 라우트 → 항상 통과
        assert!(require_any_role(&prestataire, &RoleSet::new()).is_ok());
    }

    #[test]
    fn test_require_any_role_or_semantics() {
        // {admin, prestataire}를 요구하는 라우트는 어느 역할로도 통과
        let required = RoleSet::from_names(["admin", "prestataire"]);

        assert!(require_any_role(&claims_with_roles(&["admin"]), &required).is_ok());
        assert!(require_any_role(&claims_with_roles(&["prestataire"]), &required).is_ok());
        assert_eq!(
            require_any_role(&claims_with_roles(&["client"]), &required),
            Err(AuthRejection::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_jwt_auth_extractor_accepts_valid_token() {
        let cfg = test_config();
        let roles = RoleSet::from_names(["client"]);
        let token = jwt::issue(&cfg, "user-1", "marie", &roles, Utc::now()).unwrap();

        let mut parts = parts_with_token(&cfg, Some(&token));
        let JwtAuth(claims) = JwtAuth::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.roles, vec!["client"]);
    }

    #[tokio::test]
    async fn test_jwt_auth_extractor_rejects_missing_token() {
        let cfg = test_config();
        let mut parts = parts_with_token(&cfg, None);

        let result = JwtAuth::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.unwrap_err(), AuthRejection::Unauthenticated);
    }

    #[tokio::test]
    async fn test_expired_and_forged_tokens_rejected_identically() {
        let cfg = test_config();
        let roles = RoleSet::from_names(["client"]);

        // 2시간 전에 발급되어 이미 만료된 토큰
        let expired =
            jwt::issue(&cfg, "user-1", "marie", &roles, Utc::now() - Duration::hours(2)).unwrap();

        // 다른 키로 서명된 토큰
        let other_cfg = AuthConfig::new(
            "fleur-api",
            "fleur-clients",
            "another-secret-key-for-jwt-testing-min-32-chars",
            60,
        )
        .unwrap();
        let forged = jwt::issue(&other_cfg, "user-1", "marie", &roles, Utc::now()).unwrap();

        let mut expired_parts = parts_with_token(&cfg, Some(&expired));
        let mut forged_parts = parts_with_token(&cfg, Some(&forged));

        let e1 = JwtAuth::from_request_parts(&mut expired_parts, &())
            .await
            .unwrap_err();
        let e2 = JwtAuth::from_request_parts(&mut forged_parts, &())
            .await
            .unwrap_err();

        // 관찰 가능한 형태(상태 코드 + 본문)가 완전히 동일해야 함
        let r1 = e1.into_response();
        let r2 = e2.into_response();
        assert_eq!(r1.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(r1.status(), r2.status());

        let b1 = to_bytes(r1.into_body(), 1024).await.unwrap();
        let b2 = to_bytes(r2.into_body(), 1024).await.unwrap();
        assert_eq!(b1, b2);
    }

    #[tokio::test]
    async fn test_admin_auth_distinguishes_401_from_403() {
        let cfg = test_config();

        // 토큰 없음 → 401
        let mut no_token = parts_with_token(&cfg, None);
        assert_eq!(
            AdminAuth::from_request_parts(&mut no_token, &())
                .await
                .unwrap_err(),
            AuthRejection::Unauthenticated
        );

        // 유효한 토큰이지만 admin 역할 없음 → 403
        let client_token = jwt::issue(
            &cfg,
            "user-2",
            "paul",
            &RoleSet::from_names(["prestataire"]),
            Utc::now(),
        )
        .unwrap();
        let mut client_parts = parts_with_token(&cfg, Some(&client_token));
        assert_eq!(
            AdminAuth::from_request_parts(&mut client_parts, &())
                .await
                .unwrap_err(),
            AuthRejection::Forbidden
        );

        // admin 역할 보유 → 통과
        let admin_token = jwt::issue(
            &cfg,
            "user-3",
            "sophie",
            &RoleSet::from_names(["admin"]),
            Utc::now(),
        )
        .unwrap();
        let mut admin_parts = parts_with_token(&cfg, Some(&admin_token));
        assert!(AdminAuth::from_request_parts(&mut admin_parts, &())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_optional_auth_never_rejects() {
        let cfg = test_config();

        let mut no_token = parts_with_token(&cfg, None);
        let OptionalJwtAuth(claims) = OptionalJwtAuth::from_request_parts(&mut no_token, &())
            .await
            .unwrap();
        assert!(claims.is_none());

        let token = jwt::issue(
            &cfg,
            "user-1",
            "marie",
            &RoleSet::from_names(["client"]),
            Utc::now(),
        )
        .unwrap();
        let mut with_token = parts_with_token(&cfg, Some(&token));
        let OptionalJwtAuth(claims) = OptionalJwtAuth::from_request_parts(&mut with_token, &())
            .await
            .unwrap();
        assert_eq!(claims.unwrap().sub, "user-1");
    }
}
