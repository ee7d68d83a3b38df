//! 환경 변수 기반 설정.
//!
//! 서버/저장소/JWT/시드 설정을 환경 변수에서 로드합니다.
//!
//! JWT 서명 설정이 비어 있으면 기동 자체가 실패합니다. 서명 키 없는
//! 배포는 배포 오류이지 런타임에 복구할 상황이 아닙니다.

use std::net::SocketAddr;

use crate::auth::roles;

/// HS256 서명 키 최소 길이 (바이트).
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// 설정 오류.
///
/// 프로세스 기동 시점에만 발생하며, 요청 처리 중에는 절대
/// 나타나지 않습니다. `main`은 이 오류를 받으면 그대로 종료합니다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT 설정 누락: {0} 환경 변수를 확인하세요")]
    MissingJwt(&'static str),
    #[error("JWT 서명 키가 너무 짧습니다 (최소 32바이트, 현재 {0}바이트)")]
    WeakSigningKey(usize),
    #[error("DATABASE_URL 환경 변수가 설정되지 않았습니다")]
    MissingDatabaseUrl,
}

/// HTTP 서버 설정.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 바인딩할 호스트 주소
    pub host: String,
    /// 바인딩할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// 환경 변수에서 로드 (`API_HOST`, `API_PORT`).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// JWT 발급/검증 설정.
#[derive(Clone)]
pub struct AuthConfig {
    /// 발급자 (iss 클레임, 완전 일치 검사)
    pub issuer: String,
    /// 대상 (aud 클레임, 완전 일치 검사)
    pub audience: String,
    /// HS256 대칭 서명 키
    pub signing_key: String,
    /// 토큰 TTL (분)
    pub token_ttl_minutes: i64,
}

// 서명 키가 로그에 새지 않도록 Debug에서 가린다
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("signing_key", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

impl AuthConfig {
    /// 검증 포함 생성자.
    ///
    /// # Errors
    ///
    /// 발급자/대상/키 중 하나라도 공백이면 `ConfigError::MissingJwt`,
    /// 키가 32바이트 미만이면 `ConfigError::WeakSigningKey`.
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        signing_key: impl Into<String>,
        token_ttl_minutes: i64,
    ) -> Result<Self, ConfigError> {
        let issuer = issuer.into();
        let audience = audience.into();
        let signing_key = signing_key.into();

        if issuer.trim().is_empty() {
            return Err(ConfigError::MissingJwt("JWT_ISSUER"));
        }
        if audience.trim().is_empty() {
            return Err(ConfigError::MissingJwt("JWT_AUDIENCE"));
        }
        if signing_key.trim().is_empty() {
            return Err(ConfigError::MissingJwt("JWT_SECRET"));
        }
        if signing_key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(ConfigError::WeakSigningKey(signing_key.len()));
        }

        Ok(Self {
            issuer,
            audience,
            signing_key,
            token_ttl_minutes,
        })
    }

    /// 환경 변수에서 로드 (`JWT_ISSUER`, `JWT_AUDIENCE`, `JWT_SECRET`,
    /// `JWT_TTL_MINUTES`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let issuer = std::env::var("JWT_ISSUER").unwrap_or_default();
        let audience = std::env::var("JWT_AUDIENCE").unwrap_or_default();
        let signing_key = std::env::var("JWT_SECRET").unwrap_or_default();
        let token_ttl_minutes = std::env::var("JWT_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Self::new(issuer, audience, signing_key, token_ttl_minutes)
    }

    /// TTL을 초 단위로 반환 (로그인 응답의 `expires_in`).
    pub fn ttl_seconds(&self) -> i64 {
        self.token_ttl_minutes * 60
    }
}

/// 역할/슈퍼 관리자 시드 설정.
#[derive(Clone)]
pub struct SeedConfig {
    /// 기동 시 존재를 보장할 역할 목록 (정규화된 이름)
    pub required_roles: Vec<String>,
    /// 슈퍼 관리자 사용자 이름
    pub super_admin_username: String,
    /// 슈퍼 관리자 초기 비밀번호. 미설정이면 계정 생성이 필요한
    /// 시점에 시드가 실패합니다 (기본 비밀번호를 만들어내지 않음).
    pub super_admin_password: Option<String>,
    /// 슈퍼 관리자에게 부여할 역할
    pub super_admin_role: String,
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("required_roles", &self.required_roles)
            .field("super_admin_username", &self.super_admin_username)
            .field("super_admin_password", &"<redacted>")
            .field("super_admin_role", &self.super_admin_role)
            .finish()
    }
}

impl SeedConfig {
    /// 환경 변수에서 로드 (`SEED_ROLES`, `SUPER_ADMIN_USERNAME`,
    /// `SUPER_ADMIN_PASSWORD`, `SUPER_ADMIN_ROLE`).
    pub fn from_env() -> Self {
        let required_roles = std::env::var("SEED_ROLES")
            .unwrap_or_else(|_| "Admin,Prestataire,Client".to_string())
            .split(',')
            .map(roles::normalize)
            .filter(|r| !r.is_empty())
            .collect();

        Self {
            required_roles,
            super_admin_username: std::env::var("SUPER_ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            super_admin_password: std::env::var("SUPER_ADMIN_PASSWORD").ok(),
            super_admin_role: roles::normalize(
                &std::env::var("SUPER_ADMIN_ROLE").unwrap_or_else(|_| roles::ADMIN.to_string()),
            ),
        }
    }
}

/// 전체 애플리케이션 설정.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub auth: AuthConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    /// 환경 변수에서 전체 설정 로드.
    ///
    /// # Errors
    ///
    /// JWT 서명 설정이 비었거나 `DATABASE_URL`이 없으면 실패합니다.
    /// 이 실패는 기동 중단으로 이어져야 합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            server: ServerConfig::from_env(),
            database_url,
            auth: AuthConfig::from_env()?,
            seed: SeedConfig::from_env(),
        })
    }
}
