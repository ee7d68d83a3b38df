//! 공통 API 에러 응답 타입.
//!
//! 모든 엔드포인트가 같은 JSON 에러 형식을 사용합니다.

use serde::{Deserialize, Serialize};

/// JSON 에러 응답 본문.
///
/// # 예시
///
/// ```json
/// { "code": "USERNAME_TAKEN", "message": "이미 존재하는 사용자 이름: marie" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "UNAUTHENTICATED", "FORBIDDEN", "STORE_ERROR")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (axum::http::StatusCode, axum::Json<ApiErrorResponse>)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let error = ApiErrorResponse::new("STORE_ERROR", "저장소 접근 실패");
        assert_eq!(error.code, "STORE_ERROR");

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""code":"STORE_ERROR""#));
        assert_eq!(error.to_string(), "[STORE_ERROR] 저장소 접근 실패");
    }
}
