use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::AppError;

/// JWT Claims 구조체
///
/// 토큰 발급은 외부 인증 서비스가 담당하고, 이 서버는 검증만 수행합니다.
/// `role`은 계정의 권한 등급(admin/creator/viewer)을 담습니다.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (Account ID)
    pub sub: String,
    /// 계정 역할 (admin, creator, viewer)
    pub role: String,
    /// Issued At
    pub iat: usize,
    /// Expiration
    pub exp: usize,
}

/// Access Token 생성 (테스트 및 로컬 개발 용)
pub fn encode_access_token(
    sub: String,
    role: String,
    secret: &str,
    expiration_seconds: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(expiration_seconds))
        .ok_or_else(|| AppError::InternalError("토큰 만료 시각 계산에 실패했습니다.".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub,
        role,
        iat: now.timestamp() as usize,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Token creation failed: {}", e)))
}

/// Access Token 검증
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("토큰이 만료되었습니다.".into())
        }
        _ => AppError::Unauthorized("유효하지 않은 토큰입니다.".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_encode_and_decode_access_token() {
        let secret = "test_secret";

        let token = encode_access_token("42".to_string(), "creator".to_string(), secret, 3600)
            .expect("Token generation failed");
        let claims = decode_access_token(&token, secret).expect("Token validation failed");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "creator");
    }

    #[test]
    fn should_reject_invalid_token() {
        let result = decode_access_token("invalid_token", "test_secret");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_token_signed_with_other_secret() {
        let token = encode_access_token("42".to_string(), "viewer".to_string(), "secret_a", 3600)
            .expect("Token generation failed");

        let result = decode_access_token(&token, "secret_b");
        assert!(result.is_err());
    }
}
