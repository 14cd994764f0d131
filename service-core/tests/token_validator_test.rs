mod common;

use common::{sign, sign_with_kid, MockIssuer, TestClaims, TEST_CLIENT_ID};
use service_core::auth::{TokenError, TokenValidator, TokenValidatorConfig};

fn validator_for(issuer: &MockIssuer) -> TokenValidator {
    TokenValidator::new(TokenValidatorConfig::new(issuer.issuer(), TEST_CLIENT_ID))
}

#[tokio::test]
async fn test_valid_access_token_validates() {
    let issuer = MockIssuer::start().await;
    let validator = validator_for(&issuer);

    let claims = TestClaims::access(&issuer.issuer(), TEST_CLIENT_ID);
    let verified = validator.validate(&sign(&claims)).await.unwrap();

    assert_eq!(verified.sub, claims.sub);
    assert_eq!(verified.username(), Some("alice"));
}

#[tokio::test]
async fn test_valid_id_token_validates_on_audience() {
    let issuer = MockIssuer::start().await;
    let validator = validator_for(&issuer);

    let claims = TestClaims::id(&issuer.issuer(), TEST_CLIENT_ID);
    let verified = validator.validate(&sign(&claims)).await.unwrap();

    assert_eq!(verified.token_use, "id");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let issuer = MockIssuer::start().await;
    let validator = validator_for(&issuer);

    let claims = TestClaims::access(&issuer.issuer(), TEST_CLIENT_ID).expired();
    let result = validator.validate(&sign(&claims)).await;

    assert!(matches!(result, Err(TokenError::Expired)), "{:?}", result);
}

#[tokio::test]
async fn test_wrong_audience_is_rejected() {
    let issuer = MockIssuer::start().await;
    let validator = validator_for(&issuer);

    let claims = TestClaims::access(&issuer.issuer(), "another-client");
    let result = validator.validate(&sign(&claims)).await;

    assert!(matches!(result, Err(TokenError::AudienceMismatch)), "{:?}", result);
}

#[tokio::test]
async fn test_wrong_issuer_is_rejected() {
    let issuer = MockIssuer::start().await;
    let validator = validator_for(&issuer);

    let claims = TestClaims::access("https://cognito-idp.eu-west-1.amazonaws.com/other", TEST_CLIENT_ID);
    let result = validator.validate(&sign(&claims)).await;

    assert!(matches!(result, Err(TokenError::Invalid)), "{:?}", result);
}

#[tokio::test]
async fn test_unknown_kid_is_rejected() {
    let issuer = MockIssuer::start().await;
    let validator = validator_for(&issuer);

    let claims = TestClaims::access(&issuer.issuer(), TEST_CLIENT_ID);
    let result = validator
        .validate(&sign_with_kid(&claims, "unknown-kid"))
        .await;

    assert!(matches!(result, Err(TokenError::Invalid)), "{:?}", result);
}

#[tokio::test]
async fn test_refresh_token_is_not_accepted_as_bearer() {
    let issuer = MockIssuer::start().await;
    let validator = validator_for(&issuer);

    let claims = TestClaims::access(&issuer.issuer(), TEST_CLIENT_ID).with_token_use("refresh");
    let result = validator.validate(&sign(&claims)).await;

    assert!(matches!(result, Err(TokenError::UnsupportedUse(_))), "{:?}", result);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let issuer = MockIssuer::start().await;
    let validator = validator_for(&issuer);

    let result = validator.validate("not-a-jwt").await;

    assert!(matches!(result, Err(TokenError::Invalid)), "{:?}", result);
}

#[tokio::test]
async fn test_unreachable_key_set_reports_jwks_error() {
    let issuer = MockIssuer::start_failing(500).await;
    let validator = validator_for(&issuer);

    let claims = TestClaims::access(&issuer.issuer(), TEST_CLIENT_ID);
    let result = validator.validate(&sign(&claims)).await;

    assert!(matches!(result, Err(TokenError::Jwks(_))), "{:?}", result);
}
