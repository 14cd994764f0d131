#![allow(dead_code)]

use async_trait::async_trait;
use identity_pool::services::{
    AdminError, LocalUserPool, SignUpRequest, TokenIssuer, UserAttribute, UserPoolAdmin,
};
use identity_pool::{build_router, AppState};
use secrecy::SecretString;
use std::sync::{Arc, Mutex};

pub const TEST_POOL_ID: &str = "eu-west-1_LocalPool";
pub const TEST_CLIENT_ID: &str = "local-client";
pub const TEST_KEY_ID: &str = "local-key-1";
pub const TEST_ISSUER: &str = "http://localhost:8080/eu-west-1_LocalPool";
pub const TEST_PASSWORD: &str = "Passw0rd!";

const TEST_KEY_PEM: &str = include_str!("../fixtures/test_key.pem");

pub fn test_issuer(issuer: &str) -> TokenIssuer {
    TokenIssuer::from_pem(TEST_KEY_PEM, TEST_KEY_ID, issuer, TEST_CLIENT_ID)
        .expect("test key must load")
}

pub fn test_pool() -> LocalUserPool {
    LocalUserPool::new(TEST_POOL_ID, test_issuer(TEST_ISSUER))
}

pub fn test_router(pool: LocalUserPool) -> axum::Router {
    build_router(AppState {
        service_name: "identity-pool-test".to_string(),
        pool,
    })
}

pub fn sign_up_request(username: &str, email: Option<&str>) -> SignUpRequest {
    SignUpRequest {
        username: username.to_string(),
        password: SecretString::new(TEST_PASSWORD.to_string()),
        email: email.map(str::to_string),
        phone_number: None,
    }
}

pub fn password(value: &str) -> SecretString {
    SecretString::new(value.to_string())
}

/// Admin stand-in that records each call and can be told to fail.
#[derive(Default)]
pub struct RecordingAdmin {
    pub calls: Mutex<Vec<(String, String, Vec<UserAttribute>)>>,
    pub fail: bool,
}

impl RecordingAdmin {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl UserPoolAdmin for RecordingAdmin {
    async fn admin_update_user_attributes(
        &self,
        user_pool_id: &str,
        username: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), AdminError> {
        self.calls.lock().unwrap().push((
            user_pool_id.to_string(),
            username.to_string(),
            attributes.to_vec(),
        ));
        if self.fail {
            return Err(AdminError::Service("simulated outage".to_string()));
        }
        Ok(())
    }
}
