#![allow(dead_code)]

use frontend_auth::ClientConfiguration;
use service_core::config::stacks::{API_NAME, API_NAME_IAM, API_NAME_JWT};
use service_core::config::StacksConfig;
use std::path::PathBuf;
use tempfile::TempDir;

pub const REGION: &str = "eu-west-1";
pub const ACCESS_KEY_ID: &str = "AKIDFRONTEND";
pub const SIGNING_SECRET: &str = "frontend-signing-secret";

pub fn stacks_record(api_endpoint: &str) -> StacksConfig {
    StacksConfig {
        user_pool_id: "eu-west-1_Xyz123".to_string(),
        user_pool_client_id: "4k5l6m7n8o9p".to_string(),
        identity_pool_id: "eu-west-1:0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0".to_string(),
        api_endpoint: api_endpoint.to_string(),
        region: REGION.to_string(),
        domain_prefix: "cloud-spider".to_string(),
        api_name: API_NAME.to_string(),
        api_name_iam: API_NAME_IAM.to_string(),
        api_name_jwt: API_NAME_JWT.to_string(),
        redirect_sign_in: "http://localhost:3000/".to_string(),
        redirect_sign_out: "http://localhost:3000/".to_string(),
    }
}

/// Write the record the way the frontend receives it and return its path.
pub fn write_record(dir: &TempDir, record: &StacksConfig) -> PathBuf {
    let path = dir.path().join("aws-config.json");
    std::fs::write(&path, record.to_json().unwrap()).unwrap();
    path
}

pub fn client_configuration(api_endpoint: &str) -> ClientConfiguration {
    ClientConfiguration::from_stacks_config(&stacks_record(api_endpoint))
}
