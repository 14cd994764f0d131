#![allow(dead_code)]

use stack_config::{DeploymentOutputs, StackSettings};

pub const LOCAL_CALLBACK: &str = "http://localhost:3000/";
pub const CALLBACK: &str = "https://cloudspider.example.com/";
pub const LOGOUT: &str = "https://cloudspider.example.com/logout";

pub fn settings(is_local: bool) -> StackSettings {
    StackSettings {
        domain_prefix: "cloud-spider".to_string(),
        callback_url_local_mode: LOCAL_CALLBACK.to_string(),
        callback_url: CALLBACK.to_string(),
        logout_url: LOGOUT.to_string(),
        is_local,
        region: "eu-west-1".to_string(),
    }
}

pub fn outputs() -> DeploymentOutputs {
    DeploymentOutputs {
        user_pool_id: "eu-west-1_Q1w2E3r4T".to_string(),
        user_pool_client_id: "7a8b9c0d1e2f3g4h5i6j".to_string(),
        identity_pool_id: "eu-west-1:5b8e3c1a-0d2f-4e6a-9b7c-1f2e3d4c5b6a".to_string(),
        api_endpoint: "https://k2j3h4g5f6.execute-api.eu-west-1.amazonaws.com".to_string(),
    }
}
