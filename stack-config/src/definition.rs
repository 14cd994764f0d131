//! The identity and API stack, declared as data.
//!
//! Resources reference each other by logical id. Provider credentials are
//! [`SecretReference`]s, resolved when the stack is deployed. A definition
//! never carries secret values.

use api_gateway::routes::{RouteAuthorization, ROUTES};
use identity_pool::models::account::{CLIENT_READ_ATTRIBUTES, CLIENT_WRITE_ATTRIBUTES, EMAIL};
use identity_pool::models::session::{
    ACCESS_TOKEN_VALIDITY_MINUTES, ID_TOKEN_VALIDITY_MINUTES, REFRESH_TOKEN_VALIDITY_MINUTES,
};
use identity_pool::models::FederatedProvider;
use identity_pool::services::admin::REGION_ENV;
use serde::Serialize;
use service_core::config::stacks::{API_NAME, STACKS_CONFIG_PARAMETER};
use std::collections::BTreeMap;

use crate::secrets::SecretReference;
use crate::settings::StackSettings;

pub const STACK_NAME: &str = "ApiAndAuthStack";
pub const USER_POOL_ID: &str = "TestUserPool";
pub const USER_POOL_CLIENT_ID: &str = "TestUserPoolClient";
pub const PRE_SIGN_UP_FUNCTION: &str = "PreSignUp";
pub const POST_AUTHENTICATION_FUNCTION: &str = "PostHandlerLambda";
pub const API_ID: &str = "Api";
pub const STACKS_CONFIG_DESCRIPTION: &str = "Stacks config account level wide.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDefinition {
    pub stack_name: String,
    pub region: String,
    pub functions: Vec<FunctionDefinition>,
    pub user_pool: UserPoolDefinition,
    pub identity_providers: Vec<IdentityProviderDefinition>,
    pub client: UserPoolClientDefinition,
    pub api: ApiDefinition,
    pub identity_pool: IdentityPoolDefinition,
    pub parameter: ParameterDefinition,
}

/// Attribute of another resource in the stack, known once it is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAttribute {
    pub resource: String,
    pub attribute: String,
}

impl ResourceAttribute {
    pub fn new(resource: &str, attribute: &str) -> Self {
        Self {
            resource: resource.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub id: String,
    /// Binary built from the identity-pool crate.
    pub binary: String,
    pub environment: BTreeMap<String, String>,
    pub policies: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub resources: Vec<ResourceAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalPolicy {
    Destroy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInAliases {
    pub email: bool,
    pub phone: bool,
    pub username: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardAttribute {
    pub name: String,
    pub required: bool,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaTriggers {
    pub pre_sign_up: String,
    pub post_authentication: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPoolDefinition {
    pub id: String,
    pub name: String,
    pub sign_in_aliases: SignInAliases,
    pub self_sign_up_enabled: bool,
    pub removal_policy: RemovalPolicy,
    pub triggers: LambdaTriggers,
    pub standard_attributes: Vec<StandardAttribute>,
    pub domain_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderDefinition {
    pub provider: FederatedProvider,
    pub client_id: SecretReference,
    pub client_secret: SecretReference,
    pub scopes: Vec<String>,
    /// Pool attribute → provider attribute.
    pub attribute_mapping: BTreeMap<String, String>,
}

impl IdentityProviderDefinition {
    pub fn new(provider: FederatedProvider) -> Self {
        Self {
            provider,
            client_id: SecretReference::client_id(provider),
            client_secret: SecretReference::client_secret(provider),
            scopes: provider.scopes().iter().map(|s| s.to_string()).collect(),
            attribute_mapping: provider
                .attribute_mapping()
                .iter()
                .map(|(pool, external)| (pool.to_string(), external.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPoolClientDefinition {
    pub id: String,
    pub oauth_enabled: bool,
    pub callback_urls: Vec<String>,
    pub logout_urls: Vec<String>,
    pub supported_identity_providers: Vec<FederatedProvider>,
    pub read_attributes: Vec<String>,
    pub write_attributes: Vec<String>,
    pub access_token_validity_minutes: i64,
    pub id_token_validity_minutes: i64,
    pub refresh_token_validity_minutes: i64,
    /// Providers must exist before the client can name them.
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDefinition {
    pub method: String,
    pub path: String,
    pub authorization: RouteAuthorization,
    pub handler: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsDefinition {
    pub allow_methods: Vec<String>,
    pub allow_origins: Vec<String>,
    pub allow_headers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinition {
    pub id: String,
    pub name: String,
    pub default_authorization: RouteAuthorization,
    pub routes: Vec<RouteDefinition>,
    pub cors: CorsDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPoolDefinition {
    pub user_pool: String,
    pub user_pool_client: String,
    /// Granted to authenticated identities.
    pub authenticated_permissions: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub name: String,
    pub description: String,
}

impl StackDefinition {
    pub fn new(settings: &StackSettings) -> Self {
        let providers: Vec<IdentityProviderDefinition> = FederatedProvider::ALL
            .iter()
            .copied()
            .map(IdentityProviderDefinition::new)
            .collect();

        Self {
            stack_name: STACK_NAME.to_string(),
            region: settings.region.clone(),
            functions: functions(settings),
            user_pool: UserPoolDefinition {
                id: USER_POOL_ID.to_string(),
                name: USER_POOL_ID.to_string(),
                sign_in_aliases: SignInAliases {
                    email: true,
                    phone: false,
                    username: true,
                },
                self_sign_up_enabled: true,
                removal_policy: RemovalPolicy::Destroy,
                triggers: LambdaTriggers {
                    pre_sign_up: PRE_SIGN_UP_FUNCTION.to_string(),
                    post_authentication: POST_AUTHENTICATION_FUNCTION.to_string(),
                },
                standard_attributes: vec![StandardAttribute {
                    name: EMAIL.to_string(),
                    required: true,
                    mutable: true,
                }],
                domain_prefix: settings.domain_prefix.clone(),
            },
            client: UserPoolClientDefinition {
                id: USER_POOL_CLIENT_ID.to_string(),
                oauth_enabled: true,
                callback_urls: vec![settings.redirect_sign_in().to_string()],
                logout_urls: vec![settings.redirect_sign_out().to_string()],
                supported_identity_providers: FederatedProvider::ALL.to_vec(),
                read_attributes: to_strings(CLIENT_READ_ATTRIBUTES),
                write_attributes: to_strings(CLIENT_WRITE_ATTRIBUTES),
                access_token_validity_minutes: ACCESS_TOKEN_VALIDITY_MINUTES,
                id_token_validity_minutes: ID_TOKEN_VALIDITY_MINUTES,
                refresh_token_validity_minutes: REFRESH_TOKEN_VALIDITY_MINUTES,
                depends_on: providers
                    .iter()
                    .map(|p| p.provider.as_str().to_string())
                    .collect(),
            },
            identity_providers: providers,
            api: api(settings),
            identity_pool: IdentityPoolDefinition {
                user_pool: USER_POOL_ID.to_string(),
                user_pool_client: USER_POOL_CLIENT_ID.to_string(),
                authenticated_permissions: vec![PolicyStatement {
                    actions: vec!["execute-api:Invoke".to_string()],
                    resources: vec![ResourceAttribute::new(API_ID, "Arn")],
                }],
            },
            parameter: ParameterDefinition {
                name: STACKS_CONFIG_PARAMETER.to_string(),
                description: STACKS_CONFIG_DESCRIPTION.to_string(),
            },
        }
    }

    pub fn function(&self, id: &str) -> Option<&FunctionDefinition> {
        self.functions.iter().find(|f| f.id == id)
    }

    pub fn route(&self, path: &str) -> Option<&RouteDefinition> {
        self.api.routes.iter().find(|r| r.path == path)
    }
}

fn functions(settings: &StackSettings) -> Vec<FunctionDefinition> {
    vec![
        FunctionDefinition {
            id: PRE_SIGN_UP_FUNCTION.to_string(),
            binary: "pre-signup".to_string(),
            environment: BTreeMap::new(),
            policies: Vec::new(),
        },
        FunctionDefinition {
            id: POST_AUTHENTICATION_FUNCTION.to_string(),
            binary: "post-authentication".to_string(),
            environment: BTreeMap::from([(REGION_ENV.to_string(), settings.region.clone())]),
            // Only this pool, only this action.
            policies: vec![PolicyStatement {
                actions: vec!["cognito-idp:AdminUpdateUserAttributes".to_string()],
                resources: vec![ResourceAttribute::new(USER_POOL_ID, "Arn")],
            }],
        },
    ]
}

fn api(settings: &StackSettings) -> ApiDefinition {
    let routes = ROUTES
        .iter()
        .map(|rule| RouteDefinition {
            method: "GET".to_string(),
            path: rule.path.to_string(),
            authorization: rule.authorization,
            handler: rule.path.trim_start_matches('/').to_string(),
        })
        .collect();

    ApiDefinition {
        id: API_ID.to_string(),
        name: API_NAME.to_string(),
        default_authorization: RouteAuthorization::SignedRequest,
        routes,
        cors: CorsDefinition {
            allow_methods: vec!["GET".to_string()],
            allow_origins: settings.allowed_origins(),
            allow_headers: vec!["*".to_string()],
        },
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
