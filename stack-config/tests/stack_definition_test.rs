mod common;

use api_gateway::routes::RouteAuthorization;
use common::{settings, CALLBACK, LOCAL_CALLBACK, LOGOUT};
use identity_pool::models::FederatedProvider;
use stack_config::definition::{
    RemovalPolicy, POST_AUTHENTICATION_FUNCTION, PRE_SIGN_UP_FUNCTION, USER_POOL_ID,
};
use stack_config::StackDefinition;

#[test]
fn user_pool_signs_in_by_email_or_username() {
    let stack = StackDefinition::new(&settings(false));
    let pool = &stack.user_pool;

    assert_eq!(pool.name, "TestUserPool");
    assert!(pool.sign_in_aliases.email);
    assert!(pool.sign_in_aliases.username);
    assert!(!pool.sign_in_aliases.phone);
    assert!(pool.self_sign_up_enabled);
    assert_eq!(pool.removal_policy, RemovalPolicy::Destroy);
    assert_eq!(pool.domain_prefix, "cloud-spider");

    let email = &pool.standard_attributes[0];
    assert_eq!(email.name, "email");
    assert!(email.required && email.mutable);
}

#[test]
fn hooks_are_wired_to_their_functions() {
    let stack = StackDefinition::new(&settings(false));

    assert_eq!(stack.user_pool.triggers.pre_sign_up, PRE_SIGN_UP_FUNCTION);
    assert_eq!(
        stack.user_pool.triggers.post_authentication,
        POST_AUTHENTICATION_FUNCTION
    );
    assert_eq!(stack.function(PRE_SIGN_UP_FUNCTION).unwrap().binary, "pre-signup");
    assert!(stack.function(PRE_SIGN_UP_FUNCTION).unwrap().policies.is_empty());
}

#[test]
fn post_authentication_may_only_update_attributes_of_this_pool() {
    let stack = StackDefinition::new(&settings(false));
    let function = stack.function(POST_AUTHENTICATION_FUNCTION).unwrap();

    assert_eq!(function.binary, "post-authentication");
    assert_eq!(function.environment.get("region").unwrap(), "eu-west-1");
    assert_eq!(function.policies.len(), 1);

    let policy = &function.policies[0];
    assert_eq!(policy.actions, vec!["cognito-idp:AdminUpdateUserAttributes"]);
    assert_eq!(policy.resources.len(), 1);
    assert_eq!(policy.resources[0].resource, USER_POOL_ID);
    assert_eq!(policy.resources[0].attribute, "Arn");
}

#[test]
fn providers_use_the_shared_secret_and_their_mappings() {
    let stack = StackDefinition::new(&settings(false));
    assert_eq!(stack.identity_providers.len(), 2);

    let facebook = &stack.identity_providers[0];
    assert_eq!(facebook.provider, FederatedProvider::Facebook);
    assert_eq!(facebook.scopes, vec!["public_profile", "email"]);
    assert_eq!(facebook.client_id.secret_id, "/account/api/secrets");
    assert_eq!(facebook.client_id.json_key, "FACEBOOK_CLIENT_ID");
    assert_eq!(facebook.client_secret.json_key, "FACEBOOK_CLIENT_SECRET");
    assert_eq!(facebook.attribute_mapping.len(), 1);
    assert_eq!(facebook.attribute_mapping["email"], "email");

    let google = &stack.identity_providers[1];
    assert_eq!(google.provider, FederatedProvider::Google);
    assert_eq!(google.scopes, vec!["email"]);
    assert_eq!(google.attribute_mapping["email_verified"], "email_verified");
}

#[test]
fn client_policy_and_token_validity() {
    let stack = StackDefinition::new(&settings(false));
    let client = &stack.client;

    assert!(client.oauth_enabled);
    assert_eq!(client.read_attributes, vec!["email", "email_verified", "phone_number"]);
    assert_eq!(client.write_attributes, vec!["email", "phone_number"]);
    assert_eq!(client.access_token_validity_minutes, 10);
    assert_eq!(client.id_token_validity_minutes, 10);
    assert_eq!(client.refresh_token_validity_minutes, 60);
    assert_eq!(
        client.supported_identity_providers,
        vec![FederatedProvider::Facebook, FederatedProvider::Google]
    );
    assert_eq!(client.depends_on, vec!["Facebook", "Google"]);
}

#[test]
fn client_redirects_follow_the_local_flag() {
    let deployed = StackDefinition::new(&settings(false));
    assert_eq!(deployed.client.callback_urls, vec![CALLBACK]);
    assert_eq!(deployed.client.logout_urls, vec![LOGOUT]);

    let local = StackDefinition::new(&settings(true));
    assert_eq!(local.client.callback_urls, vec![LOCAL_CALLBACK]);
    assert_eq!(local.client.logout_urls, vec![LOCAL_CALLBACK]);
}

#[test]
fn api_routes_carry_one_mechanism_each() {
    let stack = StackDefinition::new(&settings(false));

    assert_eq!(stack.api.name, "TestAPI");
    assert_eq!(stack.api.default_authorization, RouteAuthorization::SignedRequest);
    assert_eq!(stack.api.routes.len(), 2);

    let iam = stack.route("/privateIAM").unwrap();
    assert_eq!(iam.method, "GET");
    assert_eq!(iam.authorization, RouteAuthorization::SignedRequest);
    assert_eq!(iam.handler, "privateIAM");

    let jwt = stack.route("/privateJWT").unwrap();
    assert_eq!(jwt.authorization, RouteAuthorization::BearerToken);
}

#[test]
fn cors_allows_get_from_both_callback_origins() {
    let cors = StackDefinition::new(&settings(true)).api.cors;

    assert_eq!(cors.allow_methods, vec!["GET"]);
    assert_eq!(cors.allow_origins, vec![LOCAL_CALLBACK, CALLBACK]);
    assert_eq!(cors.allow_headers, vec!["*"]);
}

#[test]
fn authenticated_identities_may_invoke_the_api() {
    let stack = StackDefinition::new(&settings(false));
    let permission = &stack.identity_pool.authenticated_permissions[0];

    assert_eq!(permission.actions, vec!["execute-api:Invoke"]);
    assert_eq!(permission.resources[0].resource, stack.api.id);
    assert_eq!(stack.parameter.name, "/account/stacks-config");
}

#[test]
fn synthesized_definition_holds_no_secret_values() {
    let json = serde_json::to_value(StackDefinition::new(&settings(false))).unwrap();

    assert_eq!(json["stackName"], "ApiAndAuthStack");
    assert_eq!(
        json["identityProviders"][1]["clientSecret"],
        serde_json::json!({"secretId": "/account/api/secrets", "jsonKey": "GOOGLE_CLIENT_SECRET"})
    );
    assert_eq!(json["api"]["routes"][1]["authorization"], "bearerToken");
    assert_eq!(json["userPool"]["removalPolicy"], "DESTROY");
}
