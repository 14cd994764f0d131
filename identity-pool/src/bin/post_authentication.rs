use identity_pool::services::CognitoUserPoolAdmin;
use identity_pool::triggers::{handle_post_authentication, PostAuthenticationEvent};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    init_tracing("post-authentication", &log_level, None)?;

    let admin = CognitoUserPoolAdmin::from_env().await;
    let admin = &admin;

    run(service_fn(
        move |event: LambdaEvent<PostAuthenticationEvent>| async move {
            let event = handle_post_authentication(admin, event.payload).await?;
            Ok::<_, Error>(event)
        },
    ))
    .await
}
