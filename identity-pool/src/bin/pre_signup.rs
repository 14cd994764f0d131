use identity_pool::triggers::{handle_pre_signup, PreSignUpEvent};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use service_core::observability::init_tracing;

async fn function_handler(event: LambdaEvent<PreSignUpEvent>) -> Result<PreSignUpEvent, Error> {
    Ok(handle_pre_signup(event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    init_tracing("pre-signup", &log_level, None)?;

    run(service_fn(function_handler)).await
}
