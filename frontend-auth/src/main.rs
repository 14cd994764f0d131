//! Inspect the auth configuration the frontend derives from the published
//! stacks record, and exercise the private API routes with it.

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use frontend_auth::{
    constants::AppConstants, ApiClient, ClientConfiguration, HostedUi, RefreshingSessionStore,
    Session, SigningCredentials,
};
use secrecy::SecretString;
use service_core::observability::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "frontend-auth")]
#[command(about = "Frontend auth configuration and API client")]
#[command(version)]
struct Args {
    /// Published stacks record
    #[arg(short, long, default_value = "aws-config.json")]
    record: PathBuf,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the SDK configuration
    Config,
    /// Print the application constants for the current APP_ENV
    Constants,
    /// Print the hosted UI sign-in URL
    LoginUrl {
        /// Go straight to an identity provider (Facebook or Google)
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// Print the hosted UI sign-out URL
    LogoutUrl,
    /// Call a route of one of the configured APIs
    Call {
        /// API name, e.g. TestAPIAuthorizeJWT
        api: String,
        /// Route path, e.g. /privateJWT
        path: String,
        /// Access token for bearer-token APIs
        #[arg(long, env = "ACCESS_TOKEN")]
        access_token: Option<String>,
        /// Refresh token used when the access token is missing or expired
        #[arg(long, env = "REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: Option<String>,
        /// Access key id for signed-request APIs
        #[arg(long, env = "SIGNING_ACCESS_KEY_ID")]
        access_key_id: Option<String>,
        /// Signing secret for signed-request APIs
        #[arg(long, env = "SIGNING_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing("frontend-auth", &args.log_level, None)?;

    if let Commands::Constants = args.command {
        println!("{:#?}", AppConstants::from_env());
        return Ok(());
    }

    let config = ClientConfiguration::load(&args.record)?;

    match args.command {
        Commands::Config => println!("{}", serde_json::to_string_pretty(&config)?),
        Commands::Constants => {}
        Commands::LoginUrl { provider } => {
            println!("{}", HostedUi::new(&config)?.login_url(provider.as_deref())?)
        }
        Commands::LogoutUrl => println!("{}", HostedUi::new(&config)?.logout_url()?),
        Commands::Call {
            api,
            path,
            access_token,
            refresh_token,
            access_key_id,
            secret,
        } => {
            let sessions = Arc::new(RefreshingSessionStore::new(HostedUi::new(&config)?));
            if access_token.is_some() || refresh_token.is_some() {
                // Without an access token the session starts expired and is
                // renewed on first use.
                let expires_at = match access_token {
                    Some(_) => Utc::now() + Duration::minutes(10),
                    None => Utc::now(),
                };
                sessions
                    .set(Session::new(
                        SecretString::new(access_token.unwrap_or_default()),
                        SecretString::new(String::new()),
                        refresh_token.map(SecretString::new),
                        expires_at,
                    ))
                    .await;
            }

            let mut client = ApiClient::new(&config, sessions)?;
            if let (Some(access_key_id), Some(secret)) = (access_key_id, secret) {
                client = client.with_signing_credentials(SigningCredentials {
                    access_key_id,
                    secret: SecretString::new(secret),
                });
            }

            match client.get(&api, &path).await {
                Ok(body) => println!("{}", body),
                Err(e) if e.requires_sign_in() => {
                    eprintln!("Not signed in. Sign in at:");
                    eprintln!("{}", HostedUi::new(&config)?.login_url(None)?);
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
