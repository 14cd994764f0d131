//! Stack tooling: print the declared stack, check the provider secrets, and
//! publish the stacks record once the stack is deployed.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use service_core::observability::init_tracing;
use stack_config::{
    publish::publish_all,
    secrets::{resolve_provider_credentials, SecretsManagerSource},
    DeploymentOutputs, FilePublisher, Publisher, SsmPublisher, StackDefinition, StackSettings,
};
use std::path::PathBuf;
use validator::Validate;

#[derive(Parser, Debug)]
#[command(name = "stack-config")]
#[command(about = "Identity and API stack definition and configuration publishing")]
#[command(version)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the stack definition as JSON
    Synth,
    /// Check that every identity provider has credentials in the API secret
    VerifySecrets,
    /// Print the stack outputs for a deployment
    Outputs {
        #[command(flatten)]
        outputs: OutputArgs,
    },
    /// Publish the stacks record for a deployment
    Publish {
        #[command(flatten)]
        outputs: OutputArgs,
        /// Write the frontend's record to this file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Store the record in the account-level SSM parameter
        #[arg(long)]
        ssm: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct OutputArgs {
    #[arg(long)]
    user_pool_id: String,
    #[arg(long)]
    user_pool_client_id: String,
    #[arg(long)]
    identity_pool_id: String,
    #[arg(long)]
    api_endpoint: String,
}

impl From<OutputArgs> for DeploymentOutputs {
    fn from(args: OutputArgs) -> Self {
        Self {
            user_pool_id: args.user_pool_id,
            user_pool_client_id: args.user_pool_client_id,
            identity_pool_id: args.identity_pool_id,
            api_endpoint: args.api_endpoint,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing("stack-config", &args.log_level, None)?;

    let settings = StackSettings::from_env()?;
    tracing::info!(
        region = %settings.region,
        domain_prefix = %settings.domain_prefix,
        is_local = settings.is_local,
        "Loaded stack settings"
    );

    match args.command {
        Commands::Synth => {
            let definition = StackDefinition::new(&settings);
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        Commands::VerifySecrets => {
            let source = SecretsManagerSource::for_region(&settings.region).await;
            for credentials in resolve_provider_credentials(&source).await? {
                tracing::info!(
                    provider = %credentials.provider,
                    client_id = %credentials.client_id,
                    "Provider credentials present"
                );
            }
        }
        Commands::Outputs { outputs } => {
            let outputs = DeploymentOutputs::from(outputs);
            outputs.validate()?;
            let record = outputs.stacks_config(&settings);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Publish { outputs, file, ssm } => {
            let outputs = DeploymentOutputs::from(outputs);
            outputs.validate()?;
            let record = outputs.stacks_config(&settings);

            let mut publishers: Vec<Box<dyn Publisher>> = Vec::new();
            if let Some(path) = file {
                publishers.push(Box::new(FilePublisher::new(path)));
            }
            if ssm {
                publishers.push(Box::new(SsmPublisher::for_region(&settings.region).await));
            }
            if publishers.is_empty() {
                anyhow::bail!("Nothing to publish to: pass --file and/or --ssm");
            }

            publish_all(&publishers, &record).await?;
        }
    }

    Ok(())
}
