//! Auth command handlers

use anyhow::{Context, Result};

use partbin_core::{Config, CredentialStore, KeyValueStore};

use crate::output::{Output, OutputFormat};

fn credential_store(config: &Config) -> CredentialStore {
    CredentialStore::new(KeyValueStore::new(&config.data_dir))
}

/// Store a token and repository
pub fn set(config: &Config, token: String, repository: String, output: &Output) -> Result<()> {
    let credentials = credential_store(config)
        .set(&token, &repository)
        .context("Failed to save credentials")?;

    output.success(&format!(
        "Credentials saved for {}",
        credentials.repository
    ));
    Ok(())
}

/// Remove stored credentials
pub fn clear(config: &Config, output: &Output) -> Result<()> {
    credential_store(config)
        .clear()
        .context("Failed to clear credentials")?;

    output.success("Credentials cleared");
    Ok(())
}

/// Show the effective credentials with the token masked
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let credentials = credential_store(config).get_with_env();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "configured": credentials.is_configured(),
                    "repository": credentials.repository,
                    "token": credentials.masked_token(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", credentials.is_configured());
        }
        OutputFormat::Human => {
            let or_unset = |value: String| {
                if value.is_empty() {
                    "(not set)".to_string()
                } else {
                    value
                }
            };
            println!("GitHub credentials:");
            println!("  repository: {}", or_unset(credentials.repository.clone()));
            println!("  token:      {}", or_unset(credentials.masked_token()));
            println!();
            if credentials.is_configured() {
                println!("Sync is enabled.");
            } else {
                println!("Sync is disabled until both values are set.");
            }
        }
    }
    Ok(())
}
