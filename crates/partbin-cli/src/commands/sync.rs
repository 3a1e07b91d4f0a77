//! Sync and pull command handlers

use anyhow::{anyhow, Result};

use partbin_core::remote::RemoteStore;
use partbin_core::{PushOutcome, Store, SyncCoordinator};

use crate::output::Output;
use crate::prompt::confirm;

/// Push the local collection to the remote document
pub async fn sync<R: RemoteStore>(
    store: &Store,
    sync: &SyncCoordinator<R>,
    output: &Output,
) -> Result<()> {
    if sync.is_configured() {
        output.message(&format!(
            "Syncing {} component(s) to {}...",
            store.components().len(),
            sync.credentials().repository
        ));
    }

    match store.push(sync).await {
        Ok(PushOutcome::NotConfigured) => {
            output.message(
                "GitHub sync is not configured; changes are saved locally only.\n\
                 Set credentials with:\n  partbin auth set <token> <owner/repo>",
            );
            Ok(())
        }
        Ok(PushOutcome::Pushed { version, created }) => {
            let action = if created { "created" } else { "updated" };
            output.success(&format!(
                "Sync complete - {} {} ({})",
                action,
                sync.settings().document_path,
                &version.as_str()[..version.as_str().len().min(7)]
            ));
            Ok(())
        }
        Err(e) => Err(anyhow!("Sync failed: {}\n{}", e, e.guidance())),
    }
}

/// Replace the local collection with the remote document
pub async fn pull<R: RemoteStore>(
    store: &mut Store,
    sync: &SyncCoordinator<R>,
    yes: bool,
    output: &Output,
) -> Result<()> {
    if !yes && output.should_prompt() && store.has_unpushed_changes() {
        println!("Local changes have not been pushed and will be discarded.");
        if !confirm("Pull anyway?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    match store.pull(sync).await {
        Ok(count) => {
            output.success(&format!(
                "Pulled {} component(s) from {}",
                count,
                sync.credentials().repository
            ));
            Ok(())
        }
        Err(e) => Err(anyhow!("Pull failed: {}\n{}", e, e.guidance())),
    }
}
