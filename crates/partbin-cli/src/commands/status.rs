//! Status command handler

use anyhow::Result;
use serde::Serialize;

use partbin_core::remote::RemoteStore;
use partbin_core::{Config, LoadSource, Store, SyncCoordinator};

use crate::output::{Output, OutputFormat};

#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    source: &'static str,
    total: usize,
    low_stock: usize,
    unpushed_changes: bool,
    sync_configured: bool,
    repository: &'a str,
    document_path: &'a str,
    data_dir: String,
}

fn source_name(source: LoadSource) -> &'static str {
    match source {
        LoadSource::Remote => "remote",
        LoadSource::Local => "local",
        LoadSource::Default => "default",
    }
}

/// Show status information
pub fn show<R: RemoteStore>(
    store: &Store,
    sync: &SyncCoordinator<R>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let stats = store.stats();
    let report = StatusReport {
        source: source_name(store.source()),
        total: stats.total,
        low_stock: stats.low_stock,
        unpushed_changes: store.has_unpushed_changes(),
        sync_configured: sync.is_configured(),
        repository: &sync.credentials().repository,
        document_path: &sync.settings().document_path,
        data_dir: config.data_dir.display().to_string(),
    };

    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Quiet => {
            println!("{}", report.total);
        }
        OutputFormat::Human => {
            println!("partbin Status");
            println!("==============");
            println!();
            println!("Inventory:");
            println!("  Components: {}", report.total);
            println!("  Low stock:  {}", report.low_stock);
            println!("  Loaded from: {}", report.source);
            println!();
            println!("Sync:");
            if report.sync_configured {
                println!("  Repository: {}", report.repository);
                println!("  Document:   {}", report.document_path);
                if report.unpushed_changes {
                    println!("  Unpushed changes: yes (run `partbin sync`)");
                }
            } else {
                println!("  Status: not configured (run `partbin auth set`)");
            }
            println!();
            println!("Storage:");
            println!("  Location: {}", report.data_dir);
        }
    }

    Ok(())
}
