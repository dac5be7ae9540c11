//! Config command - show and update stored defaults.

use anyhow::Result;
use clap::Args;
use ksniff_core::SettingsStore;

#[derive(Args)]
pub struct SetArgs {
    /// Default namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Default capture interface
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Default debug image
    #[arg(long)]
    pub image: Option<String>,

    /// Default seconds to wait for the debug container
    #[arg(long = "timeout")]
    pub timeout_secs: Option<u64>,
}

pub async fn show() -> Result<()> {
    let store = SettingsStore::new()?;
    let defaults = store.load().await?;

    println!("# {}", store.config_path().display());
    println!("{}", serde_json::to_string_pretty(&defaults)?);
    Ok(())
}

pub async fn set(args: SetArgs) -> Result<()> {
    let store = SettingsStore::new()?;
    let mut defaults = store.load().await?;

    if args.namespace.is_some() {
        defaults.namespace = args.namespace;
    }
    if args.interface.is_some() {
        defaults.interface = args.interface;
    }
    if args.image.is_some() {
        defaults.image = args.image;
    }
    if args.timeout_secs.is_some() {
        defaults.container_timeout_secs = args.timeout_secs;
    }

    store.save(&defaults).await?;
    println!("Saved {}", store.config_path().display());
    Ok(())
}
