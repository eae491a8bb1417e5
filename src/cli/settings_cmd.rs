//! `veil settings` — inspect the stored masking configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::settings::{JsonFileStore, SettingsStore};

use super::output::print_json;
use super::resolve_platform;

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Show the flat effective view for one platform instead of the full
    /// settings object.
    #[arg(long)]
    pub platform: Option<String>,

    /// Settings file to read instead of the default store.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub async fn run(args: &SettingsArgs) -> Result<()> {
    let store = match &args.file {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::default_store(),
    };
    let settings = store.load().await?;

    match args.platform.as_deref() {
        Some(flag) => {
            let platform = resolve_platform(Some(flag), None)?;
            let effective = settings.effective(platform);
            print_json(&serde_json::json!({
                "platform": platform.map(|p| p.name()),
                "mask_username": effective.mask_username,
                "mask_full_name": effective.mask_full_name,
                "username_replace": effective.username_replace,
                "full_name_replace": effective.full_name_replace,
                "username_replace_text": effective.username_replace_text,
                "full_name_replace_text": effective.full_name_replace_text,
                "mask_custom_words": effective.mask_custom_words,
                "custom_words": effective.custom_words,
            }));
        }
        None => print_json(&serde_json::to_value(&settings)?),
    }
    Ok(())
}
