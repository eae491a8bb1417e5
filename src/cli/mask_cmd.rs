//! `veil mask` — mask a saved page end to end and emit the rewritten HTML.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::session::PageSession;
use crate::settings::{JsonFileStore, SettingsStore};

use super::output::{print_check, Styled};
use super::{read_input, resolve_platform};

#[derive(Debug, Args)]
pub struct MaskArgs {
    /// HTML file to mask (`-` for stdin).
    pub input: PathBuf,

    /// Page URL, used for platform detection.
    #[arg(long)]
    pub url: Option<String>,

    /// Force a platform: instagram, twitter or linkedin.
    #[arg(long)]
    pub platform: Option<String>,

    /// Extra custom words (comma-joined), appended to the stored list.
    #[arg(long)]
    pub words: Option<String>,

    /// Settings file to use instead of the default store.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Write the masked page here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print scan statistics to stderr.
    #[arg(long)]
    pub stats: bool,
}

pub async fn run(args: &MaskArgs) -> Result<()> {
    let html = read_input(&args.input)?;
    let platform = resolve_platform(args.platform.as_deref(), args.url.as_deref())?;

    let store = match &args.settings {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::default_store(),
    };
    let mut settings = store.load().await?;
    if let Some(words) = &args.words {
        let list = &mut settings.global.custom_words;
        if list.trim().is_empty() {
            *list = words.clone();
        } else {
            *list = format!("{list},{words}");
        }
    }

    let url = args.url.as_deref().unwrap_or("");
    let mut session = PageSession::new(url, &html).with_platform(platform);
    session.replace_settings(settings);
    let stats = session.bootstrap();

    let masked = session.render();
    match &args.output {
        Some(path) => std::fs::write(path, masked)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{masked}"),
    }

    if args.stats {
        let styled = Styled::new();
        let identity = match session.identity() {
            Some(identity) => format!(
                "{} / {}",
                identity.username.as_deref().unwrap_or("(none)"),
                identity.full_name.as_deref().unwrap_or("(none)")
            ),
            None => "not found".to_string(),
        };
        print_check(styled.ok_sym(), "identity", &identity);
        print_check(
            styled.ok_sym(),
            "text nodes",
            &stats.text_nodes_seen.to_string(),
        );
        print_check(
            styled.ok_sym(),
            "masked",
            &format!(
                "{} spans in {} nodes",
                stats.spans_created, stats.nodes_rewritten
            ),
        );
    }
    Ok(())
}
