//! `veil identify` — extract the profile identity from a saved page.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::dom::parse_document;
use crate::extract;
use crate::page::PageContext;

use super::output::{print_check, print_json, Styled};
use super::{read_input, require_platform};

#[derive(Debug, Args)]
pub struct IdentifyArgs {
    /// HTML file to inspect (`-` for stdin).
    pub input: PathBuf,

    /// Page URL, used for platform detection.
    #[arg(long)]
    pub url: Option<String>,

    /// Force a platform: instagram, twitter or linkedin.
    #[arg(long)]
    pub platform: Option<String>,

    /// Emit JSON instead of human output.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &IdentifyArgs) -> Result<()> {
    let html = read_input(&args.input)?;
    let platform = require_platform(args.platform.as_deref(), args.url.as_deref())?;

    let dom = parse_document(&html);
    let url = args.url.as_deref().unwrap_or("");
    let ctx = PageContext::new(url, &html, &dom);
    let identity = extract::extract(&ctx, platform);

    if args.json {
        print_json(&serde_json::json!({
            "platform": platform.name(),
            "identity": identity,
        }));
        return Ok(());
    }

    let styled = Styled::new();
    match identity {
        Some(identity) => {
            print_check(
                styled.ok_sym(),
                "platform",
                &styled.dim(platform.name()),
            );
            print_check(
                styled.ok_sym(),
                "username",
                identity.username.as_deref().unwrap_or("(none)"),
            );
            print_check(
                styled.ok_sym(),
                "full name",
                identity.full_name.as_deref().unwrap_or("(none)"),
            );
        }
        None => {
            print_check(styled.warn_sym(), "identity", "no strategy matched");
        }
    }
    Ok(())
}
