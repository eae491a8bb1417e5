//! CLI subcommand implementations for the veil binary.

pub mod identify_cmd;
pub mod mask_cmd;
pub mod output;
pub mod settings_cmd;

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::extract::Platform;

/// Read an input file, with `-` meaning stdin.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Resolve the platform from an explicit flag or the page URL.
pub fn resolve_platform(flag: Option<&str>, url: Option<&str>) -> Result<Option<Platform>> {
    if let Some(name) = flag {
        let platform = name
            .parse::<Platform>()
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(Some(platform));
    }
    match url {
        Some(url) => Ok(Platform::from_url(url)),
        None => Ok(None),
    }
}

/// Like [`resolve_platform`], but a platform is mandatory.
pub fn require_platform(flag: Option<&str>, url: Option<&str>) -> Result<Platform> {
    match resolve_platform(flag, url)? {
        Some(platform) => Ok(platform),
        None => bail!("no platform detected; pass --platform instagram|twitter|linkedin or a recognizable --url"),
    }
}
