//! Platform detection from the page URL.

use std::fmt;
use std::str::FromStr;

use url::Url;

/// Supported profile platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Instagram,
    Twitter,
    LinkedIn,
}

impl Platform {
    /// Detect the platform from a page URL by host suffix.
    /// Unrecognized hosts (and unparseable URLs) yield `None`.
    pub fn from_url(url: &str) -> Option<Platform> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();
        if host_matches(&host, "instagram.com") {
            Some(Platform::Instagram)
        } else if host_matches(&host, "twitter.com") || host_matches(&host, "x.com") {
            Some(Platform::Twitter)
        } else if host_matches(&host, "linkedin.com") {
            Some(Platform::LinkedIn)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::LinkedIn => "linkedin",
        }
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "twitter" | "x" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::LinkedIn),
            other => Err(format!(
                "unknown platform '{other}' (expected instagram, twitter or linkedin)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_known_hosts() {
        assert_eq!(
            Platform::from_url("https://www.instagram.com/someone/"),
            Some(Platform::Instagram)
        );
        assert_eq!(
            Platform::from_url("https://x.com/someone"),
            Some(Platform::Twitter)
        );
        assert_eq!(
            Platform::from_url("https://mobile.twitter.com/someone"),
            Some(Platform::Twitter)
        );
        assert_eq!(
            Platform::from_url("https://www.linkedin.com/in/someone/"),
            Some(Platform::LinkedIn)
        );
    }

    #[test]
    fn test_from_url_rejects_lookalikes() {
        assert_eq!(Platform::from_url("https://notinstagram.com/x"), None);
        assert_eq!(Platform::from_url("https://example.com/instagram.com"), None);
        assert_eq!(Platform::from_url("not a url"), None);
    }
}
