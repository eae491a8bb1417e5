//! Masking settings — per-platform sections plus a global custom-word group.
//!
//! The model mirrors the synchronized key-value store shape: one section per
//! platform, one global section, merged into a flat effective view for the
//! engine. A settings object is a snapshot; consumers replace it wholesale
//! on update and never see partial field changes mid-scan.

pub mod store;

use serde::{Deserialize, Serialize};

use crate::extract::Platform;

pub use store::{JsonFileStore, MemoryStore, SettingsStore};

/// Per-platform masking toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    pub mask_username: bool,
    pub mask_full_name: bool,
    pub username_replace: bool,
    pub full_name_replace: bool,
    pub username_replace_text: String,
    pub full_name_replace_text: String,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            mask_username: true,
            mask_full_name: true,
            username_replace: false,
            full_name_replace: false,
            username_replace_text: "[username]".to_string(),
            full_name_replace_text: "[name]".to_string(),
        }
    }
}

impl PlatformSettings {
    /// LinkedIn profiles have no handle worth masking; only the display name
    /// is on by default.
    fn linkedin_default() -> Self {
        Self {
            mask_username: false,
            username_replace_text: String::new(),
            ..Self::default()
        }
    }
}

/// Platform-independent settings: the custom word group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub mask_custom_words: bool,
    pub custom_words_replace: bool,
    pub custom_words_replace_text: String,
    /// Comma-joined word list, as typed by the user.
    pub custom_words: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            mask_custom_words: true,
            custom_words_replace: false,
            custom_words_replace_text: "[hidden]".to_string(),
            custom_words: String::new(),
        }
    }
}

/// The full persisted settings object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub instagram: PlatformSettings,
    pub twitter: PlatformSettings,
    #[serde(default = "PlatformSettings::linkedin_default")]
    pub linkedin: PlatformSettings,
    pub global: GlobalSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            instagram: PlatformSettings::default(),
            twitter: PlatformSettings::default(),
            linkedin: PlatformSettings::linkedin_default(),
            global: GlobalSettings::default(),
        }
    }
}

impl Settings {
    /// Built-in defaults, used until (and whenever) the store delivers
    /// nothing.
    pub fn built_in() -> Self {
        Self::default()
    }

    pub fn platform(&self, platform: Platform) -> &PlatformSettings {
        match platform {
            Platform::Instagram => &self.instagram,
            Platform::Twitter => &self.twitter,
            Platform::LinkedIn => &self.linkedin,
        }
    }

    pub fn platform_mut(&mut self, platform: Platform) -> &mut PlatformSettings {
        match platform {
            Platform::Instagram => &mut self.instagram,
            Platform::Twitter => &mut self.twitter,
            Platform::LinkedIn => &mut self.linkedin,
        }
    }

    /// Flatten the platform section and the global section into the view the
    /// engine consumes. Without a platform, identity masking is off and only
    /// the custom word group applies.
    pub fn effective(&self, platform: Option<Platform>) -> EffectiveSettings {
        let section = platform.map(|p| self.platform(p).clone()).unwrap_or(
            PlatformSettings {
                mask_username: false,
                mask_full_name: false,
                ..PlatformSettings::default()
            },
        );
        EffectiveSettings {
            mask_username: section.mask_username,
            mask_full_name: section.mask_full_name,
            username_replace: section.username_replace,
            full_name_replace: section.full_name_replace,
            username_replace_text: section.username_replace_text,
            full_name_replace_text: section.full_name_replace_text,
            mask_custom_words: self.global.mask_custom_words,
            custom_words_replace: self.global.custom_words_replace,
            custom_words_replace_text: self.global.custom_words_replace_text.clone(),
            custom_words: self.global.custom_words.clone(),
        }
    }
}

/// Flat merged view handed to rule construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub mask_username: bool,
    pub mask_full_name: bool,
    pub username_replace: bool,
    pub full_name_replace: bool,
    pub username_replace_text: String,
    pub full_name_replace_text: String,
    pub mask_custom_words: bool,
    pub custom_words_replace: bool,
    pub custom_words_replace_text: String,
    pub custom_words: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_defaults() {
        let settings = Settings::built_in();
        assert!(settings.instagram.mask_username);
        assert!(settings.twitter.mask_full_name);
        assert!(!settings.linkedin.mask_username);
        assert!(settings.linkedin.mask_full_name);
        assert_eq!(settings.linkedin.username_replace_text, "");
        assert_eq!(settings.global.custom_words_replace_text, "[hidden]");
    }

    #[test]
    fn test_effective_merges_platform_and_global() {
        let mut settings = Settings::built_in();
        settings.global.custom_words = "secret".to_string();
        settings.platform_mut(Platform::Twitter).username_replace = true;

        let effective = settings.effective(Some(Platform::Twitter));
        assert!(effective.username_replace);
        assert_eq!(effective.custom_words, "secret");

        let other = settings.effective(Some(Platform::Instagram));
        assert!(!other.username_replace);
    }

    #[test]
    fn test_effective_without_platform_masks_custom_words_only() {
        let mut settings = Settings::built_in();
        settings.global.custom_words = "secret".to_string();
        let effective = settings.effective(None);
        assert!(!effective.mask_username);
        assert!(!effective.mask_full_name);
        assert!(effective.mask_custom_words);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"global": {"custom_words": "a,b"}}"#).unwrap();
        assert_eq!(settings.global.custom_words, "a,b");
        assert!(settings.global.mask_custom_words);
        assert!(settings.twitter.mask_username);
    }
}
