//! Masking rules derived from identity and settings.

use regex::Regex;

use crate::extract::Identity;
use crate::settings::EffectiveSettings;

/// How a matched segment is transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskMode {
    /// Visually obscured; the original text stays in the DOM.
    Blur,
    /// Replacement text is rendered; the original is kept as metadata.
    Replace,
}

/// Where a rule came from. Construction order doubles as match precedence:
/// custom words, then username, then full name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    CustomWord,
    Username,
    FullName,
}

/// One masking directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub pattern: String,
    pub mode: MaskMode,
    pub replacement: String,
    pub source: RuleSource,
}

/// Active rules in precedence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build the active rule set. Blank patterns are never admitted.
    pub fn build(identity: Option<&Identity>, settings: &EffectiveSettings) -> RuleSet {
        let mut rules = Vec::new();

        if settings.mask_custom_words {
            let mode = mode_for(settings.custom_words_replace);
            for word in split_custom_words(&settings.custom_words) {
                push_rule(
                    &mut rules,
                    word,
                    mode,
                    &settings.custom_words_replace_text,
                    RuleSource::CustomWord,
                );
            }
        }

        if let Some(identity) = identity {
            if settings.mask_username {
                if let Some(username) = identity.username.as_deref() {
                    push_rule(
                        &mut rules,
                        username.to_string(),
                        mode_for(settings.username_replace),
                        &settings.username_replace_text,
                        RuleSource::Username,
                    );
                }
            }
            if settings.mask_full_name {
                if let Some(full_name) = identity.full_name.as_deref() {
                    push_rule(
                        &mut rules,
                        full_name.to_string(),
                        mode_for(settings.full_name_replace),
                        &settings.full_name_replace_text,
                        RuleSource::FullName,
                    );
                }
            }
        }

        RuleSet { rules }
    }

    pub fn is_active(&self) -> bool {
        !self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Compile the combined alternation and the per-rule boundary patterns.
    /// `None` when no rule is active.
    pub fn compile(&self) -> Option<CompiledRules> {
        CompiledRules::new(&self.rules)
    }
}

fn mode_for(replace: bool) -> MaskMode {
    if replace {
        MaskMode::Replace
    } else {
        MaskMode::Blur
    }
}

fn push_rule(rules: &mut Vec<Rule>, pattern: String, mode: MaskMode, replacement: &str, source: RuleSource) {
    if pattern.trim().is_empty() {
        return;
    }
    rules.push(Rule {
        pattern,
        mode,
        replacement: replacement.to_string(),
        source,
    });
}

/// Split a comma-joined custom word list: trim entries, discard empties.
pub fn split_custom_words(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Compiled form of a rule set. The combined pattern lists alternatives in
/// construction order; with the regex engine's leftmost-first alternation
/// preference, an earlier rule wins at a shared match position.
#[derive(Debug)]
pub struct CompiledRules {
    combined: Regex,
    singles: Vec<Regex>,
    rules: Vec<Rule>,
}

impl CompiledRules {
    fn new(rules: &[Rule]) -> Option<Self> {
        if rules.is_empty() {
            return None;
        }
        let alternation = rules
            .iter()
            .map(|r| regex::escape(&r.pattern))
            .collect::<Vec<_>>()
            .join("|");
        let combined = Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).ok()?;
        let singles = rules
            .iter()
            .map(|r| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&r.pattern))))
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        Some(Self {
            combined,
            singles,
            rules: rules.to_vec(),
        })
    }

    pub fn combined(&self) -> &Regex {
        &self.combined
    }

    /// Index of the first rule (construction order) whose own boundary
    /// pattern matches the segment.
    pub fn attribute(&self, segment: &str) -> Option<usize> {
        self.singles.iter().position(|re| re.is_match(segment))
    }

    pub fn rule(&self, index: usize) -> &Rule {
        &self.rules[index]
    }
}
