//! Interaction checking for a day's placements.
//!
//! The allocator never acts on interaction results. It hands the placed
//! `(name, time)` pairs to an [`InteractionChecker`] and passes the report
//! through to the caller.
//!
//! [`RuleBook`] is the bundled checker. Its rule table is parsed on first
//! use and cached; [`RuleBook::reload`] drops the cache so the next check
//! parses the source again.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::clock::gap_minutes;
use crate::error::{CoreError, Result};

const EMBEDDED_RULES: &str = include_str!("../data/interactions.toml");

/// How serious an interaction is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSeverity {
    Minor,
    Moderate,
    Major,
}

/// One reported pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub first: String,
    pub second: String,
    pub gap_hours: f64,
    pub severity: InteractionSeverity,
    pub required_hours: f64,
    pub adequate: bool,
    #[serde(default)]
    pub note: Option<String>,
}

/// Collaborator that inspects a day's placements.
pub trait InteractionChecker {
    fn check(&self, date: NaiveDate, items: &[(String, NaiveDateTime)]) -> Result<Vec<Interaction>>;
}

/// A spacing rule between two item names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub first: String,
    pub second: String,
    pub required_hours: f64,
    pub severity: InteractionSeverity,
    #[serde(default)]
    pub note: Option<String>,
}

impl InteractionRule {
    fn matches(&self, a: &str, b: &str) -> bool {
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        let (first, second) = (self.first.to_lowercase(), self.second.to_lowercase());
        (a.contains(&first) && b.contains(&second)) || (a.contains(&second) && b.contains(&first))
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<InteractionRule>,
}

/// Rule-table backed checker with a lazily parsed, reloadable cache.
#[derive(Debug)]
pub struct RuleBook {
    source: String,
    rules: OnceCell<Vec<InteractionRule>>,
}

impl RuleBook {
    /// Rule book over the bundled rule table.
    pub fn embedded() -> Self {
        Self::from_toml(EMBEDDED_RULES)
    }

    /// Rule book over a caller-supplied TOML table. Parsing is deferred to
    /// the first check.
    pub fn from_toml(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            rules: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.rules.get().is_some()
    }

    /// Drop the parsed rules; the next check re-parses the source.
    pub fn reload(&mut self) {
        self.rules = OnceCell::new();
    }

    /// Replace the source table and drop the cache.
    pub fn replace_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.reload();
    }

    pub fn rules(&self) -> Result<&[InteractionRule]> {
        self.rules
            .get_or_try_init(|| {
                let file: RuleFile = toml::from_str(&self.source).map_err(|e| {
                    CoreError::Interaction(format!("failed to parse interaction rules: {e}"))
                })?;
                tracing::debug!(count = file.rules.len(), "interaction rules loaded");
                Ok::<_, CoreError>(file.rules)
            })
            .map(|rules| rules.as_slice())
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::embedded()
    }
}

impl InteractionChecker for RuleBook {
    fn check(&self, _date: NaiveDate, items: &[(String, NaiveDateTime)]) -> Result<Vec<Interaction>> {
        let rules = self.rules()?;
        let mut found = Vec::new();

        for (i, (name_a, time_a)) in items.iter().enumerate() {
            for (name_b, time_b) in &items[i + 1..] {
                for rule in rules.iter().filter(|r| r.matches(name_a, name_b)) {
                    let gap_hours = gap_minutes(*time_a, *time_b) as f64 / 60.0;
                    found.push(Interaction {
                        first: name_a.clone(),
                        second: name_b.clone(),
                        gap_hours,
                        severity: rule.severity,
                        required_hours: rule.required_hours,
                        adequate: gap_hours >= rule.required_hours,
                        note: rule.note.clone(),
                    });
                }
            }
        }

        Ok(found)
    }
}
