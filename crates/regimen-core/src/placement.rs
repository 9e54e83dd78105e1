//! Placement results: placed items and warnings.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{InstanceId, ItemDefinition};
use crate::validator::Strictness;

/// Kind of day, which may change doses and add bonus instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    #[default]
    Normal,
    HighExertion,
}

/// An item bound to a concrete time on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: String,
    /// Definition as scheduled (dose overrides already applied)
    pub item: ItemDefinition,
    pub date: NaiveDate,
    pub time: NaiveDateTime,
    pub day_type: DayType,
    pub shifted: bool,
    pub shift_reason: Option<String>,
    /// Validation tier that accepted this time; `None` for feeding-window
    /// deferrals, which are laid out without validation
    pub tier: Option<Strictness>,
}

impl PlacedItem {
    /// Create a new placement
    pub fn new(
        item: ItemDefinition,
        date: NaiveDate,
        time: NaiveDateTime,
        day_type: DayType,
        tier: Option<Strictness>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item,
            date,
            time,
            day_type,
            shifted: false,
            shift_reason: None,
            tier,
        }
    }

    /// Mark this placement as moved away from its ideal time
    pub fn with_shift(mut self, reason: impl Into<String>) -> Self {
        self.shifted = true;
        self.shift_reason = Some(reason.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.item.name
    }

    pub fn instance_id(&self) -> InstanceId {
        self.item.instance_id()
    }
}

/// Warning severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Something the caller should know about a day's allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub date: NaiveDate,
    pub item_name: String,
    pub reason: String,
    pub severity: Severity,
}

impl Warning {
    pub fn warning(date: NaiveDate, item_name: &str, reason: impl Into<String>) -> Self {
        Self {
            date,
            item_name: item_name.to_string(),
            reason: reason.into(),
            severity: Severity::Warning,
        }
    }

    pub fn error(date: NaiveDate, item_name: &str, reason: impl Into<String>) -> Self {
        Self {
            date,
            item_name: item_name.to_string(),
            reason: reason.into(),
            severity: Severity::Error,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.date, self.item_name, self.reason
        )
    }
}
