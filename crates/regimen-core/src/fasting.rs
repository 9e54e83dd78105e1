//! Fasting-mode classification and feeding-window deferral.
//!
//! When fasting mode is on every enabled item is classified before normal
//! placement. Deferred items skip the search ladder entirely and are laid
//! out back to back inside the feeding window once the ordinary items are
//! placed.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::anchors::AnchorSet;
use crate::catalog::{FastingAction, ItemDefinition};
use crate::clock::{at, shift};
use crate::error::ConfigError;
use crate::placement::{DayType, PlacedItem, Warning};
use crate::settings::{FastingLevel, Settings};

/// First deferred item sits this long after the feeding window opens.
pub const DEFERRAL_LEAD_MINUTES: i64 = 15;
/// Minimum spacing between deferred items.
pub const MIN_DEFERRAL_SPACING_MINUTES: i64 = 15;
pub const DEFERRAL_REASON: &str = "deferred to feeding window";

/// Outcome of classifying one item for a fasting day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastingDecision {
    Allow,
    Skip(String),
    Defer,
}

/// Fasting rules resolved for one date.
#[derive(Debug, Clone)]
pub struct FastingPolicy {
    pub level: FastingLevel,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
}

impl FastingPolicy {
    /// Build the policy for `date`, or `None` when fasting mode is off.
    pub fn for_date(settings: &Settings, date: NaiveDate) -> Result<Option<Self>, ConfigError> {
        if !settings.fasting.is_on() {
            return Ok(None);
        }
        let (start, end) = settings.fasting.window_times()?;
        Ok(Some(Self {
            level: settings.fasting.level,
            window_start: at(date, start),
            window_end: at(date, end),
        }))
    }

    /// Inclusive feeding-window membership.
    pub fn in_window(&self, time: NaiveDateTime) -> bool {
        time >= self.window_start && time <= self.window_end
    }

    pub fn classify(&self, item: &ItemDefinition, anchors: &AnchorSet) -> FastingDecision {
        match item.fasting {
            FastingAction::Allow => FastingDecision::Allow,
            FastingAction::Skip => FastingDecision::Skip("skipped while fasting".to_string()),
            FastingAction::Defer => match self.level {
                FastingLevel::Strict => {
                    FastingDecision::Skip("deferrable item skipped under strict fasting".to_string())
                }
                FastingLevel::Light => FastingDecision::Defer,
            },
            FastingAction::MealDependent => self.classify_meal_bound(item, anchors),
        }
    }

    /// The bound meal is the item's own anchor; the fallback anchor is never
    /// consulted here.
    fn classify_meal_bound(&self, item: &ItemDefinition, anchors: &AnchorSet) -> FastingDecision {
        let meal = item.anchor;
        if !meal.is_meal() {
            return FastingDecision::Allow;
        }
        match anchors.get(meal) {
            Some(at) if self.in_window(at) => FastingDecision::Allow,
            Some(_) => FastingDecision::Skip(format!("{meal} falls outside the feeding window")),
            None => FastingDecision::Skip(format!("no {meal} today")),
        }
    }

    /// Lay deferred items out from shortly after the window opens.
    ///
    /// Items keep catalog order and are spaced by their tolerance (at least
    /// 15 minutes). Items that would start after the window closes are
    /// dropped with a warning.
    pub fn lay_out(
        &self,
        deferred: Vec<ItemDefinition>,
        date: NaiveDate,
        day_type: DayType,
    ) -> (Vec<PlacedItem>, Vec<Warning>) {
        let mut placed = Vec::new();
        let mut warnings = Vec::new();
        let mut cursor = shift(self.window_start, DEFERRAL_LEAD_MINUTES);

        for item in deferred {
            if cursor > self.window_end {
                warnings.push(Warning::warning(
                    date,
                    &item.name,
                    "feeding window full; deferred item dropped",
                ));
                continue;
            }
            let spacing = item.tolerance_minutes.max(MIN_DEFERRAL_SPACING_MINUTES);
            debug!(item = %item.name, time = %cursor, "deferred into feeding window");
            placed.push(
                PlacedItem::new(item, date, cursor, day_type, None).with_shift(DEFERRAL_REASON),
            );
            cursor = shift(cursor, spacing);
        }

        (placed, warnings)
    }
}
