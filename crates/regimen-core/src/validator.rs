//! Slot validation at escalating strictness tiers.
//!
//! | Tier              | Meal buffer | Item buffer | Same name exempt | Before-meal band |
//! |-------------------|-------------|-------------|------------------|------------------|
//! | Strict            | 60          | 60          | no               | 10..=25          |
//! | Relaxed           | 30          | 30          | no               | 5..=30           |
//! | VeryRelaxed       | 15          | 30          | yes              | 5..=30           |
//! | ExactConflictOnly | 10          | 5 (any tag) | no               | 5..=30           |
//!
//! A gap conflicts when it is strictly smaller than the buffer, so a gap of
//! exactly the buffer is accepted.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::anchors::AnchorSet;
use crate::catalog::{ConflictTag, ItemDefinition};
use crate::clock::{gap_minutes, minutes_between};
use crate::placement::PlacedItem;

/// Validation profile, strictest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Strict,
    Relaxed,
    VeryRelaxed,
    ExactConflictOnly,
}

/// Spacing limits for one tier, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buffers {
    pub meal: i64,
    pub item: i64,
    /// Items sharing a name never conflict with each other
    pub same_name_exempt: bool,
    /// Item buffer applies regardless of conflict tags
    pub untagged_items: bool,
    /// Inclusive minutes-before-meal band for before-meal items
    pub before_meal: (i64, i64),
}

impl Strictness {
    pub fn buffers(self) -> Buffers {
        match self {
            Strictness::Strict => Buffers {
                meal: 60,
                item: 60,
                same_name_exempt: false,
                untagged_items: false,
                before_meal: (10, 25),
            },
            Strictness::Relaxed => Buffers {
                meal: 30,
                item: 30,
                same_name_exempt: false,
                untagged_items: false,
                before_meal: (5, 30),
            },
            Strictness::VeryRelaxed => Buffers {
                meal: 15,
                item: 30,
                same_name_exempt: true,
                untagged_items: false,
                before_meal: (5, 30),
            },
            Strictness::ExactConflictOnly => Buffers {
                meal: 10,
                item: 5,
                same_name_exempt: false,
                untagged_items: true,
                before_meal: (5, 30),
            },
        }
    }

    pub fn is_relaxed(self) -> bool {
        self != Strictness::Strict
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strictness::Strict => "strict",
            Strictness::Relaxed => "relaxed",
            Strictness::VeryRelaxed => "very relaxed",
            Strictness::ExactConflictOnly => "exact-conflict-only",
        };
        f.write_str(label)
    }
}

/// Decide whether `candidate` is an acceptable time for `item`.
///
/// Rules checked at every tier:
/// - the candidate lies within waking hours (wake..=bed)
/// - no other instance of the same item key already sits at that time
pub fn is_valid(
    candidate: NaiveDateTime,
    item: &ItemDefinition,
    placed: &[PlacedItem],
    anchors: &AnchorSet,
    tier: Strictness,
) -> bool {
    if candidate < anchors.wake() || candidate > anchors.bed() {
        return false;
    }

    if placed
        .iter()
        .any(|p| p.item.key == item.key && p.time == candidate)
    {
        return false;
    }

    let buffers = tier.buffers();

    if item.is_before_meal() {
        if !fits_before_meal(candidate, item, anchors, buffers.before_meal) {
            return false;
        }
    } else if item.has_conflict(ConflictTag::Meals) && near_meal(candidate, anchors, buffers.meal) {
        return false;
    }

    if buffers.untagged_items || item.has_conflict(ConflictTag::Supplements) {
        let crowded = placed
            .iter()
            .filter(|p| !(buffers.same_name_exempt && p.item.name == item.name))
            .any(|p| gap_minutes(candidate, p.time) < buffers.item);
        if crowded {
            return false;
        }
    }

    true
}

/// Before-meal items must land `band.0..=band.1` minutes ahead of their meal.
/// Without that meal on the day they are never valid.
fn fits_before_meal(
    candidate: NaiveDateTime,
    item: &ItemDefinition,
    anchors: &AnchorSet,
    band: (i64, i64),
) -> bool {
    match anchors.get(item.anchor) {
        Some(meal) => {
            let lead = minutes_between(candidate, meal);
            lead >= band.0 && lead <= band.1
        }
        None => false,
    }
}

fn near_meal(candidate: NaiveDateTime, anchors: &AnchorSet, buffer: i64) -> bool {
    anchors
        .meals()
        .iter()
        .any(|(_, meal)| gap_minutes(candidate, *meal) < buffer)
}
