//! Candidate-time search strategies.
//!
//! Every unplaced instance walks the same [`LADDER`], strictest first. Each
//! strategy yields candidate times in preference order and names the tier
//! they are validated at; the first candidate that validates wins.

use chrono::NaiveDateTime;

use crate::anchors::AnchorSet;
use crate::clock::{minutes_between, shift};
use crate::validator::Strictness;

/// Step between probes in the primary and widened searches.
pub const PROBE_STEP_MINUTES: i64 = 15;
/// Step of the whole-day scan.
pub const SCAN_STEP_MINUTES: i64 = 15;

const AROUND_BASE_HOURS: [i64; 3] = [1, 2, 3];
const SAFE_WAKE_OFFSETS: [i64; 6] = [120, 150, 180, 360, 390, 420];
const AFTER_MEAL_OFFSETS: [i64; 3] = [15, 20, 30];
const WIDENED_RADIUS_MINUTES: i64 = 240;
const WAKE_SWEEP_HOURS: i64 = 14;

/// One way of proposing candidate times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Base time, then outward in 15-minute steps within the tolerance window
    Probe,
    /// ±1h, ±2h, ±3h around the base time
    AroundBase,
    /// Midpoints of the gaps between meals, largest gap first
    MealGapMidpoints,
    /// Fixed offsets after waking
    SafeWakeOffsets,
    /// A few minutes after each meal
    AfterMeals,
    /// ±4h around the base time in 15-minute steps
    WidenedProbe,
    /// Hourly from one hour after waking
    WakeSweep,
    /// Every 15 minutes from wake to bed
    DayScan(Strictness),
}

/// Strategies applied, in order, to every instance during the main pass.
pub const LADDER: [SearchStrategy; 8] = [
    SearchStrategy::Probe,
    SearchStrategy::AroundBase,
    SearchStrategy::MealGapMidpoints,
    SearchStrategy::SafeWakeOffsets,
    SearchStrategy::AfterMeals,
    SearchStrategy::WidenedProbe,
    SearchStrategy::WakeSweep,
    SearchStrategy::DayScan(Strictness::VeryRelaxed),
];

/// Last resort, run after feeding-window deferrals are laid out.
pub const FINAL_PASS: SearchStrategy = SearchStrategy::DayScan(Strictness::ExactConflictOnly);

impl SearchStrategy {
    pub fn tier(self) -> Strictness {
        match self {
            SearchStrategy::Probe => Strictness::Strict,
            SearchStrategy::AroundBase
            | SearchStrategy::MealGapMidpoints
            | SearchStrategy::SafeWakeOffsets
            | SearchStrategy::AfterMeals => Strictness::Relaxed,
            SearchStrategy::WidenedProbe | SearchStrategy::WakeSweep => Strictness::VeryRelaxed,
            SearchStrategy::DayScan(tier) => tier,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchStrategy::Probe => "tolerance window",
            SearchStrategy::AroundBase => "hours around ideal time",
            SearchStrategy::MealGapMidpoints => "between-meal midpoint",
            SearchStrategy::SafeWakeOffsets => "safe offset from wake",
            SearchStrategy::AfterMeals => "after meal",
            SearchStrategy::WidenedProbe => "widened window",
            SearchStrategy::WakeSweep => "wake sweep",
            SearchStrategy::DayScan(_) => "full-day scan",
        }
    }

    /// Candidate times in preference order.
    pub fn candidates(
        self,
        base: NaiveDateTime,
        tolerance_minutes: i64,
        anchors: &AnchorSet,
    ) -> Vec<NaiveDateTime> {
        match self {
            SearchStrategy::Probe => probe(base, tolerance_minutes),
            SearchStrategy::AroundBase => AROUND_BASE_HOURS
                .iter()
                .flat_map(|h| [shift(base, -h * 60), shift(base, h * 60)])
                .collect(),
            SearchStrategy::MealGapMidpoints => meal_gap_midpoints(anchors),
            SearchStrategy::SafeWakeOffsets => SAFE_WAKE_OFFSETS
                .iter()
                .map(|m| shift(anchors.wake(), *m))
                .collect(),
            SearchStrategy::AfterMeals => anchors
                .meals()
                .iter()
                .flat_map(|(_, meal)| AFTER_MEAL_OFFSETS.iter().map(move |m| shift(*meal, *m)))
                .collect(),
            SearchStrategy::WidenedProbe => probe(base, WIDENED_RADIUS_MINUTES),
            SearchStrategy::WakeSweep => (1..=WAKE_SWEEP_HOURS)
                .map(|h| shift(anchors.wake(), h * 60))
                .collect(),
            SearchStrategy::DayScan(_) => day_scan(anchors),
        }
    }
}

/// `base`, then alternately earlier/later in steps up to `radius` minutes.
fn probe(base: NaiveDateTime, radius: i64) -> Vec<NaiveDateTime> {
    let mut out = vec![base];
    let mut delta = PROBE_STEP_MINUTES;
    while delta <= radius {
        out.push(shift(base, -delta));
        out.push(shift(base, delta));
        delta += PROBE_STEP_MINUTES;
    }
    out
}

fn meal_gap_midpoints(anchors: &AnchorSet) -> Vec<NaiveDateTime> {
    let meals = anchors.meals();
    let mut gaps: Vec<(i64, NaiveDateTime)> = meals
        .windows(2)
        .map(|pair| {
            let (start, end) = (pair[0].1, pair[1].1);
            let length = minutes_between(start, end);
            (length, shift(start, length / 2))
        })
        .collect();
    // Stable sort keeps earlier gaps first on ties.
    gaps.sort_by(|a, b| b.0.cmp(&a.0));
    gaps.into_iter().map(|(_, mid)| mid).collect()
}

fn day_scan(anchors: &AnchorSet) -> Vec<NaiveDateTime> {
    let mut out = Vec::new();
    let mut t = anchors.wake();
    while t <= anchors.bed() {
        out.push(t);
        t = shift(t, SCAN_STEP_MINUTES);
    }
    out
}
