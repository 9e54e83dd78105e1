//! Day allocator.
//!
//! Places every enabled catalog instance for one calendar date:
//!
//! 1. Resolve anchors and the day type (workout days are high-exertion)
//! 2. Walk the catalog in order; classify each instance under fasting mode
//! 3. Run the search [`LADDER`] for each non-deferred instance
//! 4. Lay deferred instances out in the feeding window
//! 5. Give instances that are still unplaced one [`FINAL_PASS`]
//! 6. Sort by time and hand the result to the interaction checker
//!
//! Placement is greedy and order dependent: each accepted instance becomes
//! part of the conflict set for every instance after it.

pub mod strategy;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::anchors::{Anchor, AnchorSet};
use crate::catalog::{Catalog, ItemDefinition};
use crate::clock::{minutes_between, shift};
use crate::error::Result;
use crate::fasting::{FastingDecision, FastingPolicy};
use crate::interactions::{Interaction, InteractionChecker};
use crate::placement::{DayType, PlacedItem, Warning};
use crate::settings::Settings;
use crate::validator::{is_valid, Strictness};

pub use strategy::{SearchStrategy, FINAL_PASS, LADDER};

/// Result of allocating one day.
#[derive(Debug, Clone)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub anchors: AnchorSet,
    /// Placements, earliest first
    pub placed: Vec<PlacedItem>,
    pub warnings: Vec<Warning>,
    pub interactions: Vec<Interaction>,
}

/// An instance that found no slot during the main pass.
struct Pending {
    item: ItemDefinition,
    base: NaiveDateTime,
}

/// Allocates one day at a time from a fixed catalog and settings.
pub struct DayAllocator<'a> {
    catalog: &'a Catalog,
    settings: &'a Settings,
    checker: Option<&'a dyn InteractionChecker>,
}

impl<'a> DayAllocator<'a> {
    pub fn new(catalog: &'a Catalog, settings: &'a Settings) -> Self {
        Self {
            catalog,
            settings,
            checker: None,
        }
    }

    /// Attach an interaction checker consulted after placement.
    pub fn with_checker(mut self, checker: &'a dyn InteractionChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Allocate every enabled instance for `date`.
    ///
    /// Only configuration errors fail; unplaceable items become warnings.
    pub fn allocate(&self, date: NaiveDate) -> Result<DayPlan> {
        let anchors = AnchorSet::for_date(self.settings, date)?;
        let day_type = if anchors.contains(Anchor::Workout) {
            DayType::HighExertion
        } else {
            DayType::Normal
        };
        let fasting = FastingPolicy::for_date(self.settings, date)?;

        let mut placed: Vec<PlacedItem> = Vec::new();
        let mut warnings = Vec::new();
        let mut pending = Vec::new();
        let mut deferred = Vec::new();

        for definition in self.catalog.items() {
            if !Catalog::is_enabled(definition, self.settings) {
                continue;
            }

            let item = match day_type {
                DayType::HighExertion => definition.for_high_exertion(),
                DayType::Normal => definition.clone(),
            };

            if let Some(policy) = &fasting {
                match policy.classify(&item, &anchors) {
                    FastingDecision::Allow => {}
                    FastingDecision::Skip(reason) => {
                        debug!(%date, item = %item.name, %reason, "skipped for fasting");
                        continue;
                    }
                    FastingDecision::Defer => {
                        deferred.push(item);
                        continue;
                    }
                }
            }

            let Some(base) = base_time(&item, &anchors) else {
                warn!(%date, item = %item.name, anchor = %item.anchor, "anchor absent today");
                warnings.push(unplaced(date, &item, format!("no {} today", item.anchor)));
                continue;
            };

            let bonus = match day_type {
                DayType::HighExertion => bonus_instance(&item, &anchors),
                DayType::Normal => None,
            };

            match search(&item, base, &placed, &anchors, &LADDER) {
                Some((time, strategy)) => {
                    placed.push(accept(item, date, day_type, base, time, strategy, &mut warnings));
                    if let Some((bonus_item, bonus_time)) = bonus {
                        place_bonus(bonus_item, bonus_time, date, &anchors, &mut placed);
                    }
                }
                None => pending.push(Pending { item, base }),
            }
        }

        if let Some(policy) = &fasting {
            let (laid_out, dropped) = policy.lay_out(deferred, date, day_type);
            placed.extend(laid_out);
            warnings.extend(dropped);
        }

        for Pending { item, base } in pending {
            match search(&item, base, &placed, &anchors, &[FINAL_PASS]) {
                Some((time, strategy)) => {
                    placed.push(accept(item, date, day_type, base, time, strategy, &mut warnings));
                }
                None => {
                    warn!(%date, item = %item.name, optional = item.optional, "no valid slot");
                    warnings.push(unplaced(date, &item, "no valid slot after every fallback tier"));
                }
            }
        }

        placed.sort_by_key(|p| p.time);

        let interactions = self.check_interactions(date, &placed);

        info!(
            %date,
            placed = placed.len(),
            warnings = warnings.len(),
            interactions = interactions.len(),
            "day allocated"
        );

        Ok(DayPlan {
            date,
            day_type,
            anchors,
            placed,
            warnings,
            interactions,
        })
    }

    /// Checker failures never affect placements.
    fn check_interactions(&self, date: NaiveDate, placed: &[PlacedItem]) -> Vec<Interaction> {
        let Some(checker) = self.checker else {
            return Vec::new();
        };
        let pairs: Vec<(String, NaiveDateTime)> = placed
            .iter()
            .map(|p| (p.item.name.clone(), p.time))
            .collect();
        match checker.check(date, &pairs) {
            Ok(found) => found,
            Err(e) => {
                warn!(%date, error = %e, "interaction check failed; placements kept");
                Vec::new()
            }
        }
    }
}

/// Omitted instances are errors when required and warnings when optional.
fn unplaced(date: NaiveDate, item: &ItemDefinition, reason: impl Into<String>) -> Warning {
    if item.optional {
        Warning::warning(date, &item.name, reason)
    } else {
        Warning::error(date, &item.name, reason)
    }
}

/// Ideal time: anchor + offset, using the fallback anchor when the primary
/// one is absent. Before-meal items have no fallback.
fn base_time(item: &ItemDefinition, anchors: &AnchorSet) -> Option<NaiveDateTime> {
    let anchor_time = anchors.get(item.anchor).or_else(|| {
        if item.is_before_meal() {
            None
        } else {
            item.fallback_anchor.and_then(|a| anchors.get(a))
        }
    })?;
    Some(shift(anchor_time, item.offset_minutes))
}

/// First candidate accepted by any strategy, in order.
fn search(
    item: &ItemDefinition,
    base: NaiveDateTime,
    placed: &[PlacedItem],
    anchors: &AnchorSet,
    strategies: &[SearchStrategy],
) -> Option<(NaiveDateTime, SearchStrategy)> {
    strategies.iter().find_map(|strategy| {
        strategy
            .candidates(base, item.tolerance_minutes, anchors)
            .into_iter()
            .find(|t| is_valid(*t, item, placed, anchors, strategy.tier()))
            .map(|t| (t, *strategy))
    })
}

/// Build the placement, flagging anything that moved or needed a looser tier.
fn accept(
    item: ItemDefinition,
    date: NaiveDate,
    day_type: DayType,
    base: NaiveDateTime,
    time: NaiveDateTime,
    strategy: SearchStrategy,
    warnings: &mut Vec<Warning>,
) -> PlacedItem {
    let tier = strategy.tier();
    let name = item.name.clone();
    let placement = PlacedItem::new(item, date, time, day_type, Some(tier));

    if tier.is_relaxed() {
        let reason = format!("placed under {tier} constraints ({})", strategy.label());
        debug!(%date, item = %name, %time, %reason, "relaxed placement");
        warnings.push(Warning::warning(date, &name, reason.clone()));
        placement.with_shift(reason)
    } else if time != base {
        let moved = minutes_between(base, time);
        debug!(%date, item = %name, %time, moved, "shifted within tolerance");
        placement.with_shift(format!("moved {moved:+} min within tolerance window"))
    } else {
        debug!(%date, item = %name, %time, "placed at ideal time");
        placement
    }
}

/// Extra instance after the workout for items with a high-exertion rule.
fn bonus_instance(
    item: &ItemDefinition,
    anchors: &AnchorSet,
) -> Option<(ItemDefinition, NaiveDateTime)> {
    let minutes = item.high_exertion.as_ref()?.bonus_after_workout_minutes?;
    let workout = anchors.get(Anchor::Workout)?;

    let mut bonus = item.clone();
    bonus.anchor = Anchor::Workout;
    bonus.offset_minutes = minutes;
    bonus.fallback_anchor = None;
    bonus.high_exertion = None;
    Some((bonus, shift(workout, minutes)))
}

/// Bonus instances are strict-only and silently dropped when they don't fit.
fn place_bonus(
    item: ItemDefinition,
    time: NaiveDateTime,
    date: NaiveDate,
    anchors: &AnchorSet,
    placed: &mut Vec<PlacedItem>,
) {
    if is_valid(time, &item, placed, anchors, Strictness::Strict) {
        debug!(%date, item = %item.name, %time, "high-exertion bonus placed");
        placed.push(PlacedItem::new(
            item,
            date,
            time,
            DayType::HighExertion,
            Some(Strictness::Strict),
        ));
    } else {
        debug!(%date, item = %item.name, %time, "high-exertion bonus skipped");
    }
}
