//! # Regimen Core Library
//!
//! Daily time-slot allocation for supplements and activities. Every item in
//! a catalog is tied to an anchor event of the day (waking, a meal, study
//! hours, a workout, bedtime) and placed as close to its ideal time as the
//! spacing rules allow. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Settings**: TOML-backed user schedule, fasting and toggles
//! - **Anchors**: Resolution of the day's fixed events from settings
//! - **Catalog**: Item definitions with anchors, tolerances and conflict tags
//! - **Allocator**: Greedy per-day placement over a tiered search ladder
//! - **Planner**: Multi-week driver merging items with routine tasks
//!
//! ## Key Components
//!
//! - [`DayAllocator`]: Places one day's items
//! - [`Planner`]: Produces a dated schedule over several weeks
//! - [`Settings`]: User configuration
//! - [`Catalog`]: The set of items to schedule
//! - [`InteractionChecker`]: Post-placement report hook, with [`RuleBook`]
//!   as the bundled implementation

pub mod allocator;
pub mod anchors;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod fasting;
pub mod interactions;
pub mod placement;
pub mod planner;
pub mod routine;
pub mod settings;
pub mod validator;

pub use allocator::{DayAllocator, DayPlan, SearchStrategy};
pub use anchors::{Anchor, AnchorSet};
pub use catalog::{Catalog, ConflictTag, FastingAction, HighExertionRule, ItemDefinition, Timing};
pub use error::{ConfigError, CoreError, ValidationError};
pub use interactions::{Interaction, InteractionChecker, InteractionSeverity, RuleBook};
pub use placement::{DayType, PlacedItem, Severity, Warning};
pub use planner::{PlanOutput, Planner, Schedule, ScheduleEntry};
pub use routine::{RoutineSource, SettingsRoutines, TaskEntry};
pub use settings::{BreakfastMode, FastingLevel, FastingMode, Settings};
pub use validator::Strictness;
