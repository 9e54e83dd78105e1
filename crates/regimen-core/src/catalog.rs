//! Schedulable item definitions.
//!
//! A catalog is an ordered list of [`ItemDefinition`]s. Order matters: the
//! allocator walks the catalog front to back and every placement narrows the
//! space left for the items after it.
//!
//! One item may appear several times with different anchors or offsets
//! (for example a before-meal item taken before both lunch and dinner).
//! Each appearance is an independent instance identified by
//! [`InstanceId`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::anchors::Anchor;
use crate::error::{ConfigError, Result, ValidationError};
use crate::settings::Settings;

/// Spacing rule category checked by the slot validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictTag {
    /// Keep away from meal anchors
    Meals,
    /// Keep away from other placed items
    Supplements,
}

/// How an item's time relates to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Anchor + offset, shifted within the tolerance window if needed
    #[default]
    Anchored,
    /// Must sit inside a short band immediately before its meal anchor
    BeforeMeal,
}

/// Policy applied to an item when fasting mode is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FastingAction {
    #[default]
    Allow,
    Skip,
    Defer,
    /// Allowed only when the bound meal happens inside the feeding window
    MealDependent,
}

/// Adjustments applied on high-exertion (workout) days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighExertionRule {
    /// Dose used instead of the regular dose
    #[serde(default)]
    pub dose: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Extra instance this many minutes after the workout anchor
    #[serde(default)]
    pub bonus_after_workout_minutes: Option<i64>,
}

/// A schedulable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Toggle key shared by every instance of this item
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub anchor: Anchor,
    /// Used when `anchor` is absent on a given day
    #[serde(default)]
    pub fallback_anchor: Option<Anchor>,
    #[serde(default)]
    pub offset_minutes: i64,
    #[serde(default = "default_tolerance")]
    pub tolerance_minutes: i64,
    #[serde(default)]
    pub conflicts: Vec<ConflictTag>,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub fasting: FastingAction,
    #[serde(default)]
    pub high_exertion: Option<HighExertionRule>,
}

fn default_tolerance() -> i64 {
    30
}
fn default_true() -> bool {
    true
}

/// Identity of one catalog instance: key plus anchor/offset pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId {
    pub key: String,
    pub anchor: Anchor,
    pub offset_minutes: i64,
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}{:+}m", self.key, self.anchor, self.offset_minutes)
    }
}

impl ItemDefinition {
    /// Create an anchored, required, always-allowed item.
    pub fn new(key: &str, name: &str, anchor: Anchor, offset_minutes: i64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            dose: String::new(),
            notes: None,
            anchor,
            fallback_anchor: None,
            offset_minutes,
            tolerance_minutes: default_tolerance(),
            conflicts: Vec::new(),
            timing: Timing::Anchored,
            enabled: true,
            optional: false,
            fasting: FastingAction::Allow,
            high_exertion: None,
        }
    }

    pub fn with_dose(mut self, dose: &str) -> Self {
        self.dose = dose.to_string();
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn with_tolerance(mut self, minutes: i64) -> Self {
        self.tolerance_minutes = minutes;
        self
    }

    pub fn with_conflicts(mut self, tags: &[ConflictTag]) -> Self {
        self.conflicts = tags.to_vec();
        self
    }

    pub fn with_fallback_anchor(mut self, anchor: Anchor) -> Self {
        self.fallback_anchor = Some(anchor);
        self
    }

    pub fn with_fasting(mut self, action: FastingAction) -> Self {
        self.fasting = action;
        self
    }

    pub fn with_high_exertion(mut self, rule: HighExertionRule) -> Self {
        self.high_exertion = Some(rule);
        self
    }

    pub fn before_meal(mut self) -> Self {
        self.timing = Timing::BeforeMeal;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn has_conflict(&self, tag: ConflictTag) -> bool {
        self.conflicts.contains(&tag)
    }

    pub fn is_before_meal(&self) -> bool {
        self.timing == Timing::BeforeMeal
    }

    pub fn instance_id(&self) -> InstanceId {
        InstanceId {
            key: self.key.clone(),
            anchor: self.anchor,
            offset_minutes: self.offset_minutes,
        }
    }

    /// Copy of this definition with the high-exertion dose applied.
    ///
    /// The catalog entry itself is never modified.
    pub fn for_high_exertion(&self) -> ItemDefinition {
        let mut copy = self.clone();
        if let Some(rule) = &self.high_exertion {
            if let Some(dose) = &rule.dose {
                copy.dose = dose.clone();
            }
            if let Some(notes) = &rule.notes {
                copy.notes = Some(notes.clone());
            }
        }
        copy
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.key.trim().is_empty() || self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "items.key".to_string(),
                message: "item key and name must not be empty".to_string(),
            });
        }
        if self.tolerance_minutes < 0 {
            return Err(ConfigError::InvalidValue {
                key: format!("items.{}.tolerance_minutes", self.key),
                message: "must not be negative".to_string(),
            });
        }
        if self.is_before_meal() && !self.anchor.is_meal() {
            return Err(ConfigError::InvalidValue {
                key: format!("items.{}.anchor", self.key),
                message: format!("before-meal items need a meal anchor, got '{}'", self.anchor),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<ItemDefinition>,
}

/// Ordered, immutable list of item definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    items: Vec<ItemDefinition>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate instances and invalid items.
    pub fn new(items: Vec<ItemDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for item in &items {
            item.validate()?;
            let id = item.instance_id();
            if !seen.insert(id.clone()) {
                return Err(ValidationError::InvalidValue {
                    field: "items".to_string(),
                    message: format!("duplicate instance {id}"),
                }
                .into());
            }
        }
        Ok(Self { items })
    }

    /// Parse a catalog from TOML (`[[items]]` tables).
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(input)?;
        if file.items.is_empty() {
            return Err(ValidationError::EmptyCollection("items".to_string()).into());
        }
        Self::new(file.items)
    }

    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `item` should be scheduled under `settings`.
    ///
    /// Disabled items never are. Optional items additionally honour the
    /// toggle map in settings.
    pub fn is_enabled(item: &ItemDefinition, settings: &Settings) -> bool {
        item.enabled && (!item.optional || settings.optional_enabled(&item.key))
    }

    /// The default daily stack.
    pub fn standard() -> Self {
        use ConflictTag::{Meals, Supplements};

        let items = vec![
            ItemDefinition::new("electrolytes", "Electrolytes", Anchor::Wake, 15)
                .with_dose("1 scoop (500 mg sodium)")
                .with_notes("Mix into 500 ml water")
                .with_conflicts(&[Supplements])
                .with_high_exertion(HighExertionRule {
                    dose: Some("2 scoops (1000 mg sodium)".to_string()),
                    notes: Some("Sweat day: double dose".to_string()),
                    bonus_after_workout_minutes: Some(30),
                }),
            ItemDefinition::new("probiotic", "Probiotic", Anchor::Wake, 30)
                .with_dose("1 capsule")
                .with_notes("Empty stomach")
                .with_tolerance(45)
                .with_conflicts(&[Meals])
                .optional(),
            ItemDefinition::new("vitamin_d", "Vitamin D3 + K2", Anchor::Breakfast, 0)
                .with_dose("2000 IU")
                .with_notes("Take with fat-containing food")
                .with_fallback_anchor(Anchor::Lunch)
                .with_tolerance(45)
                .with_fasting(FastingAction::MealDependent),
            ItemDefinition::new("theanine", "L-Theanine", Anchor::StudyStart, 0)
                .with_dose("200 mg")
                .with_conflicts(&[Supplements])
                .optional(),
            ItemDefinition::new("iron", "Iron Bisglycinate", Anchor::StudyStart, 90)
                .with_dose("25 mg")
                .with_notes("Away from food and calcium")
                .with_tolerance(60)
                .with_conflicts(&[Meals, Supplements])
                .with_fasting(FastingAction::Defer)
                .optional(),
            ItemDefinition::new("acv", "Apple Cider Vinegar", Anchor::Lunch, -20)
                .with_dose("1 tbsp in water")
                .with_notes("Drink just before the meal")
                .with_tolerance(10)
                .before_meal()
                .with_fasting(FastingAction::MealDependent)
                .optional(),
            ItemDefinition::new("omega3", "Omega-3", Anchor::Lunch, 0)
                .with_dose("2 softgels")
                .with_tolerance(60)
                .with_fasting(FastingAction::MealDependent),
            ItemDefinition::new("multivitamin", "Multivitamin", Anchor::Lunch, 15)
                .with_dose("1 tablet")
                .with_tolerance(60)
                .with_fasting(FastingAction::Defer),
            ItemDefinition::new("creatine", "Creatine", Anchor::Workout, -60)
                .with_dose("5 g")
                .with_fallback_anchor(Anchor::StudyEnd)
                .with_tolerance(60),
            ItemDefinition::new("fiber", "Psyllium Husk", Anchor::StudyEnd, 30)
                .with_dose("5 g in 300 ml water")
                .with_tolerance(45)
                .with_conflicts(&[Meals, Supplements])
                .with_fasting(FastingAction::Defer)
                .optional(),
            ItemDefinition::new("acv", "Apple Cider Vinegar", Anchor::Dinner, -20)
                .with_dose("1 tbsp in water")
                .with_notes("Drink just before the meal")
                .with_tolerance(10)
                .before_meal()
                .with_fasting(FastingAction::MealDependent)
                .optional(),
            ItemDefinition::new("zinc", "Zinc", Anchor::Dinner, 10)
                .with_dose("15 mg")
                .with_tolerance(30)
                .with_fasting(FastingAction::MealDependent)
                .optional(),
            ItemDefinition::new("magnesium", "Magnesium Glycinate", Anchor::Bed, -60)
                .with_dose("400 mg")
                .with_tolerance(60)
                .with_conflicts(&[Meals, Supplements])
                .optional(),
        ];

        Self { items }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
