//! Integration tests for day allocation and multi-week planning.
//!
//! These run the standard catalog through the public API the way the CLI
//! does: settings in, dated schedule out.

use chrono::{NaiveDate, NaiveDateTime};
use indoc::indoc;
use regimen_core::fasting::DEFERRAL_REASON;
use regimen_core::settings::RoutineTask;
use regimen_core::{
    BreakfastMode, Catalog, DayAllocator, DayPlan, FastingLevel, FastingMode, Planner, RuleBook,
    Settings, Severity,
};

// 2024-03-04 is a Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_hms_opt(h, m, 0).unwrap()
}

fn allocate(settings: &Settings, date: NaiveDate) -> DayPlan {
    let catalog = Catalog::standard();
    DayAllocator::new(&catalog, settings).allocate(date).unwrap()
}

fn times_of(plan: &DayPlan, key: &str) -> Vec<NaiveDateTime> {
    plan.placed
        .iter()
        .filter(|p| p.item.key == key)
        .map(|p| p.time)
        .collect()
}

fn fasting(level: FastingLevel) -> Settings {
    let mut settings = Settings::default();
    settings.fasting.mode = FastingMode::On;
    settings.fasting.level = level;
    settings
}

#[test]
fn test_standard_day_places_required_items() {
    let plan = allocate(&Settings::default(), monday());

    for key in ["electrolytes", "vitamin_d", "omega3", "multivitamin", "creatine"] {
        assert!(!times_of(&plan, key).is_empty(), "{key} missing");
    }
    assert!(plan.warnings.iter().all(|w| w.severity != Severity::Error));
    assert!(plan.placed.windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn test_before_dinner_vinegar_without_breakfast() {
    let settings = Settings {
        wake_time: "07:30".to_string(),
        breakfast_mode: BreakfastMode::Skip,
        dinner_time: "18:30".to_string(),
        ..Settings::default()
    };
    let plan = allocate(&settings, monday());

    // Lunch falls back to 12:00 without breakfast.
    let acv = times_of(&plan, "acv");
    assert_eq!(acv, vec![at(monday(), 11, 40), at(monday(), 18, 10)]);
}

#[test]
fn test_optional_toggle_removes_every_instance() {
    let mut settings = Settings::default();
    settings.optional_items.insert("acv".to_string(), false);
    let plan = allocate(&settings, monday());
    assert!(times_of(&plan, "acv").is_empty());
    assert!(!times_of(&plan, "zinc").is_empty());
}

#[test]
fn test_workout_day_doubles_electrolytes() {
    let settings = Settings::default();
    let plan = allocate(&settings, monday());
    assert_eq!(
        times_of(&plan, "electrolytes"),
        vec![at(monday(), 7, 15), at(monday(), 18, 0)]
    );

    // Tuesday is a rest day by default.
    let tuesday = monday().succ_opt().unwrap();
    let rest = allocate(&settings, tuesday);
    assert_eq!(times_of(&rest, "electrolytes"), vec![at(tuesday, 7, 15)]);
    assert!(rest
        .placed
        .iter()
        .all(|p| p.item.dose != "2 scoops (1000 mg sodium)"));
}

#[test]
fn test_strict_fasting_drops_deferrable_items() {
    let plan = allocate(&fasting(FastingLevel::Strict), monday());

    for key in ["iron", "multivitamin", "fiber"] {
        assert!(times_of(&plan, key).is_empty(), "{key} should be skipped");
    }
    // Breakfast at 08:00 sits outside the 12:00-20:00 window.
    assert!(times_of(&plan, "vitamin_d").is_empty());
    assert!(!times_of(&plan, "omega3").is_empty());
}

#[test]
fn test_fasting_skips_meal_bound_item_without_its_meal() {
    let mut settings = fasting(FastingLevel::Light);
    settings.breakfast_mode = BreakfastMode::Skip;
    let plan = allocate(&settings, monday());

    // Lunch at 12:00 is inside the window, but vitamin D is bound to breakfast.
    assert!(times_of(&plan, "vitamin_d").is_empty());
    assert!(plan.warnings.iter().all(|w| w.item_name != "Vitamin D3 + K2"));
    assert_eq!(times_of(&plan, "omega3"), vec![at(monday(), 12, 0)]);
}

#[test]
fn test_light_fasting_defers_into_window() {
    let settings = fasting(FastingLevel::Light);
    let plan = allocate(&settings, monday());

    let deferred: Vec<_> = plan
        .placed
        .iter()
        .filter(|p| p.shift_reason.as_deref() == Some(DEFERRAL_REASON))
        .collect();
    let keys: Vec<_> = deferred.iter().map(|p| p.item.key.as_str()).collect();
    assert_eq!(keys, vec!["iron", "multivitamin", "fiber"]);

    let times: Vec<_> = deferred.iter().map(|p| p.time).collect();
    assert_eq!(
        times,
        vec![at(monday(), 12, 15), at(monday(), 13, 15), at(monday(), 14, 15)]
    );
    assert!(deferred.iter().all(|p| p.shifted && p.tier.is_none()));
}

#[test]
fn test_interactions_reported_with_rule_book() {
    let settings = Settings::default();
    let catalog = Catalog::standard();
    let book = RuleBook::embedded();
    let plan = DayAllocator::new(&catalog, &settings)
        .with_checker(&book)
        .allocate(monday())
        .unwrap();

    assert!(!plan.interactions.is_empty());
    assert!(plan
        .interactions
        .iter()
        .any(|i| i.first.contains("Iron") || i.second.contains("Iron")));
}

#[test]
fn test_multi_week_plan_with_routines() {
    let settings = Settings {
        routines: vec![RoutineTask {
            name: "Stretch".to_string(),
            time: "21:30".to_string(),
            days: [true, false, true, false, true, false, false],
            notes: Some("10 minutes".to_string()),
        }],
        ..Settings::default()
    };
    let catalog = Catalog::standard();
    let out = Planner::new(&catalog, &settings).generate(monday(), 2).unwrap();

    assert_eq!(out.schedule.len(), 14);
    let stretch_days = out
        .schedule
        .values()
        .filter(|day| day.iter().any(|e| e.name() == "Stretch"))
        .count();
    assert_eq!(stretch_days, 6);

    // Independent days: the same weekday allocates identically.
    let times = |key: &str| -> Vec<String> {
        out.schedule[key]
            .iter()
            .map(|e| format!("{} {}", e.time().format("%H:%M"), e.name()))
            .collect()
    };
    assert_eq!(times("2024-03-04"), times("2024-03-11"));
}

#[test]
fn test_settings_file_drives_plan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        indoc! {r#"
            wake_time = "6:30 AM"
            bed_time = "22:30"
            breakfast_mode = "sometimes"
            breakfast_days = [true, true, true, true, true, false, false]
            supplements_enabled = true

            [optional_items]
            theanine = false
        "#},
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    let catalog = Catalog::standard();
    let out = Planner::new(&catalog, &settings).generate(monday(), 1).unwrap();

    let monday_items: Vec<_> = out.schedule["2024-03-04"]
        .iter()
        .filter_map(|e| e.as_item())
        .collect();
    assert!(monday_items.iter().all(|p| p.item.key != "theanine"));
    assert!(monday_items
        .iter()
        .all(|p| p.time >= at(monday(), 6, 30) && p.time <= at(monday(), 22, 30)));

    // Saturday has no breakfast, so vitamin D moves to its lunch fallback.
    let saturday = &out.schedule["2024-03-09"];
    let vitamin_d = saturday
        .iter()
        .filter_map(|e| e.as_item())
        .find(|p| p.item.key == "vitamin_d")
        .unwrap();
    assert_eq!(vitamin_d.time, at(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), 12, 0));
}

#[test]
fn test_custom_catalog_from_toml() {
    let catalog = Catalog::from_toml_str(indoc! {r#"
        [[items]]
        key = "water"
        name = "Water"
        anchor = "wake"
        offset_minutes = 0

        [[items]]
        key = "tea"
        name = "Green Tea"
        anchor = "study_start"
        offset_minutes = 30
        conflicts = ["meals"]
    "#})
    .unwrap();
    let settings = Settings::default();
    let plan = DayAllocator::new(&catalog, &settings).allocate(monday()).unwrap();

    assert_eq!(times_of(&plan, "water"), vec![at(monday(), 7, 0)]);
    assert_eq!(times_of(&plan, "tea"), vec![at(monday(), 9, 30)]);
}
