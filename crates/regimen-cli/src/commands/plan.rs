use chrono::{Local, NaiveDate};
use clap::Args;
use regimen_core::{Catalog, PlanOutput, Planner, RuleBook, ScheduleEntry, Settings};
use std::path::PathBuf;

use crate::paths::settings_path;

#[derive(Args)]
pub struct PlanArgs {
    /// Settings file (defaults to the config directory)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Catalog TOML file (defaults to the built-in catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// First day of the plan, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Number of weeks to generate
    #[arg(long, default_value_t = 1)]
    weeks: u32,
    /// Skip the interaction report
    #[arg(long)]
    no_interactions: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default(&settings_path(args.settings.as_deref()))?;
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => Catalog::standard(),
    };
    let start = args.start.unwrap_or_else(|| Local::now().date_naive());

    let book = RuleBook::embedded();
    let mut planner = Planner::new(&catalog, &settings);
    if !args.no_interactions {
        planner = planner.with_checker(&book);
    }
    let output = planner.generate(start, args.weeks)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_plan(&output);
    }
    Ok(())
}

fn print_plan(output: &PlanOutput) {
    for (date, entries) in &output.schedule {
        println!("{date}");
        if entries.is_empty() {
            println!("  (nothing scheduled)");
        }
        for entry in entries {
            let time = entry.time().format("%H:%M");
            match entry {
                ScheduleEntry::Item(p) => {
                    let mut line = format!("  {time}  {}", p.item.name);
                    if !p.item.dose.is_empty() {
                        line.push_str(&format!("  ({})", p.item.dose));
                    }
                    if let Some(reason) = &p.shift_reason {
                        line.push_str(&format!("  [{reason}]"));
                    }
                    println!("{line}");
                }
                ScheduleEntry::Task(t) => println!("  {time}  {}  (routine)", t.name),
            }
        }
    }

    if !output.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &output.warnings {
            println!("  {warning}");
        }
    }

    let flagged: Vec<_> = output
        .interactions
        .iter()
        .flat_map(|(date, found)| found.iter().map(move |i| (date, i)))
        .filter(|(_, i)| !i.adequate)
        .collect();
    if !flagged.is_empty() {
        println!();
        println!("Interactions:");
        for (date, i) in flagged {
            println!(
                "  {date} {} / {}: {:.2}h apart, needs {:.1}h",
                i.first, i.second, i.gap_hours, i.required_hours
            );
        }
    }
}
