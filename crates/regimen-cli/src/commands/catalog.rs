use clap::Subcommand;
use regimen_core::Catalog;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List the built-in catalog in scheduling order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: CatalogAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CatalogAction::List { json } => {
            let catalog = Catalog::standard();
            if json {
                println!("{}", serde_json::to_string_pretty(catalog.items())?);
            } else {
                for item in catalog.items() {
                    let flag = if item.optional { " (optional)" } else { "" };
                    println!(
                        "{:<24} {:<14} {:>+5}m  ±{}m{flag}",
                        item.name,
                        item.anchor.to_string(),
                        item.offset_minutes,
                        item.tolerance_minutes
                    );
                }
            }
        }
    }
    Ok(())
}
