use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod aggregate;
mod bucket;
mod data;
mod error;
mod facets;
mod models;
mod report;

#[derive(Parser)]
#[command(name = "abm-report")]
#[command(about = "Aptitude and interest score explorer for the ABM survey", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List selectable provinces, or the cities/schools under a partial selection
    Options {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long, default_value = "filters.json")]
        filters: PathBuf,
        #[arg(long)]
        province: Vec<String>,
        #[arg(long)]
        city: Vec<String>,
    },
    /// Aptitude band distribution for a region selection
    Distribution {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        rules: Option<PathBuf>,
        #[arg(long, required = true)]
        province: Vec<String>,
        #[arg(long)]
        city: Vec<String>,
        #[arg(long)]
        school: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Top-N interest drill-down for a chosen aptitude facet and band
    Drill {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        rules: Option<PathBuf>,
        #[arg(long, required = true)]
        province: Vec<String>,
        #[arg(long)]
        city: Vec<String>,
        #[arg(long)]
        school: Vec<String>,
        #[arg(long)]
        facet: String,
        #[arg(long)]
        band: String,
        #[arg(long, default_value_t = report::DEFAULT_TOP_N)]
        top: usize,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        rules: Option<PathBuf>,
        #[arg(long, required = true)]
        province: Vec<String>,
        #[arg(long)]
        city: Vec<String>,
        #[arg(long)]
        school: Vec<String>,
        #[arg(long)]
        facet: Option<String>,
        #[arg(long, default_value_t = report::DEFAULT_TOP_N)]
        top: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Options {
            data,
            filters,
            province,
            city,
        } => {
            if province.is_empty() {
                let catalog = data::FilterCatalog::from_path(&filters).with_context(|| {
                    format!("failed to load filter catalog {}", filters.display())
                })?;
                println!("Selectable provinces:");
                for name in catalog.provinces {
                    println!("- {name}");
                }
                return Ok(());
            }
            let mut store = open_store(data)?;
            if city.is_empty() {
                let cities = store.available_cities(&province)?;
                if cities.is_empty() {
                    println!("No cities under this selection.");
                    return Ok(());
                }
                println!("Selectable cities:");
                for name in cities {
                    println!("- {name}");
                }
            } else {
                let schools = store.available_schools(&province, &city)?;
                if schools.is_empty() {
                    println!("No schools under this selection.");
                    return Ok(());
                }
                println!("Selectable schools:");
                for name in schools {
                    println!("- {name}");
                }
            }
        }
        Commands::Distribution {
            data,
            rules,
            province,
            city,
            school,
            json,
        } => {
            let mut store = open_store(data)?;
            let rules = load_rules(rules)?;
            let selection = models::Selection::new(province, city, school);
            let records = store.resolve(&selection)?;
            if records.is_empty() {
                println!("No records match this selection.");
                return Ok(());
            }
            let rows = aggregate::aggregate(
                &records,
                &facets::aptitude_keys(),
                &bucket::APTITUDE_STACK_ORDER,
                &rules,
            )?;
            if !json {
                println!("Distribusi kategori bakat for {}:", selection.describe());
            }
            emit_rows(&rows, json)?;
        }
        Commands::Drill {
            data,
            rules,
            province,
            city,
            school,
            facet,
            band,
            top,
            json,
        } => {
            let mut store = open_store(data)?;
            let rules = load_rules(rules)?;
            let band = bucket::parse_aptitude_band(&band)?;
            let selection = models::Selection::new(province, city, school);
            let records = store.resolve(&selection)?;
            let rows = aggregate::drill_down(
                &records,
                &facet,
                band,
                &facets::interest_keys(),
                &bucket::INTEREST_STACK_ORDER,
                bucket::MINAT,
                top,
                &rules,
            )?;
            if rows.is_empty() {
                println!(
                    "No records for '{}' in band '{band}'.",
                    facets::label_for(&facet)
                );
                return Ok(());
            }
            if !json {
                println!(
                    "Top {top} minat for '{}' in band '{band}':",
                    facets::label_for(&facet)
                );
            }
            emit_rows(&rows, json)?;
        }
        Commands::Report {
            data,
            rules,
            province,
            city,
            school,
            facet,
            top,
            out,
        } => {
            let mut store = open_store(data)?;
            let rules = load_rules(rules)?;
            let selection = models::Selection::new(province, city, school);
            let records = store.resolve(&selection)?;
            let report = report::build_report(&selection, &records, &rules, facet.as_deref(), top)?;
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn open_store(flag: Option<PathBuf>) -> anyhow::Result<data::DataStore> {
    let path = match flag {
        Some(path) => path,
        None => std::env::var("ABM_DATA")
            .map(PathBuf::from)
            .context("pass --data or set ABM_DATA to the dataset CSV")?,
    };
    Ok(data::DataStore::open(path))
}

fn load_rules(flag: Option<PathBuf>) -> anyhow::Result<bucket::AptitudeRules> {
    match flag {
        Some(path) => Ok(bucket::AptitudeRules::from_path(&path)
            .with_context(|| format!("failed to load aptitude rules {}", path.display()))?),
        None => Ok(bucket::AptitudeRules::default()),
    }
}

fn emit_rows(rows: &[models::BandShare], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }
    for row in rows {
        println!(
            "- {} [{}]: {} ({:.2}%)",
            facets::label_for(&row.facet),
            row.band,
            row.count,
            row.percentage
        );
    }
    Ok(())
}
