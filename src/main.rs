use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use veggie_price::{Catalog, EstimationResult, Estimator, Matcher, Method, DEFAULT_THRESHOLD};

#[derive(Parser, Debug)]
#[command(name = "veggie-price", version, about = "Vegetable price lookup with fuzzy name matching")]
struct Cli {
    /// CSV catalog (Vegetable,Avg_Price,Predicted_Date) replacing the built-in table
    #[arg(long, env = "VEGGIE_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    /// Minimum similarity score (0-100) for a fuzzy match
    #[arg(long, env = "VEGGIE_MATCH_THRESHOLD", default_value_t = DEFAULT_THRESHOLD, global = true)]
    threshold: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog names in order
    Names,

    /// List prediction methods and their multipliers
    Methods,

    /// Resolve free text to a catalog name
    Match { query: String },

    /// Estimate the price of an exact catalog name
    Estimate {
        name: String,
        #[arg(long, short, default_value = "Linear Regression")]
        method: String,
    },

    /// Fuzzy-match a name, then estimate
    Predict {
        query: String,
        #[arg(long, short, default_value = "Linear Regression")]
        method: String,
    },

    /// Estimate an exact catalog name with every method
    Compare { name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_csv(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::builtin(),
    };

    let matcher = Matcher::with_threshold(cli.threshold)?;
    let estimator = Estimator::with_matcher(&catalog, matcher);

    match &cli.command {
        Command::Names => {
            let names = catalog.all_names();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }

        Command::Methods => {
            if cli.json {
                let table: Vec<_> = Method::ALL
                    .iter()
                    .map(|m| serde_json::json!({ "method": m.as_str(), "multiplier": m.multiplier() }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                for method in Method::ALL.iter() {
                    println!("{:<18} x{}", method.as_str(), method.multiplier());
                }
            }
        }

        Command::Match { query } => {
            let names = catalog.all_names();
            let best = matcher.score_best(query, &names);
            let matched = matcher.find(query, &names);

            if cli.json {
                let out = serde_json::json!({
                    "query": query,
                    "match": matched,
                    "position": matched.and_then(|n| catalog.position(n)),
                    "best": best,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                match (matched, best) {
                    (Some(name), Some(best)) => println!("{} (score {})", name, best.score),
                    (None, Some(best)) => println!(
                        "No match for '{}' (closest: {} at {})",
                        query, best.candidate, best.score
                    ),
                    _ => println!("No match for '{}'", query),
                }
            }
        }

        Command::Estimate { name, method } => {
            let result = estimator.estimate(method, name)?;
            print_result(&result, cli.json)?;
        }

        Command::Predict { query, method } => {
            let result = estimator.predict(query, method)?;
            print_result(&result, cli.json)?;
        }

        Command::Compare { name } => {
            let results = estimator.estimate_all_methods(name)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    println!("{}", result.summary());
                }
            }
        }
    }

    Ok(())
}

fn print_result(result: &EstimationResult, json: bool) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "result": result,
            "display_value": result.display_value(),
            "trend": result.display_trend(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", result.summary());
    for point in result.display_trend().points() {
        println!("  {:<9} {:.2}", point.label, point.value);
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
