//! Prize wheel server and maintenance commands

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use prize_ledger::{SqliteLedger, SubmissionFilter, SubmissionLedger};
use prize_server::config::{database_url, load_catalog, Cli, Command};
use prize_server::{app, AppState, Ledger};
use prize_wheel::{Catalog, PrizeSelector, WheelLayout};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            bind,
            database,
            webhook_url,
            catalog,
        } => {
            // Initialize tracing
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "prize_server=info,tower_http=debug".into()),
                )
                .with(tracing_subscriber::fmt::layer())
                .init();

            let catalog = load_catalog(catalog.as_deref()).context("Invalid prize catalog")?;
            tracing::info!(
                prizes = catalog.len(),
                total_weight = catalog.total_weight(),
                "Catalog loaded"
            );

            let ledger = match webhook_url {
                Some(url) => {
                    tracing::info!("Logging submissions to webhook: {}", url);
                    Ledger::webhook(url).await?
                }
                None => {
                    let db_url = database_url(&database);
                    if !database.contains(':') {
                        if let Some(parent) = Path::new(&database).parent() {
                            if !parent.as_os_str().is_empty() {
                                std::fs::create_dir_all(parent).with_context(|| {
                                    format!("Failed to create {}", parent.display())
                                })?;
                            }
                        }
                    }
                    tracing::info!("Connecting to database: {}", db_url);
                    Ledger::sqlite(&db_url).await?
                }
            };
            tracing::info!("Ledger initialized");

            let state = Arc::new(AppState::new(PrizeSelector::new(catalog), ledger));
            let app = app(state);

            let bind_addr = format!("{}:{}", bind, port);
            tracing::info!("Starting server on {}", bind_addr);
            tracing::info!("OpenAPI document at /openapi.json");
            tracing::info!("Interactive docs at /scalar");

            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            axum::serve(listener, app).await?;
        }

        Command::Simulate {
            draws,
            seed,
            catalog,
        } => {
            let catalog = load_catalog(catalog.as_deref()).context("Invalid prize catalog")?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            simulate(PrizeSelector::new(catalog), draws, &mut rng);
        }

        Command::Catalog { catalog } => {
            let catalog = load_catalog(catalog.as_deref()).context("Invalid prize catalog")?;
            print_catalog(&catalog);
        }

        Command::Submissions {
            database,
            prize,
            limit,
            json,
        } => {
            let db = SqliteLedger::open(&database)
                .with_context(|| format!("Failed to open {}", database.display()))?;
            db.init()?;

            let filter = SubmissionFilter {
                prize,
                limit: Some(limit),
                offset: None,
            };
            let records = db.list(&filter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No submissions recorded");
            } else {
                println!(
                    "{:>5}  {:<20}  {:<24}  {:<28}  {:<6}",
                    "ID", "Recorded", "Name", "Prize", "Code"
                );
                for r in &records {
                    let s = &r.submission;
                    println!(
                        "{:>5}  {:<20}  {:<24}  {:<28}  {:<6}",
                        r.id,
                        s.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                        truncate(&s.registrant.name, 24),
                        truncate(&s.prize, 28),
                        s.code
                    );
                }
                let stats = db.stats()?;
                println!("\n{} of {} submissions shown", records.len(), stats.total);
            }
        }
    }

    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let head: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Draw `draws` times and print observed against expected frequency
fn simulate(selector: PrizeSelector, draws: u32, rng: &mut StdRng) {
    let catalog = selector.catalog();
    let mut counts = vec![0u64; catalog.len()];
    for _ in 0..draws {
        counts[selector.draw_index(rng)] += 1;
    }

    println!(
        "{:<44}  {:>9}  {:>9}  {:>9}",
        "Prize", "Expected", "Observed", "Count"
    );
    let mut chi_square = 0.0;
    for (i, category) in catalog.categories().iter().enumerate() {
        let p = catalog.probability(i).unwrap_or_default();
        let expected = p * f64::from(draws);
        let observed = counts[i] as f64;
        if expected > 0.0 {
            chi_square += (observed - expected).powi(2) / expected;
        }
        println!(
            "{:<44}  {:>8.2}%  {:>8.2}%  {:>9}",
            truncate(&category.label, 44),
            p * 100.0,
            observed / f64::from(draws.max(1)) * 100.0,
            counts[i]
        );
    }
    println!(
        "\n{} draws, chi-square {:.3} with {} degrees of freedom",
        draws,
        chi_square,
        catalog.len().saturating_sub(1)
    );
}

fn print_catalog(catalog: &Catalog) {
    let layout = WheelLayout::new(catalog);

    println!("Prizes (total weight {}):", catalog.total_weight());
    for (i, category) in catalog.categories().iter().enumerate() {
        let segments = layout
            .segment_pair(i)
            .map(|[a, b]| format!("{}, {}", a, b))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{}] {:<44} weight {:>6}  p={:.4}  segments {}",
            category.id,
            category.label,
            category.weight,
            catalog.probability(i).unwrap_or_default(),
            segments
        );
    }

    println!(
        "\nWheel: {} segments of {:.1} deg, at least {} revolutions",
        layout.len(),
        layout.segment_angle(),
        layout.min_revolutions()
    );
    for segment in layout.segments() {
        println!(
            "  {:>2}  {:>6.1} deg  {:>5.1}%-{:>5.1}%  {} on {}  {}",
            segment.index,
            segment.angle,
            segment.gradient_start,
            segment.gradient_end,
            segment.text_color,
            segment.color,
            segment.label
        );
    }
}
