use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use crop_model::{load_classifier, ClassifierLoad};
use pipeline::FALLBACK_CROPS;
use rand::Rng;
use serde_json::{json, Map, Value};
use server::{AdvisorConfig, AdvisoryOrchestrator};
use soil_data::{AdvisoryReport, NarrativeStatus, RankingSource, FEATURE_COLUMNS};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// Crop Advisor - soil-based crop recommendations with an advisory report
#[derive(Parser)]
#[command(name = "crop-advisor")]
#[command(about = "Recommend crops from a soil test and write an advisory report", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Classifier artifact (overrides the configuration file)
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Generative text model (overrides the configuration file)
    #[arg(long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis for one soil test
    Analyze {
        #[command(flatten)]
        soil: SoilArgs,

        /// Print the JSON response envelope instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Print the advisory prompt without calling the text service
    Prompt {
        #[command(flatten)]
        soil: SoilArgs,
    },

    /// Show the classifier artifact status
    Model,

    /// Run benchmark to test ranking performance
    Benchmark {
        /// Number of soil samples to rank
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

/// Soil test values; omitted values take the pipeline defaults
#[derive(Args)]
struct SoilArgs {
    /// Farm location
    #[arg(long)]
    location: Option<String>,

    /// Nitrogen (kg/ha)
    #[arg(long)]
    n: Option<f64>,

    /// Phosphorus (kg/ha)
    #[arg(long)]
    p: Option<f64>,

    /// Potassium (kg/ha)
    #[arg(long)]
    k: Option<f64>,

    /// Soil pH
    #[arg(long)]
    ph: Option<f64>,
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied
    fn resolve_config(&self) -> Result<AdvisorConfig> {
        let mut config = AdvisorConfig::load_or_default(self.config.as_deref())?;
        if let Some(model_path) = &self.model_path {
            config.model_path = model_path.clone();
        }
        if let Some(model) = &self.model {
            config.generative.model = model.clone();
        }

        info!(
            "Using classifier {} and text model {}",
            config.model_path.display(),
            config.generative.model
        );
        Ok(config)
    }
}

impl SoilArgs {
    /// Request body with only the values given on the command line
    fn to_request(&self) -> Value {
        let mut body = Map::new();
        if let Some(location) = &self.location {
            body.insert("location".to_string(), json!(location));
        }
        for (key, value) in [("n", self.n), ("p", self.p), ("k", self.k), ("ph", self.ph)] {
            if let Some(value) = value {
                body.insert(key.to_string(), json!(value));
            }
        }
        Value::Object(body)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Analyze { soil, json } => handle_analyze(&config, &soil, json).await?,
        Commands::Prompt { soil } => handle_prompt(&config, &soil).await?,
        Commands::Model => handle_model(&config)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(&config, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'analyze' command
async fn handle_analyze(config: &AdvisorConfig, soil: &SoilArgs, json: bool) -> Result<()> {
    let orchestrator = AdvisoryOrchestrator::from_config(config)?;
    let request = soil.to_request();

    if json {
        let response = orchestrator.analyze_response(&request).await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        if !response.is_success() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let start = Instant::now();
    let report = orchestrator.analyze(&request).await?;
    print_report(&report);
    println!("\n{} Analyzed in {:.2?}", "✓".green(), start.elapsed());
    Ok(())
}

/// Handle the 'prompt' command
async fn handle_prompt(config: &AdvisorConfig, soil: &SoilArgs) -> Result<()> {
    let orchestrator = AdvisoryOrchestrator::from_config(config)?;
    let prompt = orchestrator.preview_prompt(&soil.to_request()).await?;
    println!("{}", prompt);
    Ok(())
}

/// Handle the 'model' command
fn handle_model(config: &AdvisorConfig) -> Result<()> {
    let load = load_classifier(&config.model_path, &FEATURE_COLUMNS).with_context(|| {
        format!(
            "Failed to load classifier from {}",
            config.model_path.display()
        )
    })?;

    println!(
        "{}",
        format!("Classifier artifact: {}", config.model_path.display())
            .bold()
            .blue()
    );
    println!("{}Feature columns: {}", "• ".cyan(), FEATURE_COLUMNS.join(", "));

    match load {
        ClassifierLoad::Ready(classifier) => {
            println!("{}Status: {}", "• ".green(), "ready".green());
            println!("{}Kind: {}", "• ".green(), classifier.kind());
            println!("{}Classes ({}):", "• ".green(), classifier.classes().len());
            for class in classifier.classes() {
                println!("  - {}", class);
            }
        }
        ClassifierLoad::Unavailable(reason) => {
            println!("{}Status: {}", "• ".yellow(), "fallback".yellow());
            println!("{}Reason: {}", "• ".yellow(), reason);
            println!("{}Fallback crops: {}", "• ".yellow(), FALLBACK_CROPS.join(", "));
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(config: &AdvisorConfig, requests: usize, concurrent: usize) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    let orchestrator = AdvisoryOrchestrator::from_config(config)?;
    if !orchestrator.ranker().has_classifier() {
        println!("{} No classifier loaded; timing the fallback ranking", "!".yellow());
    }

    info!(
        "Benchmarking {} ranking requests with {} concurrent",
        requests,
        concurrent.max(1)
    );

    // Random soil tests across the accepted ranges
    let samples: Vec<Value> = {
        let mut rng = rand::rng();
        (0..requests)
            .map(|i| {
                json!({
                    "n": rng.random_range(0.0..140.0),
                    "p": rng.random_range(5.0..145.0),
                    "k": rng.random_range(5.0..205.0),
                    "ph": rng.random_range(3.5..9.9),
                    "location": format!("Plot {}", i + 1),
                })
            })
            .collect()
    };

    // Spawn every request, at most `concurrent` in flight
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();
    let mut handles = vec![];
    for sample in samples {
        let orchestrator = orchestrator.clone();
        let permits = permits.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            orchestrator.rank(&sample).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / timings.len() as u32;
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent.max(1));
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print an advisory report
fn print_report(report: &AdvisoryReport) {
    println!(
        "{}",
        format!("Recommended crops for {}:", report.location).bold().blue()
    );
    for (i, crop) in report.crops.iter().enumerate() {
        println!("{}. {}", (i + 1).to_string().green(), crop);
    }
    if report.ranking_source == RankingSource::Fallback {
        println!(
            "{}",
            "(classifier unavailable; showing the regional default list)".yellow()
        );
    }

    println!("\n{}", "Advisory report:".bold().blue());
    match report.narrative_status {
        NarrativeStatus::Generated => println!("{}", report.narrative),
        NarrativeStatus::Degraded => println!("{}", report.narrative.yellow()),
    }

    println!("\n{}", "Sources:".bold().blue());
    for (category, url) in report.source_links.categories() {
        println!("{}{}: {}", "• ".cyan(), category, url);
    }
}
