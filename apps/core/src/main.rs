// shootbrief CLI
// Reads a production brief from the arguments or stdin and prints the analysis as JSON.

use anyhow::{Context, Result};
use std::env;
use std::io::{self, Read};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shootbrief_core::{BriefAnalyzer, EngineConfig, Refiner};

const USAGE: &str = "usage: shootbrief [--refine] [TEXT...]\n\
    Reads the brief from TEXT, or from stdin when no text is given.\n\
    --refine  run online geocoding/augmentation as configured by SHOOTBRIEF_* variables";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the JSON result only.
    let json = env::var("SHOOTBRIEF_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_target(false).with_writer(io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let mut refine = false;
    let mut words = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--refine" => refine = true,
            "-h" | "--help" => {
                eprintln!("{}", USAGE);
                return Ok(());
            }
            _ => words.push(arg),
        }
    }

    let text = if words.is_empty() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read brief from stdin")?;
        buffer
    } else {
        words.join(" ")
    };

    let analyzer = BriefAnalyzer::new();
    let result = if refine {
        let config = EngineConfig::from_env().context("Invalid SHOOTBRIEF_* configuration")?;
        let refiner = Refiner::from_config(analyzer.clone(), &config)?;
        if !refiner.is_enabled() {
            info!("--refine given but no online stage is enabled");
        }
        let local = analyzer.analyze(&text);
        refiner
            .refine_until(&text, local, async {
                tokio::signal::ctrl_c().await.ok();
            })
            .await
    } else {
        analyzer.analyze(&text)
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
