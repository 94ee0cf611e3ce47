use clap::Parser;
use futures::StreamExt;
use site_brochure::config::BrochureConfig;
use site_brochure::results::ClassifiedLinks;
use site_brochure::utils::{FenceStripper, strip_markdown_fence};
use site_brochure::{ConfiguredBrochure, LinkClassification, Result, TextStream};
use std::io::Write;

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let brochure = match ConfiguredBrochure::from_config(&config) {
        Ok(brochure) => brochure,
        Err(e) => {
            ::log::error!("Failed to set up: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let start_time = std::time::Instant::now();
    let result = run(&brochure, &args.command).await;
    brochure.shutdown().await;

    match result {
        Ok(()) => ::log::info!(
            "Finished in {:.2} seconds",
            start_time.elapsed().as_secs_f64()
        ),
        Err(e) => {
            ::log::error!("Failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(args: &Args) -> Result<BrochureConfig> {
    let mut config = match &args.config {
        Some(path) => BrochureConfig::from_file(path)?,
        None => BrochureConfig::default(),
    };
    config.apply_env();
    args.apply(&mut config);
    Ok(config)
}

async fn run(brochure: &ConfiguredBrochure, command: &Command) -> Result<()> {
    match command {
        Command::Summarize { url } => {
            let summary = brochure.summarize(url).await?;
            println!("{}", strip_markdown_fence(&summary));
        }
        Command::Links { url } => {
            let links = brochure.relevant_links(url).await?;
            println!("{}", links_json(links)?);
        }
        Command::Brochure {
            company,
            url,
            dry_run: true,
            ..
        } => {
            println!("{}", brochure.brochure_prompt(company, url).await?);
        }
        Command::Brochure {
            company,
            url,
            stream: true,
            ..
        } => {
            let fragments = brochure.stream_brochure(company, url).await?;
            write_stream(fragments, &mut std::io::stdout()).await?;
        }
        Command::Brochure { company, url, .. } => {
            let text = brochure.create_brochure(company, url).await?;
            println!("{}", strip_markdown_fence(&text));
        }
    }
    Ok(())
}

fn links_json(links: Vec<LinkClassification>) -> Result<String> {
    let json = serde_json::to_string_pretty(&ClassifiedLinks { links }).map_err(std::io::Error::from)?;
    Ok(json)
}

/// Writes fragments as they arrive, minus a fence wrapping the whole reply
async fn write_stream<W: Write>(mut fragments: TextStream, out: &mut W) -> Result<()> {
    let mut stripper = FenceStripper::default();
    while let Some(fragment) = fragments.next().await {
        out.write_all(stripper.push(&fragment?).as_bytes())?;
        out.flush()?;
    }
    writeln!(out, "{}", stripper.finish())?;
    out.flush()?;
    Ok(())
}
