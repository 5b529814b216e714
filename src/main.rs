// src/main.rs

// Modules defined in the crate
mod api;
mod config;
mod constants;
mod error;
mod error_recovery;
mod graph;
mod model;
mod types;

// Specific imports
use crate::config::{CommandLineInput, CrawlerConfig};
use crate::error::AppError;
use crate::graph::crawler::GraphCrawler;
use crate::graph::view::GraphView;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion_graph.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Crawls the workspace and delivers the projected graph view.
async fn run(config: &CrawlerConfig) -> Result<(), AppError> {
    log::info!(
        "Starting workspace crawl (page size: {}, concurrency: {})",
        config.page_size,
        config.concurrency
    );

    let client = api::NotionHttpClient::new(&config.api_key)?;
    let repository = api::ResourceRepository::new(
        Arc::new(client),
        config.page_size,
        config.concurrency,
    );
    let mut crawler = GraphCrawler::new(repository);

    let graph = crawler.build().await?;
    let view = GraphView::project(graph, config.edge_multiplicity);

    deliver(config, graph.len(), &view)
}

/// Writes the view JSON to the configured destination and reports.
fn deliver(config: &CrawlerConfig, node_count: usize, view: &GraphView) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(view)?;

    match &config.output_file {
        Some(path) => {
            fs::write(path, &json)?;
            if !config.pipe {
                println!("✓ Graph saved to {}", path.display());
            }
        }
        None => {
            println!("{}", json);
        }
    }

    if !config.pipe {
        println!(
            "📄 Crawled {} resources ({} edges).",
            node_count,
            view.links.len()
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = CrawlerConfig::resolve(cli)?;

    run(&config).await?;

    Ok(())
}
