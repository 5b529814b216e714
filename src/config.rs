// src/config.rs
use crate::constants::{MAX_CONCURRENT_FETCHES, MIN_CONCURRENT_FETCHES, NOTION_API_PAGE_SIZE};
use crate::error::AppError;
use crate::graph::view::EdgeMultiplicity;
use crate::types::{ApiKey, ValidationError};
use clap::Parser;
use std::path::PathBuf;

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Output file for the graph view JSON (stdout when omitted)
    #[arg(short, long)]
    pub output_file: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Pipe mode - output the graph JSON directly to stdout for piping
    #[arg(short = 'p', long, default_value_t = false)]
    pub pipe: bool,

    /// Number of concurrent API requests per crawl level (default: auto, max 32)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Items requested per paginated API call (1-100)
    #[arg(long, default_value_t = NOTION_API_PAGE_SIZE)]
    pub page_size: u32,

    /// Collapse repeated mentions of one target into a single edge in the output
    #[arg(long, default_value_t = false)]
    pub distinct_edges: bool,
}

/// Resolved crawler configuration — validated and ready to drive a crawl.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub api_key: ApiKey,
    pub page_size: u32,
    pub concurrency: usize,
    pub edge_multiplicity: EdgeMultiplicity,
    pub output_file: Option<PathBuf>,
    pub pipe: bool,
    #[allow(dead_code)] // Read before resolution for logging setup
    pub verbose: bool,
}

impl CrawlerConfig {
    /// Resolves a complete configuration from CLI input and environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let api_key_str = std::env::var("NOTION_API_KEY").map_err(|_| {
            AppError::MissingConfiguration(
                "NOTION_API_KEY environment variable not set".to_string(),
            )
        })?;
        let api_key = ApiKey::new(api_key_str)?;

        if cli.page_size == 0 || cli.page_size > NOTION_API_PAGE_SIZE {
            return Err(ValidationError::OutOfBounds {
                value: cli.page_size,
                min: 1,
                max: NOTION_API_PAGE_SIZE,
            }
            .into());
        }

        let edge_multiplicity = if cli.distinct_edges {
            EdgeMultiplicity::Distinct
        } else {
            EdgeMultiplicity::PerMention
        };

        Ok(CrawlerConfig {
            api_key,
            page_size: cli.page_size,
            concurrency: Self::resolve_concurrency(cli.concurrency),
            edge_multiplicity,
            output_file: cli.output_file.map(PathBuf::from),
            pipe: cli.pipe,
            verbose: cli.verbose,
        })
    }

    /// Picks the fan-out width.
    ///
    /// Workers are async tasks waiting on network I/O, not CPU-bound,
    /// so the default runs more requests than cores; the explicit
    /// setting is clamped to the hard ceiling either way.
    fn resolve_concurrency(requested: Option<usize>) -> usize {
        requested
            .unwrap_or_else(|| num_cpus::get().clamp(4, 24))
            .clamp(MIN_CONCURRENT_FETCHES, MAX_CONCURRENT_FETCHES)
    }
}
