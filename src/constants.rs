// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story
//! of how the crawler operates: how much it asks for per round-trip,
//! how wide it fans out, how it allocates memory.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100. We use the maximum to minimize
/// round-trips while draining paginated endpoints.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// Hard ceiling on concurrent in-flight requests within one crawl level.
///
/// The API is rate-limited; a wide workspace level would otherwise issue
/// one request per frontier entry simultaneously.
pub const MAX_CONCURRENT_FETCHES: usize = 32;

/// Lower bound for the concurrency setting.
pub const MIN_CONCURRENT_FETCHES: usize = 1;

// ---------------------------------------------------------------------------
// Transport retry boundaries
// ---------------------------------------------------------------------------

/// Attempts per wire call before a transient failure becomes fatal.
pub const TRANSPORT_RETRY_ATTEMPTS: u32 = 3;

/// First backoff delay after a transient transport failure, in milliseconds.
pub const TRANSPORT_RETRY_INITIAL_DELAY_MS: u64 = 100;

/// Backoff ceiling, in milliseconds.
pub const TRANSPORT_RETRY_MAX_DELAY_MS: u64 = 5_000;

// ---------------------------------------------------------------------------
// Capacity hints (performance, not correctness)
// ---------------------------------------------------------------------------

/// Initial capacity for the graph's node map.
pub const GRAPH_INITIAL_CAPACITY: usize = 128;

/// Estimated blocks per page, used to pre-allocate subtree buffers.
pub const BLOCKS_PER_PAGE_ESTIMATE: usize = 64;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing unparseable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
