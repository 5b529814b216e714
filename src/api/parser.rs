// src/api/parser.rs
//! Wire-format parsing for the four endpoints the crawler touches.
//!
//! Serde wire structs mirror the remote JSON; conversion functions map
//! them onto the domain model so nothing above this module sees the
//! API's shape. Error envelopes are classified into the typed
//! `NotionErrorCode` vocabulary here as well.

use super::client::ApiResponse;
use super::pagination::PaginatedResponse;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionErrorCode};
use crate::model::{Block, BlockType, Database, Page, ParentRef, PropertyValue, ResourceKind, ResourceRef};
use crate::types::{MentionKind, NotionId, PropertyName, RichTextItem, RichTextType};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

// --- Wire structs ---

#[derive(Debug, Deserialize)]
struct WireError {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WirePage {
    id: NotionId,
    created_time: DateTime<Utc>,
    last_edited_time: DateTime<Utc>,
    parent: ParentRef,
    #[serde(default)]
    properties: HashMap<String, WireProperty>,
}

#[derive(Debug, Deserialize)]
struct WireProperty {
    #[serde(rename = "type")]
    property_type: String,
    #[serde(default)]
    title: Option<Vec<WireRichText>>,
}

#[derive(Debug, Deserialize)]
struct WireDatabase {
    id: NotionId,
    #[serde(default)]
    title: Vec<WireRichText>,
    created_time: DateTime<Utc>,
    last_edited_time: DateTime<Utc>,
    parent: ParentRef,
}

#[derive(Debug, Deserialize)]
struct WireBlock {
    id: NotionId,
    #[serde(rename = "type")]
    block_type: BlockType,
    #[serde(default)]
    has_children: bool,
    /// Per-type payload lives under a key named after the type.
    #[serde(flatten)]
    payload: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WireRichText {
    #[serde(rename = "type")]
    span_type: String,
    #[serde(default)]
    plain_text: String,
    #[serde(default)]
    mention: Option<WireMention>,
    #[serde(default)]
    equation: Option<WireEquation>,
}

#[derive(Debug, Deserialize)]
struct WireMention {
    #[serde(rename = "type")]
    mention_type: String,
    #[serde(default)]
    page: Option<WireIdRef>,
    #[serde(default)]
    database: Option<WireIdRef>,
    #[serde(default)]
    user: Option<WireIdRef>,
}

#[derive(Debug, Deserialize)]
struct WireIdRef {
    id: NotionId,
}

#[derive(Debug, Deserialize)]
struct WireEquation {
    expression: String,
}

#[derive(Debug, Deserialize)]
struct WireSearchResult {
    id: NotionId,
    object: String,
}

#[derive(Debug, Deserialize)]
struct WireIdOnly {
    id: NotionId,
}

// --- Success/error envelope handling ---

/// Parse any Notion API response body, classifying error envelopes.
fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success_body(&result.data, &result.url)
    } else {
        parse_error_body(&result.data, result.status, &result.url)
    }
}

fn parse_success_body<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);

        let preview = if body.len() > ERROR_BODY_PREVIEW_LENGTH {
            format!("{}...", &body[..ERROR_BODY_PREVIEW_LENGTH])
        } else {
            body.to_string()
        };

        AppError::MalformedResponse(format!("{} (body: {})", e, preview))
    })
}

fn parse_error_body<T>(
    body: &str,
    status: reqwest::StatusCode,
    url: &str,
) -> Result<T, AppError> {
    // Try the structured error envelope first
    if let Ok(wire) = serde_json::from_str::<WireError>(body) {
        return Err(AppError::NotionService {
            code: NotionErrorCode::from_api_response(&wire.code),
            message: wire.message,
            status,
        });
    }

    // Fallback to generic error with HTTP status code
    Err(AppError::NotionService {
        code: NotionErrorCode::from_http_status(status.as_u16()),
        message: format!("HTTP {} from {}", status, url),
        status,
    })
}

// --- Endpoint parsers ---

/// Parse a page-retrieve response.
pub fn parse_page_response(result: ApiResponse<String>) -> Result<Page, AppError> {
    let wire: WirePage = parse_api_response(result)?;
    Ok(convert_page(wire))
}

/// Parse a database-retrieve response.
pub fn parse_database_response(result: ApiResponse<String>) -> Result<Database, AppError> {
    let wire: WireDatabase = parse_api_response(result)?;
    Ok(convert_database(wire))
}

/// Parse one page of a block-children listing.
pub fn parse_blocks_page(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Block>, AppError> {
    let wire: PaginatedResponse<WireBlock> = parse_api_response(result)?;
    Ok(PaginatedResponse {
        results: wire.results.into_iter().map(convert_block).collect(),
        next_cursor: wire.next_cursor,
        has_more: wire.has_more,
    })
}

/// Parse one page of a database member query, keeping ids only.
pub fn parse_query_page(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<NotionId>, AppError> {
    let wire: PaginatedResponse<WireIdOnly> = parse_api_response(result)?;
    Ok(PaginatedResponse {
        results: wire.results.into_iter().map(|row| row.id).collect(),
        next_cursor: wire.next_cursor,
        has_more: wire.has_more,
    })
}

/// Parse one page of the workspace search.
///
/// Results whose object kind is neither page nor database are skipped.
pub fn parse_search_page(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<ResourceRef>, AppError> {
    let wire: PaginatedResponse<WireSearchResult> = parse_api_response(result)?;
    let results = wire
        .results
        .into_iter()
        .filter_map(|entry| {
            let kind = match entry.object.as_str() {
                "page" => ResourceKind::Page,
                "database" => ResourceKind::Database,
                other => {
                    log::debug!("Skipping search result of kind '{}'", other);
                    return None;
                }
            };
            Some(ResourceRef { id: entry.id, kind })
        })
        .collect();
    Ok(PaginatedResponse {
        results,
        next_cursor: wire.next_cursor,
        has_more: wire.has_more,
    })
}

// --- Wire → domain conversion ---

fn convert_page(wire: WirePage) -> Page {
    let properties = wire
        .properties
        .into_iter()
        .map(|(name, prop)| (PropertyName::new(name), convert_property(prop)))
        .collect();

    Page {
        id: wire.id,
        created_time: wire.created_time,
        last_edited_time: wire.last_edited_time,
        parent: wire.parent,
        properties,
    }
}

fn convert_database(wire: WireDatabase) -> Database {
    Database {
        id: wire.id,
        title: wire.title.into_iter().map(convert_rich_text).collect(),
        created_time: wire.created_time,
        last_edited_time: wire.last_edited_time,
        parent: wire.parent,
    }
}

fn convert_property(wire: WireProperty) -> PropertyValue {
    match (wire.property_type.as_str(), wire.title) {
        ("title", Some(fragments)) => PropertyValue::Title {
            fragments: fragments.into_iter().map(convert_rich_text).collect(),
        },
        ("title", None) => PropertyValue::Title { fragments: vec![] },
        (_, _) => PropertyValue::Other {
            property_type: wire.property_type,
        },
    }
}

fn convert_block(wire: WireBlock) -> Block {
    // The type payload carries the rich text for content-bearing kinds:
    // { "type": "paragraph", "paragraph": { "rich_text": [...] } }
    let rich_text = wire
        .payload
        .get(wire.block_type.as_str())
        .and_then(|payload| payload.get("rich_text"))
        .and_then(|spans| {
            serde_json::from_value::<Vec<WireRichText>>(spans.clone()).ok()
        })
        .map(|spans| spans.into_iter().map(convert_rich_text).collect())
        .unwrap_or_default();

    Block {
        id: wire.id,
        block_type: wire.block_type,
        has_children: wire.has_children,
        rich_text,
    }
}

fn convert_rich_text(wire: WireRichText) -> RichTextItem {
    let text_type = match wire.span_type.as_str() {
        "mention" => RichTextType::Mention(convert_mention(wire.mention)),
        "equation" => RichTextType::Equation {
            expression: wire
                .equation
                .map(|eq| eq.expression)
                .unwrap_or_else(|| wire.plain_text.clone()),
        },
        // "text" and anything unrecognized both carry only their plain text
        _ => RichTextType::Text {
            content: wire.plain_text.clone(),
        },
    };

    RichTextItem {
        text_type,
        plain_text: wire.plain_text,
    }
}

fn convert_mention(wire: Option<WireMention>) -> MentionKind {
    let Some(mention) = wire else {
        return MentionKind::Other;
    };

    match (mention.mention_type.as_str(), mention.page, mention.database, mention.user) {
        ("page", Some(target), _, _) => MentionKind::Page { id: target.id },
        ("database", _, Some(target), _) => MentionKind::Database { id: target.id },
        ("user", _, _, Some(target)) => MentionKind::User { id: target.id },
        ("date", _, _, _) => MentionKind::Date,
        _ => MentionKind::Other,
    }
}
