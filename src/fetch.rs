// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository metadata from the GitHub GraphQL search API
//!
//! Pagination is strictly sequential with a fixed pause between requests
//! to stay inside the API rate limit. Nothing is retried.

use crate::error::PipelineError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable holding the API token
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Default GraphQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

const SEARCH_QUERY: &str = r"
query ($queryString: String!, $first: Int!, $after: String) {
  search(query: $queryString, type: REPOSITORY, first: $first, after: $after) {
    pageInfo {
      endCursor
      hasNextPage
    }
    nodes {
      ... on Repository {
        nameWithOwner
        url
        description
        stargazerCount
        createdAt
        pushedAt
        diskUsage
        forkCount
        releases { totalCount }
        primaryLanguage { name }
      }
    }
  }
}
";

// =========================================================================
// Wire Types
// =========================================================================

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    /// Payload
    pub data: Option<SearchData>,
    /// Query errors
    pub errors: Option<Vec<GraphqlError>>,
}

/// One GraphQL error
#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    /// Error message
    pub message: String,
}

/// `data` of a search response
#[derive(Debug, Deserialize)]
pub struct SearchData {
    /// Search connection
    pub search: Option<SearchConnection>,
}

/// One page of search results
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConnection {
    /// Cursor information
    pub page_info: PageInfo,
    /// Result nodes; non-repository hits deserialize as empty
    #[serde(default)]
    pub nodes: Vec<Option<RepositoryNode>>,
}

/// Pagination cursor
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Cursor of the last node
    pub end_cursor: Option<String>,
    /// Whether another page exists
    pub has_next_page: bool,
}

/// `{ totalCount }` connection
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    /// Count
    pub total_count: Option<u64>,
}

/// `{ name }` object
#[derive(Debug, Default, Deserialize)]
pub struct Named {
    /// Name
    pub name: Option<String>,
}

/// Repository fields requested by the search query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryNode {
    /// `owner/name`
    pub name_with_owner: Option<String>,
    /// Web URL
    pub url: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Stars
    pub stargazer_count: Option<u64>,
    /// Creation timestamp
    pub created_at: Option<String>,
    /// Last push timestamp
    pub pushed_at: Option<String>,
    /// Disk usage in KB
    pub disk_usage: Option<u64>,
    /// Forks
    pub fork_count: Option<u64>,
    /// Releases connection
    pub releases: Option<TotalCount>,
    /// Primary language
    pub primary_language: Option<Named>,
}

// =========================================================================
// Collected Rows
// =========================================================================

/// One row of the metadata export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedRepository {
    /// `owner/name`
    pub name_with_owner: String,
    /// Web URL
    pub url: String,
    /// Description (empty when absent)
    pub description: String,
    /// Stars
    pub stargazer_count: Option<u64>,
    /// Creation timestamp
    pub created_at: Option<String>,
    /// Last push timestamp
    pub pushed_at: Option<String>,
    /// Disk usage in KB
    pub disk_usage: Option<u64>,
    /// Forks
    pub fork_count: Option<u64>,
    /// Releases
    pub release_count: Option<u64>,
    /// Primary language
    pub primary_language: Option<String>,
}

/// Header of the metadata export, in field order
pub const EXPORT_HEADER: [&str; 10] = [
    "nameWithOwner",
    "url",
    "description",
    "stargazerCount",
    "createdAt",
    "pushedAt",
    "diskUsage",
    "forkCount",
    "releaseCount",
    "primaryLanguage",
];

impl FetchedRepository {
    /// Flatten a search node; `None` for non-repository hits
    #[must_use]
    pub fn from_node(node: RepositoryNode) -> Option<Self> {
        Some(Self {
            name_with_owner: node.name_with_owner?,
            url: node.url.unwrap_or_default(),
            description: node.description.unwrap_or_default(),
            stargazer_count: node.stargazer_count,
            created_at: node.created_at,
            pushed_at: node.pushed_at,
            disk_usage: node.disk_usage,
            fork_count: node.fork_count,
            release_count: node.releases.and_then(|r| r.total_count),
            primary_language: node.primary_language.and_then(|l| l.name),
        })
    }
}

/// One page returned by a [`SearchPager`]
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// Repositories on this page
    pub repositories: Vec<FetchedRepository>,
    /// Cursor to continue after this page
    pub end_cursor: Option<String>,
    /// Whether more pages exist
    pub has_next_page: bool,
}

/// Validate a decoded response and flatten it into a page
pub fn parse_search_response(response: GraphqlResponse) -> Result<SearchPage, PipelineError> {
    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(PipelineError::MalformedResponse(messages.join("; ")));
    }
    let search = response
        .data
        .and_then(|d| d.search)
        .ok_or_else(|| PipelineError::MalformedResponse("missing data.search".into()))?;

    Ok(SearchPage {
        repositories: search
            .nodes
            .into_iter()
            .flatten()
            .filter_map(FetchedRepository::from_node)
            .collect(),
        end_cursor: search.page_info.end_cursor,
        has_next_page: search.page_info.has_next_page,
    })
}

// =========================================================================
// Pagination
// =========================================================================

/// Source of search result pages
pub trait SearchPager {
    /// Fetch up to `first` results following cursor `after`
    fn fetch_page(&mut self, query: &str, first: u32, after: Option<&str>) -> Result<SearchPage>;
}

/// Blocking client for the GitHub GraphQL API
pub struct GithubSearch {
    client: Client,
    endpoint: String,
    token: String,
}

impl GithubSearch {
    /// Create a client with an explicit token
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// Create a client with the token from [`TOKEN_VAR`]
    pub fn from_env(endpoint: impl Into<String>) -> Result<Self> {
        let token = std::env::var(TOKEN_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(PipelineError::MissingToken(TOKEN_VAR))?;
        Self::new(endpoint, token)
    }
}

impl SearchPager for GithubSearch {
    fn fetch_page(&mut self, query: &str, first: u32, after: Option<&str>) -> Result<SearchPage> {
        let body = serde_json::json!({
            "query": SEARCH_QUERY,
            "variables": {
                "queryString": query,
                "first": first,
                "after": after,
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github.v4+json")
            .header(USER_AGENT, concat!("repoquality/", env!("CARGO_PKG_VERSION")))
            .json(&body)
            .send()
            .with_context(|| format!("Request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let decoded: GraphqlResponse = response
            .json()
            .context("Failed to decode search response")?;
        Ok(parse_search_response(decoded)?)
    }
}

/// Page through search results until `target` rows or the last page
///
/// Requests are issued one at a time with `delay` between them.
pub fn collect_repositories<P: SearchPager>(
    pager: &mut P,
    query: &str,
    per_page: u32,
    target: usize,
    delay: Duration,
) -> Result<Vec<FetchedRepository>> {
    let mut collected: Vec<FetchedRepository> = Vec::new();
    let mut after: Option<String> = None;

    while collected.len() < target {
        let page = pager.fetch_page(query, per_page, after.as_deref())?;
        debug!(
            "Page with {} repositories, has_next_page={}",
            page.repositories.len(),
            page.has_next_page
        );
        collected.extend(page.repositories);

        if !page.has_next_page || page.end_cursor.is_none() {
            break;
        }
        after = page.end_cursor;
        if collected.len() < target && !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    collected.truncate(target);
    info!("Collected {} repositories for '{}'", collected.len(), query);
    Ok(collected)
}

/// Write collected repositories as the metadata CSV
pub fn write_repositories(path: &Path, repositories: &[FetchedRepository]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let csv_err = |source: csv::Error| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(EXPORT_HEADER).map_err(csv_err)?;
    for repo in repositories {
        writer.serialize(repo).map_err(csv_err)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
