//! Minimal SPARQL 1.1 protocol client returning typed result tables.

use chrono::{NaiveDate, NaiveDateTime};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use munigraph_core::{MuniGraphError, Result, SourceConfig};
use reqwest::{header::ACCEPT, Client};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
const XSD_DATETIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// A bound value converted according to its literal datatype.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Literal {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Literal::Date(d) => Some(*d),
            Literal::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    head: SparqlHead,
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlHead {
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, Binding>>,
}

#[derive(Debug, Deserialize)]
struct Binding {
    value: String,
    #[serde(default)]
    datatype: Option<String>,
}

impl Binding {
    fn to_literal(&self) -> Result<Literal> {
        let value = self.value.as_str();
        let invalid = |e: &dyn std::fmt::Display| {
            MuniGraphError::External(format!("invalid literal {:?}: {}", value, e))
        };
        match self.datatype.as_deref() {
            None | Some(XSD_STRING) | Some(RDF_LANG_STRING) => Ok(Literal::Text(self.value.clone())),
            Some(XSD_INTEGER) => value.parse().map(Literal::Integer).map_err(|e| invalid(&e)),
            Some(XSD_FLOAT) | Some(XSD_DECIMAL) => {
                value.parse().map(Literal::Float).map_err(|e| invalid(&e))
            }
            Some(XSD_DATE) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Literal::Date)
                .map_err(|e| invalid(&e)),
            Some(XSD_DATETIME) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ")
                .map(Literal::DateTime)
                .map_err(|e| invalid(&e)),
            Some(other) => Err(MuniGraphError::External(format!(
                "unsupported literal datatype: {}",
                other
            ))),
        }
    }
}

/// Query results in tabular form; unbound variables are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparqlTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Literal>>>,
}

impl SparqlTable {
    /// Normalizes a `application/sparql-results+json` document.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        if value.as_object().is_some_and(|o| o.is_empty()) {
            return Err(MuniGraphError::EmptySource);
        }
        let response: SparqlResponse = serde_json::from_value(value)?;
        let columns = response.head.vars;

        let rows = response
            .results
            .bindings
            .iter()
            .map(|binding| {
                columns
                    .iter()
                    .map(|col| binding.get(col).map(Binding::to_literal).transpose())
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = SparqlRow<'_>> + '_ {
        self.rows.iter().enumerate().map(move |(index, values)| SparqlRow {
            columns: &self.columns,
            values,
            index,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SparqlRow<'a> {
    columns: &'a [String],
    values: &'a [Option<Literal>],
    index: usize,
}

impl<'a> SparqlRow<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a Literal> {
        let pos = self.columns.iter().position(|c| c == column)?;
        self.values[pos].as_ref()
    }
}

/// Throttled, retrying client for one SPARQL endpoint.
pub struct SparqlClient {
    client: Client,
    config: SourceConfig,
    limiter: DefaultDirectRateLimiter,
}

impl std::fmt::Debug for SparqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlClient")
            .field("endpoint", &self.config.endpoint)
            .finish()
    }
}

impl SparqlClient {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            MuniGraphError::Configuration(format!("invalid SPARQL endpoint {:?}: {}", config.endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(MuniGraphError::Configuration(format!(
                "unsupported SPARQL endpoint scheme: {}",
                endpoint.scheme()
            )));
        }
        let quota = Quota::with_period(config.min_request_interval()).ok_or_else(|| {
            MuniGraphError::Configuration("source.min_request_interval_ms must be > 0".to_string())
        })?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("munigraph/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MuniGraphError::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            limiter: RateLimiter::direct(quota),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Sends a SELECT query and normalizes the results.
    pub async fn send_query(&self, query: &str) -> Result<SparqlTable> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.config.backoff(attempt)).await;
            }
            self.limiter.until_ready().await;

            debug!(endpoint = %self.config.endpoint, attempt, "sending SPARQL query");
            let request = self
                .client
                .get(&self.config.endpoint)
                .header(ACCEPT, SPARQL_RESULTS_JSON)
                .query(&[("query", query)])
                .send()
                .await;

            match request {
                Ok(response) if response.status().is_success() => {
                    let body: JsonValue = response.json().await.map_err(|e| {
                        MuniGraphError::External(format!("failed to decode SPARQL response: {}", e))
                    })?;
                    let table = SparqlTable::from_json(body)?;
                    info!(rows = table.len(), "SPARQL query succeeded");
                    return Ok(table);
                }
                Ok(response) => {
                    let status = response.status();
                    if !self.config.retry_statuses.contains(&status.as_u16()) {
                        let body = response.text().await.unwrap_or_default();
                        return Err(MuniGraphError::External(format!(
                            "SPARQL endpoint returned HTTP {}: {}",
                            status,
                            body.chars().take(200).collect::<String>()
                        )));
                    }
                    last_error = Some(MuniGraphError::External(format!(
                        "SPARQL endpoint returned HTTP {}",
                        status
                    )));
                }
                Err(e) if e.is_timeout() => {
                    last_error = Some(MuniGraphError::Timeout(format!(
                        "SPARQL request timed out: {}",
                        e
                    )));
                }
                Err(e) => {
                    last_error = Some(MuniGraphError::Network(format!("request failed: {}", e)));
                }
            }

            if attempt < self.config.max_retries {
                warn!(
                    "SPARQL query failed (attempt {}/{}), retrying...",
                    attempt + 1,
                    self.config.max_retries + 1
                );
            }
        }

        Err(last_error.unwrap_or_else(|| {
            MuniGraphError::External("all SPARQL retry attempts failed".to_string())
        }))
    }
}
