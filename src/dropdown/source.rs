//! Query result sources
//!
//! Dropdown parameters take their allowed values from the latest result of
//! another query. Storing and executing queries happens elsewhere; this
//! module defines the lookup contract and an in-memory store implementing it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{DropdownError, DropdownResult};

/// Identifier of a saved query
pub type QueryId = i64;

/// One declared result column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    /// Column name as produced by the data source
    pub name: String,
}

/// A computed result set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResultData {
    /// Columns in declaration order
    pub columns: Vec<ResultColumn>,
    /// Rows in result order, keyed by column name
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

/// Outcome of looking up a query's latest result
#[derive(Debug, Clone, PartialEq)]
pub enum QueryLookup {
    /// The query has no data source and therefore no result
    Detached,
    /// The query has a data source; the result may not have been computed yet
    Attached(Option<QueryResultData>),
}

/// Read access to the latest result of saved queries.
///
/// Implementations perform a point-in-time read. They are not expected to
/// cache, and any failure they return is propagated to the caller as is.
pub trait QueryResultSource: Send + Sync {
    /// Looks up `query_id` within the scope of `org`.
    fn lookup(&self, query_id: QueryId, org: Option<&str>) -> DropdownResult<QueryLookup>;
}

/// A saved query as seen by the result store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Query identifier
    pub id: QueryId,
    /// Owning org; `None` makes the record visible to every org
    #[serde(default)]
    pub org: Option<String>,
    /// Data source name; `None` means the query is detached
    #[serde(default)]
    pub data_source: Option<String>,
    /// Latest computed result
    #[serde(default)]
    pub result: Option<QueryResultData>,
}

impl QueryRecord {
    /// Creates an attached query record with a computed result
    pub fn attached(id: QueryId, data_source: impl Into<String>, result: QueryResultData) -> Self {
        Self {
            id,
            org: None,
            data_source: Some(data_source.into()),
            result: Some(result),
        }
    }

    /// Creates a record for a query with no data source
    pub fn detached(id: QueryId) -> Self {
        Self {
            id,
            org: None,
            data_source: None,
            result: None,
        }
    }

    /// Scopes the record to an org
    pub fn in_org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }
}

/// File layout read by `ResultStore::load_file`
#[derive(Debug, Deserialize)]
struct ResultFile {
    #[serde(default)]
    queries: Vec<QueryRecord>,
}

/// In-memory query result store.
///
/// Records are keyed by `(org, query id)`. A lookup scoped to an org falls
/// back to the unscoped record for the same id.
#[derive(Debug, Default)]
pub struct ResultStore {
    records: HashMap<(Option<String>, QueryId), QueryRecord>,
}

impl ResultStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a record, replacing any previous record with the same key.
    pub fn register(&mut self, record: QueryRecord) -> Option<QueryRecord> {
        let key = (record.org.clone(), record.id);
        self.records.insert(key, record)
    }

    /// Loads every record from a JSON result file.
    ///
    /// Returns the number of records loaded.
    pub fn load_file(&mut self, path: &Path) -> DropdownResult<usize> {
        let content = fs::read_to_string(path).map_err(|e| {
            DropdownError::Store(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let file: ResultFile = serde_json::from_str(&content).map_err(|e| {
            DropdownError::Store(format!("Invalid result file '{}': {}", path.display(), e))
        })?;

        let count = file.queries.len();
        for record in file.queries {
            self.register(record);
        }
        Ok(count)
    }

    /// Gets the record visible to `org` for `query_id`
    pub fn get(&self, query_id: QueryId, org: Option<&str>) -> Option<&QueryRecord> {
        org.and_then(|org| self.records.get(&(Some(org.to_string()), query_id)))
            .or_else(|| self.records.get(&(None, query_id)))
    }

    /// Returns the number of stored records
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl QueryResultSource for ResultStore {
    fn lookup(&self, query_id: QueryId, org: Option<&str>) -> DropdownResult<QueryLookup> {
        let record = self
            .get(query_id, org)
            .ok_or(DropdownError::UnknownQuery { query_id })?;

        if record.data_source.is_none() {
            return Ok(QueryLookup::Detached);
        }

        Ok(QueryLookup::Attached(record.result.clone()))
    }
}
