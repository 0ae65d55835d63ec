use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Collection
///
/// The resources exposed by the REST data store, one per top-level key of the
/// json-server database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Events,
    Venues,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Events => "events",
            Collection::Venues => "venues",
        }
    }
}

/// Filter
///
/// Equality filters sent as query parameters (`/users?email=a@b.c`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Vec<(String, String)>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((field.into(), value.into()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Verb
///
/// The operation a request performed, used to phrase failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Fetching,
    Creating,
    Updating,
    Deleting,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Fetching => "fetching",
            Verb::Creating => "creating",
            Verb::Updating => "updating",
            Verb::Deleting => "deleting",
        }
    }
}

/// ClientError
///
/// Failure outcome of a Data Client call. The `Display` text is what views show
/// to the user.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    #[error("Error {} data: {reason}", .verb.as_str())]
    Status {
        verb: Verb,
        status: u16,
        reason: String,
    },
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn not_found(verb: Verb) -> Self {
        ClientError::Status {
            verb,
            status: 404,
            reason: "Not Found".to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// 1. DataClient Contract
/// DataClient
///
/// CRUD surface of the remote store. Records travel as raw JSON; the typed view of
/// them lives in `Repository`. Implementations never retry and never panic: every
/// failure comes back as a `ClientError`.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Lists a collection, optionally narrowed by equality filters.
    async fn fetch(
        &self,
        collection: Collection,
        filter: Option<&Filter>,
    ) -> Result<Vec<Value>, ClientError>;

    /// Loads a single record by id. The id is passed through untouched.
    async fn fetch_one(&self, collection: Collection, id: &str) -> Result<Value, ClientError>;

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, ClientError>;

    /// Replaces the whole record stored under `id`.
    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        record: Value,
    ) -> Result<Value, ClientError>;

    async fn remove(&self, collection: Collection, id: &str) -> Result<Value, ClientError>;
}

/// DataClientState
///
/// The shared handle every view and action reaches the store through.
pub type DataClientState = Arc<dyn DataClient>;

// 2. The Real Implementation (json-server over HTTP)
/// HttpDataClient
///
/// `reqwest`-backed client for a json-server style REST API rooted at `base_url`.
#[derive(Clone)]
pub struct HttpDataClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpDataClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::Transport(format!("invalid base url {base_url}: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// Builds `<base>/<collection>[/<id>]`, escaping the id as a single path segment.
    fn url(&self, collection: Collection, id: Option<&str>) -> Result<reqwest::Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::Transport("base url cannot hold a path".to_string()))?;
            segments.pop_if_empty().push(collection.as_str());
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        verb: Verb,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("{} request failed: {:?}", verb.as_str(), e);
            ClientError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown Status").to_string();
            tracing::error!(status = status.as_u16(), "error {} data: {}", verb.as_str(), reason);
            return Err(ClientError::Status {
                verb,
                status: status.as_u16(),
                reason,
            });
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!("{} response could not be decoded: {:?}", verb.as_str(), e);
            ClientError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl DataClient for HttpDataClient {
    async fn fetch(
        &self,
        collection: Collection,
        filter: Option<&Filter>,
    ) -> Result<Vec<Value>, ClientError> {
        let mut request = self.http.get(self.url(collection, None)?);
        if let Some(filter) = filter {
            request = request.query(filter.pairs());
        }
        self.send(Verb::Fetching, request).await
    }

    async fn fetch_one(&self, collection: Collection, id: &str) -> Result<Value, ClientError> {
        let request = self.http.get(self.url(collection, Some(id))?);
        self.send(Verb::Fetching, request).await
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, ClientError> {
        let request = self.http.post(self.url(collection, None)?).json(&record);
        self.send(Verb::Creating, request).await
    }

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        record: Value,
    ) -> Result<Value, ClientError> {
        let request = self.http.put(self.url(collection, Some(id))?).json(&record);
        self.send(Verb::Updating, request).await
    }

    async fn remove(&self, collection: Collection, id: &str) -> Result<Value, ClientError> {
        let request = self.http.delete(self.url(collection, Some(id))?);
        self.send(Verb::Deleting, request).await
    }
}

// 3. The In-Memory Implementation (For Tests)
/// InMemoryDataClient
///
/// Emulates json-server semantics over in-process collections: numeric ids are
/// assigned on create, lookups of unknown ids answer 404, and filters compare the
/// string form of a field. `failing()` makes every call return a transport error.
#[derive(Default)]
pub struct InMemoryDataClient {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
    failing: AtomicBool,
}

impl InMemoryDataClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let client = Self::default();
        client.set_failing(true);
        client
    }

    /// Seeds a collection, replacing whatever it held.
    pub fn with_records(self, collection: Collection, records: Vec<Value>) -> Self {
        self.collections.lock().insert(collection, records);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of a collection, for assertions.
    pub fn records(&self, collection: Collection) -> Vec<Value> {
        self.collections
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), ClientError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Transport(
                "simulated data store failure".to_string(),
            ));
        }
        Ok(())
    }
}

/// String form of a JSON scalar, the way json-server compares ids and filters.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn record_id(record: &Value) -> Option<String> {
    record.get("id").and_then(scalar_text)
}

fn position(records: &[Value], id: &str) -> Option<usize> {
    records
        .iter()
        .position(|r| record_id(r).as_deref() == Some(id))
}

#[async_trait]
impl DataClient for InMemoryDataClient {
    async fn fetch(
        &self,
        collection: Collection,
        filter: Option<&Filter>,
    ) -> Result<Vec<Value>, ClientError> {
        self.check()?;
        let collections = self.collections.lock();
        let records = collections.get(&collection).cloned().unwrap_or_default();

        Ok(match filter {
            None => records,
            Some(filter) => records
                .into_iter()
                .filter(|record| {
                    filter.pairs().iter().all(|(field, expected)| {
                        record.get(field).and_then(scalar_text).as_deref() == Some(expected)
                    })
                })
                .collect(),
        })
    }

    async fn fetch_one(&self, collection: Collection, id: &str) -> Result<Value, ClientError> {
        self.check()?;
        let collections = self.collections.lock();
        let records = collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or_default();

        position(records, id)
            .map(|idx| records[idx].clone())
            .ok_or_else(|| ClientError::not_found(Verb::Fetching))
    }

    async fn create(&self, collection: Collection, mut record: Value) -> Result<Value, ClientError> {
        self.check()?;
        let mut collections = self.collections.lock();
        let records = collections.entry(collection).or_default();

        let Some(fields) = record.as_object_mut() else {
            return Err(ClientError::Status {
                verb: Verb::Creating,
                status: 400,
                reason: "Bad Request".to_string(),
            });
        };

        match fields.get("id").and_then(scalar_text) {
            Some(id) if position(records, &id).is_some() => {
                return Err(ClientError::Status {
                    verb: Verb::Creating,
                    status: 500,
                    reason: "Internal Server Error".to_string(),
                });
            }
            Some(_) => {}
            None => {
                let next = records
                    .iter()
                    .filter_map(|r| r.get("id").and_then(Value::as_u64))
                    .max()
                    .unwrap_or(0)
                    + 1;
                fields.insert("id".to_string(), Value::from(next));
            }
        }

        records.push(record.clone());
        Ok(record)
    }

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        mut record: Value,
    ) -> Result<Value, ClientError> {
        self.check()?;
        let mut collections = self.collections.lock();
        let records = collections.entry(collection).or_default();
        let idx = position(records, id).ok_or_else(|| ClientError::not_found(Verb::Updating))?;

        // The stored id wins over whatever the body carries.
        let stored_id = records[idx].get("id").cloned().unwrap_or(Value::Null);
        if let Some(fields) = record.as_object_mut() {
            fields.insert("id".to_string(), stored_id);
        }

        records[idx] = record.clone();
        Ok(record)
    }

    async fn remove(&self, collection: Collection, id: &str) -> Result<Value, ClientError> {
        self.check()?;
        let mut collections = self.collections.lock();
        let records = collections.entry(collection).or_default();
        let idx = position(records, id).ok_or_else(|| ClientError::not_found(Verb::Deleting))?;

        Ok(records.remove(idx))
    }
}
