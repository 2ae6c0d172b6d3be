//! Firestore REST backend
//!
//! The directory is one document per badge identifier in the directory
//! collection; audit records become new documents in the audit collection.
//! Every request is synchronous and bounded by the configured network timeout.

use std::collections::HashMap;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

use crate::access::{AuditRecord, AuthorizationRecord};
use crate::ports::{AuditError, AuditLogger, DirectoryClient, DirectoryError, LookupOutcome};
use crate::types::{BadgeId, DirectoryFieldNames, FirestoreConfig};

/// A Firestore document as returned by `GET .../documents/{collection}/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreDocument {
    /// Full resource name
    #[serde(default)]
    pub name: Option<String>,
    /// Typed field values
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

/// Typed value envelope; only the types the controller reads are modelled
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreValue {
    /// `stringValue`
    #[serde(default)]
    pub string_value: Option<String>,
    /// `arrayValue`
    #[serde(default)]
    pub array_value: Option<FirestoreArray>,
}

/// `arrayValue` payload; an empty array has no `values` key at all
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FirestoreArray {
    /// Array elements
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

impl FirestoreDocument {
    fn string_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)?.string_value.as_deref()
    }

    fn string_array_field(&self, name: &str) -> Vec<String> {
        self.fields
            .get(name)
            .and_then(|value| value.array_value.as_ref())
            .map(|array| {
                array.values.iter().filter_map(|value| value.string_value.clone()).collect()
            })
            .unwrap_or_default()
    }

    /// Authorization record described by this document
    ///
    /// Missing names fall back to `"Unknown"`, a missing zone array means no zones,
    /// and non-string array elements are skipped.
    pub fn to_record(&self, fields: &DirectoryFieldNames) -> AuthorizationRecord {
        AuthorizationRecord::from_name_parts(
            self.string_field(&fields.given_name),
            self.string_field(&fields.family_name),
            self.string_array_field(&fields.authorized_zones),
        )
    }
}

/// Parse a directory document body into a lookup outcome
pub fn parse_document(body: &str, fields: &DirectoryFieldNames) -> LookupOutcome {
    match serde_json::from_str::<FirestoreDocument>(body) {
        Ok(document) => {
            trace!(name = ?document.name, "Parsed directory document");
            LookupOutcome::Found(document.to_record(fields))
        }
        Err(err) => LookupOutcome::Malformed { detail: err.to_string() },
    }
}

/// Audit record encoded as a Firestore document body: every field is a `stringValue`
pub fn audit_document(record: &AuditRecord) -> Value {
    let mut fields = Map::new();
    for (name, value) in record.fields() {
        fields.insert(name.to_string(), json!({ "stringValue": value }));
    }
    json!({ "fields": fields })
}

/// Shared HTTP plumbing for the directory and audit clients
#[derive(Debug, Clone)]
struct FirestoreClient {
    client: Client,
    documents_url: String,
    api_key: String,
    timeout: Duration,
}

impl FirestoreClient {
    fn new(config: &FirestoreConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).connect_timeout(timeout).build()?;
        Ok(Self {
            client,
            documents_url: documents_url(config),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}?key={}", self.documents_url, path, self.api_key)
    }
}

/// `{base}/projects/{project}/databases/(default)/documents`
pub fn documents_url(config: &FirestoreConfig) -> String {
    format!(
        "{}/projects/{}/databases/(default)/documents",
        config.base_url.trim_end_matches('/'),
        config.project_id
    )
}

// Request URLs carry the API key, so it is stripped before the error becomes log text
fn directory_error(err: reqwest::Error, timeout: Duration) -> DirectoryError {
    let err = err.without_url();
    if err.is_timeout() {
        DirectoryError::Timeout(timeout)
    } else if err.is_connect() {
        DirectoryError::Unreachable(err.to_string())
    } else {
        DirectoryError::Transport(err.to_string())
    }
}

fn audit_error(err: reqwest::Error, timeout: Duration) -> AuditError {
    let err = err.without_url();
    if err.is_timeout() {
        AuditError::Timeout(timeout)
    } else {
        AuditError::Transport(err.to_string())
    }
}

/// Try each address in turn until one accepts; all attempts share one `budget`
fn connect_within(addrs: impl IntoIterator<Item = SocketAddr>, budget: Duration) -> bool {
    let deadline = Instant::now() + budget;
    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        if TcpStream::connect_timeout(&addr, remaining).is_ok() {
            return true;
        }
    }
    false
}

/// Directory backed by a Firestore collection
#[derive(Debug, Clone)]
pub struct FirestoreDirectory {
    http: FirestoreClient,
    collection: String,
    fields: DirectoryFieldNames,
    reachability_host: Option<(String, u16)>,
}

impl FirestoreDirectory {
    /// Build the directory client; fails only if the HTTP client cannot be constructed
    pub fn new(config: &FirestoreConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let reachability_host = Url::parse(&config.base_url).ok().and_then(|url| {
            let host = url.host_str()?.to_string();
            let port = url.port_or_known_default()?;
            Some((host, port))
        });
        Ok(Self {
            http: FirestoreClient::new(config, timeout)?,
            collection: config.directory_collection.clone(),
            fields: config.fields.clone(),
            reachability_host,
        })
    }
}

impl DirectoryClient for FirestoreDirectory {
    fn is_reachable(&self) -> bool {
        let Some((host, port)) = &self.reachability_host else {
            return false;
        };
        let addrs = match (host.as_str(), *port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(err) => {
                debug!(host = %host, error = %err, "Directory host did not resolve");
                return false;
            }
        };
        if connect_within(addrs, self.http.timeout) {
            return true;
        }
        debug!(host = %host, "Directory host not reachable");
        false
    }

    fn lookup(&self, badge: &BadgeId) -> Result<LookupOutcome, DirectoryError> {
        let url = self.http.url(&format!("{}/{}", self.collection, badge));
        debug!(collection = %self.collection, badge = %badge, "Directory lookup");

        let response = self
            .http
            .client
            .get(url)
            .send()
            .map_err(|err| directory_error(err, self.http.timeout))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(LookupOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(DirectoryError::Rejected { status: status.as_u16() });
        }

        let body = response.text().map_err(|err| directory_error(err, self.http.timeout))?;
        Ok(parse_document(&body, &self.fields))
    }
}

/// Audit trail backed by a Firestore collection
#[derive(Debug, Clone)]
pub struct FirestoreAuditLog {
    http: FirestoreClient,
    collection: String,
}

impl FirestoreAuditLog {
    /// Build the audit client; fails only if the HTTP client cannot be constructed
    pub fn new(config: &FirestoreConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: FirestoreClient::new(config, timeout)?,
            collection: config.audit_collection.clone(),
        })
    }
}

impl AuditLogger for FirestoreAuditLog {
    fn submit(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let url = self.http.url(&self.collection);
        let response = self
            .http
            .client
            .post(url)
            .json(&audit_document(record))
            .send()
            .map_err(|err| audit_error(err, self.http.timeout))?;

        let status = response.status();
        if status.is_success() {
            debug!(collection = %self.collection, "Audit document created");
            Ok(())
        } else {
            Err(AuditError::Rejected { status: status.as_u16() })
        }
    }
}
