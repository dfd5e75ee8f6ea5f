//! CouchDB store implementation
//!
//! Talks to a CouchDB-compatible server over its HTTP API with reqwest. Each
//! `DocumentStore` call is exactly one HTTP request.

mod config;

pub use config::CouchDbConfig;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::Result;
use crate::backend::errors::StoreError;
use crate::backend::{
    AllDocsRow, DocumentStore, OpenRevs, RevisionRead, ViewResult, WriteResult,
};
use crate::constants::DESIGN_PREFIX;
use crate::document::{ConflictedDocument, Document};

/// What a request addressed, used to map error statuses to `StoreError`s.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Document(&'a str),
    View { design: &'a str, view: &'a str },
    Database,
}

#[derive(Deserialize)]
struct AllDocsResponse {
    rows: Vec<AllDocsRow>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: String,
}

/// A document store backed by one database on a CouchDB-compatible server.
#[derive(Debug, Clone)]
pub struct CouchDb {
    client: Client,
    /// Database URL, e.g. `http://localhost:5984/db1`
    database_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl CouchDb {
    /// Builds a store handle. No request is made until the first call.
    ///
    /// # Errors
    /// `StoreError::InvalidConfig` when the URL cannot be parsed or used as a base.
    pub fn connect(config: CouchDbConfig) -> Result<Self> {
        let invalid = |reason: String| StoreError::InvalidConfig { reason };

        let mut database_url =
            Url::parse(&config.url).map_err(|e| invalid(format!("{}: {e}", config.url)))?;
        database_url
            .path_segments_mut()
            .map_err(|_| invalid(format!("{} cannot be a base URL", config.url)))?
            .pop_if_empty()
            .push(&config.database);

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| invalid(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            database_url,
            username: config.username,
            password: config.password,
        })
    }

    /// URL of the database itself.
    pub fn database_url(&self) -> &Url {
        &self.database_url
    }

    /// URL of one document. Design document ids keep their `_design/` segment.
    fn document_url(&self, id: &str) -> Url {
        let mut url = self.database_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            match id.strip_prefix(DESIGN_PREFIX) {
                Some(name) => segments.push("_design").push(name),
                None => segments.push(id),
            };
        }
        url
    }

    /// URL below the database, e.g. `_all_docs`.
    fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.database_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, target: Target<'_>) -> Result<T> {
        let response = self
            .authorize(request)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            debug!(status = status.as_u16(), error = %body.error, "Store request failed");
            return Err(status_error(status, body, target).into());
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse {
                reason: e.to_string(),
            }
            .into())
    }
}

fn status_error(status: StatusCode, body: ErrorBody, target: Target<'_>) -> StoreError {
    match (status, target) {
        (StatusCode::NOT_FOUND, Target::Document(id)) => StoreError::NotFound { id: id.to_string() },
        (StatusCode::NOT_FOUND, Target::View { design, view }) => StoreError::ViewNotFound {
            design: design.to_string(),
            view: view.to_string(),
        },
        (StatusCode::CONFLICT, Target::Document(id)) => StoreError::Conflict { id: id.to_string() },
        _ => StoreError::Http {
            status: status.as_u16(),
            reason: if body.reason.is_empty() {
                body.error
            } else {
                body.reason
            },
        },
    }
}

#[async_trait]
impl DocumentStore for CouchDb {
    async fn get_open_revisions(&self, id: &str, revs: OpenRevs) -> Result<Vec<RevisionRead>> {
        let open_revs = match revs {
            OpenRevs::All => "all".to_string(),
            OpenRevs::Only(revs) => serde_json::to_string(&revs)?,
        };
        let mut url = self.document_url(id);
        url.query_pairs_mut().append_pair("open_revs", &open_revs);
        self.send(self.client.get(url), Target::Document(id)).await
    }

    async fn get_with_conflicts(&self, id: &str) -> Result<ConflictedDocument> {
        let mut url = self.document_url(id);
        url.query_pairs_mut().append_pair("conflicts", "true");
        self.send(self.client.get(url), Target::Document(id)).await
    }

    async fn all_by_id(&self, keys: &[String]) -> Result<Vec<AllDocsRow>> {
        let mut url = self.endpoint_url(&["_all_docs"]);
        url.query_pairs_mut().append_pair("include_docs", "true");
        let request = self.client.post(url).json(&json!({ "keys": keys }));
        let response: AllDocsResponse = self.send(request, Target::Database).await?;
        Ok(response.rows)
    }

    async fn bulk_write(&self, docs: Vec<Document>) -> Result<Vec<WriteResult>> {
        let url = self.endpoint_url(&["_bulk_docs"]);
        let request = self.client.post(url).json(&json!({ "docs": docs }));
        self.send(request, Target::Database).await
    }

    async fn query(&self, design: &str, view: &str) -> Result<ViewResult> {
        let url = self.endpoint_url(&["_design", design, "_view", view]);
        self.send(self.client.get(url), Target::View { design, view })
            .await
    }
}
