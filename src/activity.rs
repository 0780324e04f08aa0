//! Activity log kept in an Elasticsearch index.
//!
//! Every document carries a `kind`, the `input` the user submitted, the
//! `output` they were shown and the `at` timestamp used for ordering.

use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ActivityLogError;

/// number of events returned by [`ActivityLog::recent`]
pub const RECENT_LIMIT: usize = 20;

#[derive(Clone)]
pub struct ActivityLog {
    client: Client,
    index_url: String,
}

impl ActivityLog {
    pub fn new(node: &str, index: &str, api_key: &str, timeout: Duration) -> color_eyre::Result<Self> {
        Ok(
            Self {
                client: Client::builder()
                    .default_headers(Self::default_headers(api_key)?)
                    .timeout(timeout)
                    .build()?,
                index_url: format!("{}/{}", node.trim_end_matches('/'), index),
            }
        )
    }

    fn default_headers(api_key: &str) -> color_eyre::Result<HeaderMap> {
        let mut auth = HeaderValue::from_str(&format!("ApiKey {}", api_key))?;
        auth.set_sensitive(true);
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, auth);
        Ok(map)
    }

    /// index one event document as-is
    pub async fn record<T: Serialize + ?Sized>(&self, doc: &T) -> Result<(), ActivityLogError> {
        let resp = self.client
            .post(format!("{}/_doc", self.index_url))
            .json(doc)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            warn!("activity log rejected document ({}): {}", status, body);
            return Err(ActivityLogError::Rejected { status, body });
        }
        debug!("activity recorded");
        Ok(())
    }

    /// the most recent events, newest first, each flattened to `{"id": _id, ..._source}`
    pub async fn recent(&self) -> Result<Vec<Value>, ActivityLogError> {
        let query = json!({
            "size": RECENT_LIMIT,
            "sort": [{ "at": { "order": "desc" } }],
            "query": { "match_all": {} },
        });
        let resp = self.client
            .post(format!("{}/_search", self.index_url))
            .json(&query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(ActivityLogError::Rejected { status, body });
        }

        let found = resp.json::<SearchHits>()
            .await
            .map_err(ActivityLogError::Payload)?;
        Ok(found.hits.hits.into_iter().map(Hit::flatten).collect())
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: HitList,
}

#[derive(Debug, Default, Deserialize)]
struct HitList {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}

impl Hit {
    fn flatten(self) -> Value {
        let mut doc = Map::with_capacity(self.source.len() + 1);
        doc.insert("id".to_string(), Value::String(self.id));
        doc.extend(self.source);
        Value::Object(doc)
    }
}
