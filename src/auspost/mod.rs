use std::time::Duration;

use log::{debug, error, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;

use crate::auspost::model::{Locality, SearchResponse};
use crate::error::DirectoryError;

pub mod model;

/// HTTP client for the Australia Post locality directory
#[derive(Clone)]
pub struct LocalityDirectory {
    client: Client,
    base_url: String,
}

impl LocalityDirectory {
    pub fn new(base_url: impl Into<String>, token: &str, timeout: Duration) -> color_eyre::Result<Self> {
        Ok(
            Self {
                client: Client::builder()
                    .default_headers(Self::default_headers(token)?)
                    .timeout(timeout)
                    .build()?,
                base_url: base_url.into(),
            }
        )
    }

    fn default_headers(token: &str) -> color_eyre::Result<HeaderMap> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))?;
        auth.set_sensitive(true);
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, auth);
        Ok(map)
    }

    /// search the directory with free text, optionally restricted to one state
    ///
    /// * `text` - suburb name, postcode or fragment thereof, omitted from the query when empty
    /// * `state` - state/territory code, omitted from the query when `None`
    pub async fn search(&self, text: &str, state: Option<&str>) -> Result<Vec<Locality>, DirectoryError> {
        let mut query = Vec::with_capacity(2);
        if !text.is_empty() {
            query.push(("q", text));
        }
        if let Some(state) = state {
            query.push(("state", state));
        }

        let request = self.client
            .get(&self.base_url)
            .query(&query)
            .build()
            .map_err(DirectoryError::Unreachable)?;
        info!("calling locality directory: {}", request.url());

        let resp = self.client
            .execute(request)
            .await
            .map_err(|e| {
                error!("locality directory unreachable: {:?}", e);
                DirectoryError::Unreachable(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            error!("locality directory error: {}", status);
            return Err(DirectoryError::Status(status));
        }

        let body = resp.json::<SearchResponse>()
            .await
            .map_err(DirectoryError::Payload)?;
        let localities = body.into_localities();
        debug!("locality directory returned [{}] localities for [{}]", localities.len(), text);
        Ok(localities)
    }

    /// all localities registered under `postcode`
    pub async fn by_postcode(&self, postcode: &str) -> Result<Vec<Locality>, DirectoryError> {
        self.search(postcode, None).await
    }
}
