//! Paginated REST client for Airtable-compatible table APIs.

use derive_debug::Dbg;
use serde::Deserialize;
use tracing::{debug, trace};

use super::{Row, RowSource, TableQuery};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid endpoint ({endpoint}): {error}")]
    InvalidEndpoint {
        endpoint: String,
        error: url::ParseError,
    },
    #[error("endpoint cannot carry a path ({0})")]
    CannotBeABase(String),
    #[error("failed to fetch page ({url}): {error}")]
    Fetch { url: url::Url, error: reqwest::Error },
    #[error("failed to decode page ({url}): {error}")]
    Decode { url: url::Url, error: reqwest::Error },
}

#[derive(Deserialize)]
struct Page {
    records: Vec<Row>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Dbg)]
pub struct RestRowSource {
    #[dbg(skip)]
    client: reqwest::Client,
    endpoint: String,
    #[dbg(skip)]
    api_key: String,
}

impl RestRowSource {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, base_id: &str, table_name: &str) -> Result<url::Url, Error> {
        let mut url =
            url::Url::parse(&self.endpoint).map_err(|error| Error::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                error,
            })?;
        url.path_segments_mut()
            .map_err(|_| Error::CannotBeABase(self.endpoint.clone()))?
            .pop_if_empty()
            .push(base_id)
            .push(table_name);
        Ok(url)
    }
}

fn page_url(table_url: &url::Url, query: &TableQuery<'_>, offset: Option<&str>) -> url::Url {
    let mut url = table_url.clone();
    let view = query.view.into_iter().map(|view| ("view", view));
    let fields = query
        .fields
        .unwrap_or_default()
        .iter()
        .map(|field| ("fields[]", field.as_str()));
    let offset = offset.into_iter().map(|offset| ("offset", offset));
    let pairs = view.chain(fields).chain(offset).collect::<Vec<_>>();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

impl RowSource for RestRowSource {
    type Error = Error;

    async fn select(&self, query: TableQuery<'_>) -> Result<Vec<Row>, Self::Error> {
        let table_url = self.table_url(query.base_id, query.table_name)?;
        let mut rows = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let url = page_url(&table_url, &query, offset.as_deref());
            trace!(%url, "fetch page");
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&self.api_key)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|error| Error::Fetch {
                    url: url.clone(),
                    error,
                })?;
            let page: Page = response
                .json()
                .await
                .map_err(|error| Error::Decode { url, error })?;
            rows.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        debug!(
            base = query.base_id,
            table = query.table_name,
            rows = rows.len(),
            "selected rows"
        );
        Ok(rows)
    }
}
