use crate::client::controller::{FetchError, PageFetcher};
use crate::domain::criteria::FilterCriteria;
use crate::query::pagination::ResultPage;
use std::time::Duration;

/// [`PageFetcher`] over the JSON API.
pub struct HttpPageFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpPageFetcher {
    /// `base_url` without a trailing slash, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("default reqwest client");
        HttpPageFetcher {
            client,
            base_url: base_url.into(),
        }
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&mut self, criteria: &FilterCriteria, page: u32) -> Result<ResultPage, FetchError> {
        let mut pairs = criteria.to_query_pairs();
        pairs.push(("page", page.to_string()));

        let url = format!("{}/api/facilities", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&pairs)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Server(status.as_u16()));
        }

        response
            .json::<ResultPage>()
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}
