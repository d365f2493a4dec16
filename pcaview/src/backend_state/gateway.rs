//! HTTP client for the PCA service.
//!
//! Every call is one blocking request/response and runs on the backend
//! thread. Datasets travel as JSON arrays of records.

use std::{fmt, time::Duration};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use table_io::Table;

use crate::state::{
    artifact::PcaDim,
    payload::{PlotPayload, TopContributors},
};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("could not reach {url}: {message}")]
    Transport { url: String, message: String },
    #[error("{url} answered with status {code}")]
    Status { code: u16, url: String },
    #[error("unexpected answer from {url}: {source}")]
    Decode {
        url: String,
        source: std::io::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    GenerateData,
    ScreePlot,
    Pca2d,
    Pca3d,
    LoadingsTable,
    TopContributors,
    StoredData,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::GenerateData => "/api/generate_data",
            Endpoint::ScreePlot => "/api/generate_scree_plot",
            Endpoint::Pca2d => "/api/generate_pca",
            Endpoint::Pca3d => "/api/generate_pca_3d",
            Endpoint::LoadingsTable => "/api/generate_loadings_table",
            Endpoint::TopContributors => "/api/generate_top_five_contributors",
            Endpoint::StoredData => "/api/getDataFromDB",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl From<PcaDim> for Endpoint {
    fn from(dim: PcaDim) -> Self {
        match dim {
            PcaDim::Two => Endpoint::Pca2d,
            PcaDim::Three => Endpoint::Pca3d,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Gateway {
    agent: ureq::Agent,
    base_url: String,
}

impl Gateway {
    /// `timeout` bounds each request as a whole; `None` waits forever.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    pub fn generate_data(&self) -> Result<Table, GatewayError> {
        self.get(Endpoint::GenerateData)
    }

    pub fn scree_plot(&self, data: &Table) -> Result<PlotPayload, GatewayError> {
        self.post(Endpoint::ScreePlot, data)
    }

    pub fn pca(&self, data: &Table, dim: PcaDim) -> Result<PlotPayload, GatewayError> {
        self.post(dim.into(), data)
    }

    pub fn loadings_table(&self, data: &Table) -> Result<Table, GatewayError> {
        self.post(Endpoint::LoadingsTable, data)
    }

    pub fn top_contributors(&self, data: &Table) -> Result<TopContributors, GatewayError> {
        self.post(Endpoint::TopContributors, data)
    }

    /// Dataset stored on the server under `id`.
    pub fn data_from_db(&self, id: &str) -> Result<Table, GatewayError> {
        self.post(Endpoint::StoredData, &json!({ "config": id }))
    }

    fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, GatewayError> {
        let url = self.url(endpoint);
        log::debug!("GET {}", url);
        let response = self.agent.get(&url).call();
        decode(url, response)
    }

    fn post<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        log::debug!("POST {}", url);
        let response = self.agent.post(&url).send_json(body);
        decode(url, response)
    }
}

fn decode<T: DeserializeOwned>(
    url: String,
    response: Result<ureq::Response, ureq::Error>,
) -> Result<T, GatewayError> {
    match response {
        Ok(response) => response
            .into_json()
            .map_err(|source| GatewayError::Decode { url, source }),
        Err(ureq::Error::Status(code, _)) => Err(GatewayError::Status { code, url }),
        Err(ureq::Error::Transport(transport)) => Err(GatewayError::Transport {
            url,
            message: transport.to_string(),
        }),
    }
}
