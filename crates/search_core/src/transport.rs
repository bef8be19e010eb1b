use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{City, CityId, Course, Region},
    error::ServiceErrorBody,
    protocol::{RankingRequest, RankingResponse},
};
use tracing::debug;
use url::Url;

use crate::{config::Settings, error::QueryError, query::Slot};

#[async_trait]
pub trait GeographyService: Send + Sync {
    async fn list_cities(&self, region: Region) -> Result<Vec<City>, QueryError>;
}

#[async_trait]
pub trait RankingBackend: Send + Sync {
    async fn list_courses(&self, city: &CityId) -> Result<Vec<Course>, QueryError>;
    async fn fetch_ranking(&self, request: &RankingRequest)
        -> Result<RankingResponse, QueryError>;
}

pub fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build http client")
}

pub struct HttpGeographyService {
    http: Client,
    base_url: Url,
}

impl HttpGeographyService {
    pub fn new(http: Client, base_url: Url) -> anyhow::Result<Self> {
        ensure_base(&base_url)?;
        Ok(Self { http, base_url })
    }

    pub fn from_settings(http: Client, settings: &Settings) -> anyhow::Result<Self> {
        Self::new(http, settings.geography_base()?)
    }
}

#[async_trait]
impl GeographyService for HttpGeographyService {
    async fn list_cities(&self, region: Region) -> Result<Vec<City>, QueryError> {
        let url = endpoint(&self.base_url, &["cities"]);
        debug!(%url, %region, "http: listing cities");
        let res = self
            .http
            .get(url)
            .query(&[("region", region.code())])
            .send()
            .await;
        read_json(Slot::Cities, res).await
    }
}

pub struct HttpRankingBackend {
    http: Client,
    base_url: Url,
}

impl HttpRankingBackend {
    pub fn new(http: Client, base_url: Url) -> anyhow::Result<Self> {
        ensure_base(&base_url)?;
        Ok(Self { http, base_url })
    }

    pub fn from_settings(http: Client, settings: &Settings) -> anyhow::Result<Self> {
        Self::new(http, settings.ranking_base()?)
    }
}

#[async_trait]
impl RankingBackend for HttpRankingBackend {
    async fn list_courses(&self, city: &CityId) -> Result<Vec<Course>, QueryError> {
        let url = endpoint(&self.base_url, &["courses", city.as_str()]);
        debug!(%url, "http: listing courses");
        let res = self.http.get(url).send().await;
        read_json(Slot::Courses, res).await
    }

    async fn fetch_ranking(
        &self,
        request: &RankingRequest,
    ) -> Result<RankingResponse, QueryError> {
        // The backend routes the trailing-slash form.
        let url = endpoint(&self.base_url, &["ranking", ""]);
        debug!(%url, city = %request.municipio_id, course = %request.curso_nome, "http: requesting ranking");
        let res = self.http.post(url).json(request).send().await;
        read_json(Slot::Ranking, res).await
    }
}

fn ensure_base(base_url: &Url) -> anyhow::Result<()> {
    if base_url.cannot_be_a_base() {
        bail!("url cannot be used as a base: {base_url}");
    }
    Ok(())
}

fn endpoint(base_url: &Url, segments: &[&str]) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

async fn read_json<T: DeserializeOwned>(
    slot: Slot,
    res: Result<Response, reqwest::Error>,
) -> Result<T, QueryError> {
    let res = res.map_err(|err| classify_send_error(slot, err))?;
    let status = res.status();

    if !status.is_success() {
        let body = res.bytes().await.unwrap_or_default();
        return Err(QueryError::Service {
            slot,
            status: status.as_u16(),
            message: ServiceErrorBody::message_from_bytes(&body),
        });
    }

    let body = res.bytes().await.map_err(|err| classify_send_error(slot, err))?;
    serde_json::from_slice(&body).map_err(|err| QueryError::Decode {
        slot,
        status: status.as_u16(),
        detail: err.to_string(),
    })
}

/// Errors raised before a status line was read, or while reading the body.
/// Either way no usable response was obtained.
fn classify_send_error(slot: Slot, err: reqwest::Error) -> QueryError {
    let detail = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("failed to connect: {err}")
    } else {
        err.to_string()
    };
    QueryError::Transport { slot, detail }
}
