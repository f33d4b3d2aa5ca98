use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use md5::{Digest, Md5};
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue},
};
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    config::Credentials,
    errors::{CatalogError, FetchError},
    info,
    types::{ContentKind, DownloadTask, FetchOptions, Quality, SearchKind},
};

use super::{CatalogClient, transfer};

const API_URL: &str = "https://www.qobuz.com/api.json/0.2";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:83.0) Gecko/20100101 Firefox/83.0";
const PAGE_LIMIT: usize = 500;
const MAX_ATTEMPTS: u32 = 3;
// any public track works; only the signature is checked
const PROBE_TRACK_ID: &str = "5966783";

pub struct QobuzClient {
    http: Client,
    pub(super) transfer: Client,
    pub(super) chunk_timeout: Duration,
    app_id: String,
    secret: String,
}

impl QobuzClient {
    /// Logs in and selects the first app secret able to sign requests.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Auth`] for wrong credentials, an invalid app id,
    ///   free accounts, or when none of the secrets is accepted
    /// - [`CatalogError::Http`] for network failures
    pub async fn login(credentials: &Credentials, timeout: Duration) -> Result<Self, CatalogError> {
        let anonymous = build_client(&credentials.app_id, None, Some(timeout))?;
        let response = anonymous
            .get(format!("{API_URL}/user/login"))
            .query(&[
                ("email", credentials.email.as_str()),
                ("password", md5_hex(&credentials.password).as_str()),
                ("app_id", credentials.app_id.as_str()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(CatalogError::Auth("invalid email or password".to_string()));
            }
            StatusCode::BAD_REQUEST => {
                return Err(CatalogError::Auth("invalid app id".to_string()));
            }
            _ => {}
        }

        let json: Value = response.error_for_status()?.json().await?;
        if json["user"]["credential"]["parameters"].is_null() {
            return Err(CatalogError::Auth(
                "free accounts are not eligible to download tracks".to_string(),
            ));
        }

        let token = json["user_auth_token"]
            .as_str()
            .ok_or_else(|| CatalogError::Malformed("login response without token".to_string()))?;

        let mut client = Self {
            http: build_client(&credentials.app_id, Some(token), Some(timeout))?,
            transfer: build_client(&credentials.app_id, Some(token), None)?,
            chunk_timeout: timeout,
            app_id: credentials.app_id.clone(),
            secret: String::new(),
        };

        let membership = json["user"]["credential"]["label"]
            .as_str()
            .unwrap_or("unknown");
        info!("Logged in to Qobuz ({} membership)", membership);

        client.secret = client.pick_secret(&credentials.secrets).await?;
        Ok(client)
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    async fn pick_secret(&self, secrets: &[String]) -> Result<String, CatalogError> {
        for secret in secrets {
            match self
                .signed_file_url(PROBE_TRACK_ID, Quality::Mp3, secret)
                .await
            {
                Ok(_) => return Ok(secret.clone()),
                Err(CatalogError::Api { status: 400, .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(CatalogError::Auth(
            "none of the configured app secrets is valid".to_string(),
        ))
    }

    /// GET request against the API. Retries 502 Bad Gateway a few times
    /// before giving up.
    pub(super) async fn api_get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, CatalogError> {
        let api_url = format!("{API_URL}/{endpoint}");
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self.http.get(&api_url).query(params).send().await?;
            let status = response.status();

            if status == StatusCode::BAD_GATEWAY && attempt < MAX_ATTEMPTS {
                sleep(Duration::from_secs(2 * u64::from(attempt))).await;
                continue; // retry
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| v["message"].as_str().map(String::from))
                    .unwrap_or(body);
                return Err(CatalogError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json::<Value>().await?);
        }
    }

    pub(super) async fn file_url(
        &self,
        track_id: &str,
        quality: Quality,
    ) -> Result<Value, CatalogError> {
        self.signed_file_url(track_id, quality, &self.secret).await
    }

    async fn signed_file_url(
        &self,
        track_id: &str,
        quality: Quality,
        secret: &str,
    ) -> Result<Value, CatalogError> {
        let timestamp = Utc::now().timestamp().to_string();
        let format_id = quality.format_id().to_string();
        let signature = md5_hex(&format!(
            "trackgetFileUrlformat_id{format_id}intentstreamtrack_id{track_id}{timestamp}{secret}"
        ));

        self.api_get(
            "track/getFileUrl",
            &[
                ("request_ts", timestamp),
                ("request_sig", signature),
                ("track_id", track_id.to_string()),
                ("format_id", format_id),
                ("intent", "stream".to_string()),
            ],
        )
        .await
    }

    async fn get_container(
        &self,
        kind: ContentKind,
        id: &str,
        items_key: &'static str,
    ) -> Result<Value, CatalogError> {
        let endpoint = format!("{kind}/get");
        let id_key = format!("{kind}_id");
        let mut offset = 0;
        let mut merged: Option<Value> = None;

        loop {
            let page = self
                .api_get(
                    &endpoint,
                    &[
                        (id_key.as_str(), id.to_string()),
                        ("extra", items_key.to_string()),
                        ("limit", PAGE_LIMIT.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;

            let items = page[items_key]["items"]
                .as_array()
                .cloned()
                .unwrap_or_default();
            let total = page[items_key]["total"].as_u64().unwrap_or(0) as usize;
            let fetched = items.len();

            match merged.as_mut() {
                None => merged = Some(page),
                Some(first) => {
                    if let Some(list) = first[items_key]["items"].as_array_mut() {
                        list.extend(items);
                    }
                }
            }

            offset += fetched;
            if fetched == 0 || offset >= total {
                break;
            }
        }

        merged.ok_or_else(|| CatalogError::Malformed(format!("empty response for {kind} {id}")))
    }
}

#[async_trait]
impl CatalogClient for QobuzClient {
    async fn get_metadata(&self, kind: ContentKind, id: &str) -> Result<Value, CatalogError> {
        match kind.container_items_key() {
            Some(items_key) => self.get_container(kind, id, items_key).await,
            None => {
                let id_key = format!("{kind}_id");
                self.api_get(&format!("{kind}/get"), &[(id_key.as_str(), id.to_string())])
                    .await
            }
        }
    }

    async fn search(
        &self,
        kind: SearchKind,
        query: &str,
        limit: u32,
    ) -> Result<Value, CatalogError> {
        self.api_get(
            &format!("{kind}/search"),
            &[("query", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn fetch_content(
        &self,
        task: &DownloadTask,
        options: &FetchOptions,
    ) -> Result<(), FetchError> {
        transfer::fetch(self, task, options).await
    }
}

fn build_client(
    app_id: &str,
    token: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Client, CatalogError> {
    let invalid = |what: &str| CatalogError::Auth(format!("{what} is not a valid header value"));

    let mut headers = HeaderMap::new();
    headers.insert(
        "X-App-Id",
        HeaderValue::from_str(app_id).map_err(|_| invalid("app id"))?,
    );
    if let Some(token) = token {
        headers.insert(
            "X-User-Auth-Token",
            HeaderValue::from_str(token).map_err(|_| invalid("auth token"))?,
        );
    }

    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

pub(super) fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}
