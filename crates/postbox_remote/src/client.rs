//! HTTP client for the Postmark templates API.

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::service::TemplateService;
use crate::types::{
    RemoteTemplate, TemplateList, TemplatePayload, ValidationPayload, ValidationResponse,
};

const TOKEN_HEADER: &str = "X-Postmark-Server-Token";
const PAGE_SIZE: u64 = 500;
const TEMPLATE_NOT_FOUND: i64 = 1101;

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    message: String,
}

/// Server-scoped API client.
pub struct ServerClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ServerClient {
    pub fn new(config: ClientConfig) -> RemoteResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("postbox/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url(), path);
        debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header(TOKEN_HEADER, &self.config.server_token)
            .header(header::ACCEPT, "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, target: &str) -> RemoteResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body, target))
    }
}

fn api_error(status: StatusCode, body: &str, target: &str) -> RemoteError {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
    let (error_code, message) = match parsed {
        Some(err) if !err.message.is_empty() => (err.error_code, err.message),
        Some(err) => (err.error_code, status.to_string()),
        None if body.trim().is_empty() => (0, status.to_string()),
        None => (0, body.trim().to_string()),
    };

    if status == StatusCode::NOT_FOUND || error_code == TEMPLATE_NOT_FOUND {
        return RemoteError::NotFound(target.to_string());
    }

    RemoteError::Api {
        status: status.as_u16(),
        error_code,
        message,
    }
}

#[async_trait]
impl TemplateService for ServerClient {
    async fn validate_template(&self, payload: &ValidationPayload) -> RemoteResult<ValidationResponse> {
        let request = self.request(Method::POST, "/templates/validate").json(payload);
        self.send(request, "validate").await
    }

    async fn list_templates(&self) -> RemoteResult<TemplateList> {
        let mut all = TemplateList::default();
        let mut offset = 0;

        loop {
            let request = self
                .request(Method::GET, "/templates")
                .query(&[("count", PAGE_SIZE), ("offset", offset)]);
            let page: TemplateList = self.send(request, "templates").await?;
            let fetched = page.templates.len() as u64;

            all.total_count = page.total_count;
            all.templates.extend(page.templates);
            offset += fetched;

            if fetched == 0 || offset >= all.total_count {
                break;
            }
        }

        debug!("Listed {} templates", all.templates.len());
        Ok(all)
    }

    async fn get_template(&self, id_or_alias: &str) -> RemoteResult<RemoteTemplate> {
        let request = self.request(Method::GET, &format!("/templates/{}", id_or_alias));
        self.send(request, id_or_alias).await
    }

    async fn create_template(&self, payload: &TemplatePayload) -> RemoteResult<RemoteTemplate> {
        let request = self.request(Method::POST, "/templates").json(payload);
        self.send(request, &payload.alias).await
    }

    async fn update_template(
        &self,
        id_or_alias: &str,
        payload: &TemplatePayload,
    ) -> RemoteResult<RemoteTemplate> {
        let request = self
            .request(Method::PUT, &format!("/templates/{}", id_or_alias))
            .json(payload);
        self.send(request, id_or_alias).await
    }
}
