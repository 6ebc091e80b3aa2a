//! Broker REST client.
//!
//! Every request carries HTTP basic auth from the run's credentials. A
//! non-success status is logged with its headers and body, and the body is
//! still handed back to the caller; only transport failures are errors.

use std::collections::BTreeMap;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use tracing::{debug, warn};

use super::{Broker, GatewayError, Management};
use crate::credentials::BrokerCredentials;

#[derive(Debug, Clone)]
pub struct BrokerClient {
  http: Client,
  base_url: String,
  credentials: BrokerCredentials,
}

impl BrokerClient {
  pub fn new(base_url: impl Into<String>, credentials: BrokerCredentials) -> Self {
    Self {
      http: Client::new(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      credentials,
    }
  }

  /// Look up the broker's registered URL and build a client for it.
  pub async fn connect<M: Management>(management: &M, credentials: BrokerCredentials) -> Result<Self, GatewayError> {
    let url = management.service_broker_url(&credentials.broker).await?;
    debug!(broker = %credentials.broker, url = %url, "resolved broker url");
    Ok(Self::new(url, credentials))
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
    let url = self.url(path);
    let builder = self
      .http
      .request(method, &url)
      .basic_auth(&self.credentials.username, Some(&self.credentials.password));
    (url, builder)
  }

  async fn send(&self, url: &str, request: RequestBuilder) -> Result<String, GatewayError> {
    let response = request.send().await.map_err(|e| GatewayError::RequestFailed {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await.map_err(|e| GatewayError::RequestFailed {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    if !status.is_success() {
      warn!(url = %url, status = %status, headers = ?headers, body = %body, "broker returned non-success status");
    } else {
      debug!(url = %url, status = %status, "broker request complete");
    }

    Ok(body)
  }

  async fn get_json(&self, path: &str) -> Result<serde_json::Value, GatewayError> {
    let (url, request) = self.request(Method::GET, path);
    let body = self.send(&url, request).await?;
    serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse {
      url,
      message: e.to_string(),
    })
  }
}

impl Broker for BrokerClient {
  fn base_url(&self) -> &str {
    &self.base_url
  }

  async fn add_catalog(&self, document: String) -> Result<String, GatewayError> {
    let (url, request) = self.request(Method::POST, "create");
    let request = request
      .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(document);
    self.send(&url, request).await
  }

  async fn delete_catalog(&self, name: &str, version: &str) -> Result<String, GatewayError> {
    let (url, request) = self.request(Method::DELETE, &format!("delete/{}/{}/", name, version));
    self.send(&url, request).await
  }

  async fn effectors(&self, guid: &str) -> Result<serde_json::Value, GatewayError> {
    self.get_json(&format!("effectors/{}", guid)).await
  }

  async fn invoke(
    &self,
    guid: &str,
    entity_type: &str,
    effector: &str,
    params: &BTreeMap<String, String>,
  ) -> Result<String, GatewayError> {
    let (url, request) = self.request(Method::POST, &format!("invoke/{}/{}/{}", guid, entity_type, effector));
    self.send(&url, request.json(params)).await
  }

  async fn sensors(&self, guid: &str) -> Result<serde_json::Value, GatewayError> {
    self.get_json(&format!("sensors/{}", guid)).await
  }

  async fn is_running(&self, guid: &str) -> Result<bool, GatewayError> {
    let (url, request) = self.request(Method::GET, &format!("is-running/{}", guid));
    let body = self.send(&url, request).await?;
    Ok(parse_is_running(&body, &url))
  }
}

/// Interpret a readiness probe body. Anything but a literal boolean counts as
/// not running.
fn parse_is_running(body: &str, url: &str) -> bool {
  match body.trim().parse::<bool>() {
    Ok(running) => running,
    Err(_) => {
      warn!(url = %url, body = %body, "unexpected readiness response, treating as not running");
      false
    }
  }
}
