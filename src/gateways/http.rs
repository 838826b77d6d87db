use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{GatewayError, InboundResponse, NetworkGateway, OutboundRequest};
use crate::request_policy::Payload;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Real outbound HTTP through reqwest.
#[derive(Debug, Clone, Default)]
pub struct ReqwestGateway {
    client: reqwest::Client,
}

impl ReqwestGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NetworkGateway for ReqwestGateway {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, GatewayError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| GatewayError::InvalidMethod(request.method.clone()))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(REQUEST_TIMEOUT);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(Payload::Json(value)) => builder.json(&value),
            Some(Payload::Text(text)) => builder.body(text),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;
        debug!(target: "network", url = %request.url, status, "response received");

        Ok(InboundResponse { status, headers, body })
    }
}
