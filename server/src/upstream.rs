/// Upstream vendor clients
/// One reqwest client per vendor, fixed timeout on every call. Failures
/// collapse into a small taxonomy the dispatcher maps onto the envelope;
/// a timeout or transport fault never escapes as-is.

use dispatch_core::address;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::dispatch::JobLookup;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("upstream returned an unparseable body: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

async fn json_body(response: reqwest::Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status { status, body });
    }
    response
        .json()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// Booking vendor client. Every call carries the pre-issued bearer
/// credential; the vendor answers JSON everywhere except cancel, which
/// replies with free text.
#[derive(Clone)]
pub struct BookingApi {
    client: Client,
    base: String,
    token: String,
}

impl BookingApi {
    pub fn new(base: &str, token: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base: base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// POST /Job/CreateOnlineJob
    pub async fn create_job(&self, payload: &Value) -> Result<Value, UpstreamError> {
        let url = format!("{}/Job/CreateOnlineJob", self.base);
        let response = self
            .client
            .post(&url)
            .header("accept", "text/plain")
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;
        json_body(response).await
    }

    /// GET /Job/GetOnlineJobs, keyed by job reference or phone number
    pub async fn get_jobs(&self, lookup: &JobLookup) -> Result<Value, UpstreamError> {
        let url = match lookup {
            JobLookup::Reference(reference) => format!(
                "{}/Job/GetOnlineJobs?jobNO={}",
                self.base,
                urlencoding::encode(reference)
            ),
            JobLookup::Phone(phone) => format!(
                "{}/Job/GetOnlineJobs?phoneNumber={}",
                self.base,
                urlencoding::encode(phone)
            ),
        };
        let response = self
            .client
            .get(&url)
            .header("accept", "text/plain")
            .bearer_auth(&self.token)
            .send()
            .await?;
        json_body(response).await
    }

    /// PUT /Job/UpdateJob with a sparse payload
    pub async fn update_job(&self, payload: &Value) -> Result<Value, UpstreamError> {
        let url = format!("{}/Job/UpdateJob", self.base);
        let response = self
            .client
            .put(&url)
            .header("accept", "text/plain")
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;
        json_body(response).await
    }

    /// POST /Job/CancelJob. The body comes back as free text; the caller
    /// classifies it.
    pub async fn cancel_job(
        &self,
        lookup: &JobLookup,
        company_id: u32,
    ) -> Result<String, UpstreamError> {
        let url = match lookup {
            JobLookup::Reference(reference) => format!(
                "{}/Job/CancelJob?jobNo={}&companyId={}",
                self.base,
                urlencoding::encode(reference),
                company_id
            ),
            JobLookup::Phone(phone) => format!(
                "{}/Job/CancelJob?mobile={}&companyId={}",
                self.base,
                urlencoding::encode(phone),
                company_id
            ),
        };
        let response = self
            .client
            .post(&url)
            .header("accept", "text/plain")
            .bearer_auth(&self.token)
            .body("")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }
        response
            .text()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// GET /Job/GetDriverCurrentLocationForJob/{reference}
    pub async fn driver_location(&self, reference: &str) -> Result<Value, UpstreamError> {
        let url = format!(
            "{}/Job/GetDriverCurrentLocationForJob/{}",
            self.base,
            urlencoding::encode(reference)
        );
        let response = self
            .client
            .get(&url)
            .header("accept", "text/plain")
            .bearer_auth(&self.token)
            .send()
            .await?;
        json_body(response).await
    }
}

/// Address validation vendor client.
#[derive(Clone)]
pub struct AddressApi {
    client: Client,
    base: String,
}

impl AddressApi {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// POST /address/validate with the one-shot flattening fallback.
    /// The payload is flat by construction here, but the validator still
    /// occasionally rejects a shape with a schema complaint naming
    /// `address_lines`; when it does, re-send the flattened payload once
    /// and never a second time.
    pub async fn validate(
        &self,
        lines: &[String],
        postcode: Option<&str>,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}/address/validate", self.base);
        let payload = serde_json::json!({
            "address_lines": lines,
            "postcode": postcode,
        });

        let response = self.client.post(&url).json(&payload).send().await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            if address::is_schema_complaint(&body) {
                tracing::warn!("⚠ Validator rejected payload shape, retrying once: {}", body);
                let retry = self.client.post(&url).json(&payload).send().await?;
                // A second 422 surfaces as a normal failure
                return json_body(retry).await;
            }
            return Err(UpstreamError::Status {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body,
            });
        }

        json_body(response).await
    }
}

/// Outcome of a pricing webhook call: the endpoint answers either with
/// structured data or with plain text.
#[derive(Debug)]
pub enum PricingReply {
    Json(Value),
    Text(String),
}

/// Pricing webhook client. Fire-and-classify, no retry.
#[derive(Clone)]
pub struct PricingWebhook {
    client: Client,
    url: String,
}

impl PricingWebhook {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.to_string(),
        })
    }

    pub async fn check(&self, payload: &Value) -> Result<PricingReply, UpstreamError> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        if content_type.contains("application/json") {
            response
                .json()
                .await
                .map(PricingReply::Json)
                .map_err(|e| UpstreamError::Decode(e.to_string()))
        } else {
            response
                .text()
                .await
                .map(PricingReply::Text)
                .map_err(|e| UpstreamError::Decode(e.to_string()))
        }
    }
}
