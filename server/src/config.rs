/// Environment-derived configuration
/// The bearer credential is the one fatal requirement: no booking
/// operation can proceed without it, so its absence fails startup
/// instead of failing the first call.

use anyhow::{anyhow, Result};
use dispatch_core::{DispatchDefaults, ValidationMode};
use std::time::Duration;

const DEFAULT_ADDRESS_API_BASE: &str = "https://online.ontimechauffeurs.co.uk/api";
const DEFAULT_BOOKING_API_BASE: &str = "https://capi.cabee-est.com/api";
const DEFAULT_PRICING_WEBHOOK_URL: &str =
    "https://hook.eu2.make.com/7k8jjdhuqbuyywi3mkuwmm9rd6t1fpzi";

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub bearer_token: String,
    pub address_api_base: String,
    pub booking_api_base: String,
    pub pricing_webhook_url: String,
    pub port: u16,
    pub upstream_timeout: Duration,
    pub validation_mode: ValidationMode,
    pub defaults: DispatchDefaults,
}

impl DispatcherConfig {
    pub fn from_env() -> Result<Self> {
        let bearer_token = std::env::var("BOOKING_API_TOKEN")
            .map_err(|_| anyhow!("BOOKING_API_TOKEN environment variable not set"))?;

        let address_api_base = std::env::var("ADDRESS_API_BASE")
            .unwrap_or_else(|_| DEFAULT_ADDRESS_API_BASE.to_string());
        let booking_api_base = std::env::var("BOOKING_API_BASE")
            .unwrap_or_else(|_| DEFAULT_BOOKING_API_BASE.to_string());
        let pricing_webhook_url = std::env::var("PRICING_WEBHOOK_URL")
            .unwrap_or_else(|_| DEFAULT_PRICING_WEBHOOK_URL.to_string());

        let port = std::env::var("DISPATCHER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .unwrap_or(8080);

        let timeout_secs = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .unwrap_or(30);

        let validation_mode = match std::env::var("VALIDATION_MODE")
            .unwrap_or_else(|_| "tolerant".to_string())
            .to_lowercase()
            .as_str()
        {
            "strict" => ValidationMode::Strict,
            _ => ValidationMode::Tolerant,
        };

        Ok(Self {
            bearer_token,
            address_api_base,
            booking_api_base,
            pricing_webhook_url,
            port,
            upstream_timeout: Duration::from_secs(timeout_secs),
            validation_mode,
            defaults: DispatchDefaults::default(),
        })
    }
}
