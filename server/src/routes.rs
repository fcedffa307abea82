/// Tool-facing HTTP surface
/// Tool calls always answer 200 with a structured body. The
/// conversational layer can narrate a structured failure but not a
/// transport error, so no handler surfaces one.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use dispatch_core::{AddressValidationRequest, BookingRequest, Envelope, PricingRequest};

use crate::config::DispatcherConfig;
use crate::dispatch;
use crate::upstream::{AddressApi, BookingApi, PricingReply, PricingWebhook, UpstreamError};

#[derive(Clone)]
pub struct AppState {
    pub config: DispatcherConfig,
    pub booking: BookingApi,
    pub address: AddressApi,
    pub pricing: PricingWebhook,
}

impl AppState {
    pub fn new(config: DispatcherConfig) -> anyhow::Result<Self> {
        let timeout = config.upstream_timeout;
        Ok(Self {
            booking: BookingApi::new(&config.booking_api_base, &config.bearer_token, timeout)?,
            address: AddressApi::new(&config.address_api_base, timeout)?,
            pricing: PricingWebhook::new(&config.pricing_webhook_url, timeout)?,
            config,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/validate_address", post(validate_address))
        .route("/tools/check_pricing", post(check_pricing))
        .route("/tools/book_cab", post(book_cab))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Correlation identifier carried through every log line of one
/// invocation. Traceability only, no ordering semantics.
fn new_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "cab-dispatch-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Tool schemas as consumed by the voice-agent tool-calling layer.
async fn list_tools() -> Json<Value> {
    Json(json!({
        "tools": [
            {
                "name": "address_validate",
                "description": "Validates UK addresses including postcodes and building numbers",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "address_lines": {"type": "array", "items": {"type": "string"}},
                        "postcode": {"type": "string"},
                        "building": {"type": "string"}
                    },
                    "required": ["address_lines"]
                }
            },
            {
                "name": "checkPricing",
                "description": "Gets pricing information for a taxi journey between two addresses",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "sourceAddress": {"type": "string"},
                        "destinationAddress": {"type": "string"}
                    },
                    "required": ["sourceAddress", "destinationAddress"]
                }
            },
            {
                "name": "BookCab",
                "description": "Handles taxi bookings: create, get, update, cancel and driver location",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "operation": {
                            "type": "string",
                            "description": "One of cabBooking, getBooking, updateBooking, cancelBooking, getDriverLocation"
                        },
                        "companyId": {"type": "string"},
                        "jobNO": {"type": "string"},
                        "Phone": {"type": "string"},
                        "passengerName": {"type": "string"},
                        "passengerEmail": {"type": "string"},
                        "passengerPhone": {"type": "string"},
                        "origin": {"type": "string"},
                        "destination": {"type": "string"},
                        "date": {"type": "string"},
                        "vehicleTypeId": {"type": "string"},
                        "customerPrice": {"type": "string"},
                        "passengers": {"type": "string"},
                        "bags": {"type": "string"},
                        "note": {"type": "string"}
                    },
                    "required": ["operation"]
                }
            }
        ]
    }))
}

async fn validate_address(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddressValidationRequest>,
) -> Json<Value> {
    let call_id = new_call_id();
    tracing::info!("→ [{}] Address validation requested", call_id);

    let lines = match request.address_lines.normalize(state.config.validation_mode) {
        Ok(lines) => lines,
        Err(err) => {
            tracing::warn!("✗ [{}] {}", call_id, err);
            return Json(json!({
                "success": false,
                "error": err.to_string(),
                "candidates": [],
            }));
        }
    };
    tracing::info!("→ [{}] Validating {} address line(s)", call_id, lines.len());

    match state.address.validate(&lines, request.postcode.as_deref()).await {
        Ok(result) => {
            let found = result
                .get("candidates")
                .and_then(Value::as_array)
                .map(|c| c.len())
                .unwrap_or(0);
            tracing::info!("✓ [{}] {} address candidate(s)", call_id, found);
            Json(result)
        }
        Err(err) if err.is_not_found() => {
            tracing::warn!("✗ [{}] Address not found", call_id);
            Json(json!({
                "success": false,
                "error": "Address not found",
                "candidates": [],
            }))
        }
        Err(UpstreamError::Transport(err)) => {
            tracing::error!("✗ [{}] {}", call_id, err);
            Json(json!({
                "success": false,
                "error": "Network error during address validation",
                "candidates": [],
            }))
        }
        Err(err) => {
            tracing::error!("✗ [{}] {}", call_id, err);
            Json(json!({
                "success": false,
                "error": "Unable to validate address at the moment",
                "candidates": [],
            }))
        }
    }
}

async fn check_pricing(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PricingRequest>,
) -> Json<Value> {
    let call_id = new_call_id();
    tracing::info!(
        "→ [{}] Pricing check: {} → {}",
        call_id,
        request.source_address,
        request.destination_address
    );

    let payload = json!({
        "operation": "checkPricing",
        "companyId": state.config.defaults.company_id.to_string(),
        "sourceAddress": request.source_address,
        "destinationAddress": request.destination_address,
    });

    match state.pricing.check(&payload).await {
        Ok(reply) => {
            let result = classify_pricing_reply(reply);
            tracing::info!("✓ [{}] Pricing reply: status {}", call_id, result["status"]);
            Json(result)
        }
        Err(UpstreamError::Transport(err)) => {
            tracing::error!("✗ [{}] {}", call_id, err);
            Json(json!({
                "success": false,
                "error": "Unable to get pricing at the moment",
                "status": "network_error",
            }))
        }
        Err(err) => {
            tracing::error!("✗ [{}] {}", call_id, err);
            Json(json!({
                "success": false,
                "error": "Unable to get pricing at the moment",
                "status": "api_error",
            }))
        }
    }
}

/// A JSON reply passes through untouched. A plain-text reply containing
/// "Accepted" means the webhook took the request for asynchronous
/// processing; any other text is an unexpected format.
pub fn classify_pricing_reply(reply: PricingReply) -> Value {
    match reply {
        PricingReply::Json(value) => value,
        PricingReply::Text(text) if text.contains("Accepted") => json!({
            "success": true,
            "message": "Pricing request accepted and processing",
            "status": "accepted",
            "webhook_response": text,
        }),
        PricingReply::Text(text) => json!({
            "success": false,
            "error": "Unexpected response format",
            "response": text,
        }),
    }
}

async fn book_cab(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookingRequest>,
) -> Json<Envelope> {
    let call_id = new_call_id();
    tracing::info!("→ [{}] Booking operation: {}", call_id, request.operation);

    let envelope =
        dispatch::dispatch(&state.booking, &state.config.defaults, &request, &call_id).await;

    tracing::info!(
        "✓ [{}] Operation {} resolved: {:?}/{:?}",
        call_id,
        request.operation,
        envelope.status,
        envelope.booking_status
    );
    Json(envelope)
}
