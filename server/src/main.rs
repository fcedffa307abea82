/// Cab booking dispatch gateway
/// HTTP surface for the voice agent's booking tools: address validation,
/// journey pricing, and the five-way booking operation multiplex.

mod config;
mod dispatch;
mod routes;
mod upstream;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Missing credential is the one fatal configuration error; nothing
    // can be dispatched without it.
    let config = config::DispatcherConfig::from_env()?;
    let port = config.port;

    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║             Cab Booking Dispatch Gateway                   ║");
    println!("║      Voice-agent tools for taxi booking operations         ║");
    println!("╚════════════════════════════════════════════════════════════╝\n");

    println!("[INIT] Server configuration:");
    println!("  Port: {}", port);
    println!("  Booking API: {}", config.booking_api_base);
    println!("  Address API: {}", config.address_api_base);
    println!("  Pricing webhook: {}", config.pricing_webhook_url);
    println!("  Upstream timeout: {:?}", config.upstream_timeout);
    println!("  Validation mode: {:?}", config.validation_mode);

    let state = routes::AppState::new(config)?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    println!("\n✓ Dispatcher running on http://0.0.0.0:{}", port);
    println!("  GET  /health                  — liveness");
    println!("  GET  /tools                   — tool schemas");
    println!("  POST /tools/validate_address  — address validation");
    println!("  POST /tools/check_pricing     — journey pricing");
    println!("  POST /tools/book_cab          — booking operations\n");

    axum::serve(listener, app).await?;

    Ok(())
}
