//! # Bringin-Cart RS
//!
//! Lightning Address checkout backed by Bringin.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export BRINGIN_LIGHTNING_ADDRESS=shop@bringin.xyz
//! export SETTLEMENT_API_URL=http://localhost:3000/api
//!
//! # Run the server
//! bringin-cart
//! ```

use pay_api::{routes, spawn_cleanup_task, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();
    let base_url = state.config.base_url.trim_end_matches('/').to_string();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.strategy.provider_name());
    info!("Default Lightning address: {}", state.default_address);
    info!("Settlement API: {}", state.config.settlement_api_url);
    if state.policy.mock_fallback {
        info!(
            "Demo fallback enabled: unconfirmed invoices settle after {}s",
            state.policy.mock_paid_after_secs
        );
    }

    let _sweep = spawn_cleanup_task(state.store.clone(), state.policy.cleanup_interval());

    let app = routes::create_router(state);

    info!("⚡ Bringin-Cart starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: {}/health", base_url);
        info!("💳 Confirm: POST {}/api/v1/checkout/{{id}}/confirm", base_url);
        info!("🔎 Status: GET {}/api/v1/checkout/{{id}}/status", base_url);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ⚡ Bringin-Cart RS ⚡
  ━━━━━━━━━━━━━━━━━━━━━━━
  Lightning Address checkout
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
