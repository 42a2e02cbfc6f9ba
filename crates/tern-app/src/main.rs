mod state;

use state::AppState;
use std::collections::BTreeMap;
use tern_email::inbox::normalize_category;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let state = AppState::initialize()?;
    tracing::info!(
        config = %state.config_manager.config_path().display(),
        api = %state.config.backend.api_base_url,
        "tern mail started"
    );

    match state.mail.list_emails().await {
        Ok(page) => {
            tracing::info!(count = page.emails.len(), total = page.total, "loaded inbox");
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for email in &page.emails {
                *counts.entry(normalize_category(&email.category)).or_default() += 1;
            }
            for (category, count) in counts {
                tracing::info!(category = %category, count, "inbox category");
            }
        }
        // The inbox surfaces this as an error banner; startup continues so
        // composing and sending by hand stay available.
        Err(err) => tracing::error!("failed to load inbox: {err}"),
    }

    state.shutdown().await;
    Ok(())
}
