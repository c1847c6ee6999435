use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use mess_manager::backend::io::{bootstrap_auth, LocalAuthProvider, LiveView};
use mess_manager::{initialize_backend, AppConfig};

fn log_dashboard(view: &LiveView) {
    let summary = &view.summary;
    tracing::info!(
        members = summary.member_count,
        meals = summary.total_meals,
        meal_rate = %summary.formatted_meal_rate,
        bill_per_head = %summary.formatted_bill_per_head,
        fund_status = %summary.formatted_fund_status,
        "Dashboard updated (revision {})",
        view.revision
    );
    for member in &summary.members {
        tracing::info!(
            "  {}: meals {} + {} fine, cost {}, balance {}",
            member.name,
            member.stats.meals,
            member.stats.fine_meals,
            member.formatted_meal_cost,
            member.formatted_balance
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => AppConfig::default_config_path()?,
    };
    let config = AppConfig::load_or_create(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .init();

    tracing::info!("Starting mess-manager for {} (config: {})", config.app_id, config_path.display());

    let provider = LocalAuthProvider::new(config.auth_token.clone());
    let auth = bootstrap_auth(&provider, config.auth_token.as_deref(), config.loading_timeout()).await;
    tracing::info!("Auth state: {:?}", auth);

    let backend = Arc::new(initialize_backend(config)?);
    let session = backend.start_live_session().await;
    session.wait_until_loaded(backend.config.loading_timeout()).await;
    for banner in session.banners() {
        tracing::warn!("{}", banner.message);
    }

    let mut views = session.subscribe();
    log_dashboard(&views.borrow_and_update());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                log_dashboard(&view);
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
