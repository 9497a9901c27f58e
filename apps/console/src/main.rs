//! # Warung Console Entry Point
//!
//! Opens the store, reports what needs the operator's attention, then
//! watches for new orders until Ctrl+C.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (defaults ◄ console.toml ◄ WARUNG_* env)
//! 3. Create data directories, open the database, run migrations
//! 4. Load the saved storefront cart, fill the stock view
//! 5. Log the low-stock report and outstanding credit
//! 6. Run the new-order watcher until a shutdown signal

use tracing::{info, warn};

use warung_console::commands::{credit, inventory, orders};
use warung_console::config::ConsoleConfig;
use warung_console::watcher::{run_watcher, LogAlert};
use warung_console::{init_tracing, App};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting Warung console");

    let config = ConsoleConfig::load()?;
    config.ensure_dirs()?;
    info!(
        store = %config.store_name,
        db = %config.database_path.display(),
        "Configuration loaded"
    );

    let app = App::open(config).await?;

    match inventory::low_stock_report(&app.db, &app.config).await {
        Ok(low) if low.is_empty() => info!("No products below the low-stock threshold"),
        Ok(low) => {
            for product in &low {
                warn!(name = %product.name, stock = product.stock, "Low stock");
            }
        }
        Err(e) => warn!(error = %e, "Cannot load low-stock report"),
    }
    match credit::outstanding_total(&app.db).await {
        Ok(total) => info!(outstanding = %total, "Open credit"),
        Err(e) => warn!(error = %e, "Cannot load credit tabs"),
    }
    match orders::recent_orders(&app.db).await {
        Ok(recent) => info!(count = recent.len(), "Recent orders loaded"),
        Err(e) => warn!(error = %e, "Cannot load recent orders"),
    }

    let feed = app.db.subscribe();
    run_watcher(&app.db, feed, &LogAlert, shutdown_signal()).await;

    app.close().await;
    info!("Console shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. If a handler cannot be installed, that
/// signal is logged and ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
