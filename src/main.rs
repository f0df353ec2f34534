use chrono::Local;
use dotenvy::dotenv;
use ledger_desk::{
    config::{
        database,
        ledger::{self, LedgerConfig},
    },
    core::{aggregate, catalog, settings},
    errors::Result,
    mirror::LedgerMirror,
};
use std::{path::Path, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Number of recent income entries listed on the dashboard
const RECENT_INCOME_COUNT: usize = 5;

fn load_configuration() -> Result<LedgerConfig> {
    let path = std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| ledger::DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        warn!("{} not found, starting with default settings and no seed data", path);
        return Ok(LedgerConfig::default());
    }
    ledger::load_config(&path)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load settings and seed lists
    let config = load_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed catalog and settings
    catalog::seed_catalog(&db, &config)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    let company = settings::seed_company_name(&db, &config.settings.company_name).await?;

    // 6. Load the ledger and log the dashboard figures
    let mirror = LedgerMirror::new(Arc::new(db), config.settings.lock_policy);
    mirror.reload().await?;

    let today = Local::now().date_naive();
    let data = mirror.ledger_data().await;
    let today_total = aggregate::daily_total(&data, today);
    let month = mirror.month_to_date(today).await;
    info!(
        "{} | today: income {:.2}, expenses {:.2} | this month: income {:.2}, expenses {:.2}, profit {:.2}",
        company,
        today_total.income,
        today_total.expense,
        month.income,
        month.expenses,
        month.profit
    );

    let series = aggregate::rolling_series(&data, config.settings.rolling_days, today);
    let active_days = series
        .iter()
        .filter(|p| p.income != 0.0 || p.expense != 0.0)
        .count();
    info!(
        "{} of the last {} day(s) had activity",
        active_days,
        series.len()
    );

    for entry in aggregate::recent_income(&data, RECENT_INCOME_COUNT) {
        info!("Recent income {} on {}: {:.2}", entry.id, entry.date, entry.total());
    }

    match mirror.snapshots().await.first() {
        Some(latest) => info!(
            "Latest snapshot {} ({}): {:.2} across {} account(s)",
            latest.month.format("%Y-%m"),
            if latest.is_locked { "locked" } else { "open" },
            latest.total(),
            latest.balances.len()
        ),
        None => info!("No account snapshots recorded yet"),
    }

    Ok(())
}
