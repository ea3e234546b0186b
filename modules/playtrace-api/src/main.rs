use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use playtrace_common::Config;
use playtrace_store::{AnalyticsStore, ClickHouseStore, EventWriter, MongoStore, QueryGateway};

mod routes;

use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("playtrace=info".parse()?))
        .init();

    let config = Config::from_env();
    let timeout = Duration::from_secs(config.store_timeout_secs);

    let clickhouse = ClickHouseStore::connect(
        &config.clickhouse_url,
        &config.clickhouse_database,
        timeout,
    );
    clickhouse
        .ping()
        .await
        .with_context(|| format!("clickhouse unreachable at {}", config.clickhouse_url))?;
    info!(url = %config.clickhouse_url, "connected to ClickHouse");

    let mongo = MongoStore::connect(&config.mongo_uri, &config.mongo_database, timeout)
        .await
        .with_context(|| format!("mongodb unreachable at {}", config.mongo_uri))?;
    info!(uri = %config.mongo_uri, "connected to MongoDB");

    let analytics: Arc<dyn AnalyticsStore> = Arc::new(clickhouse);
    let state = Arc::new(AppState {
        writer: EventWriter::new(analytics.clone(), Arc::new(mongo)),
        gateway: QueryGateway::new(analytics.clone()),
        analytics,
    });

    let app = routes::router(state);

    let addr = format!("{}:{}", config.http_host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
