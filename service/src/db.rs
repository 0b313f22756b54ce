//! Store client construction.

use std::time::{Duration, Instant};

use aws_sdk_dynamodb::Client as DynamoClient;
use aws_smithy_types::timeout::TimeoutConfig;
use mongodb::bson::doc;
use mongodb::Database;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{DynamoConfig, MongoConfig};
use crate::repo::docs::MongoDocStore;

/// Build the key/value store client.
///
/// Starts from the SDK's environment config (credentials chain, retry
/// config, sleep impl) then applies the configured overrides. Every
/// operation carries an explicit timeout so a stuck call cannot hold a
/// request open indefinitely.
pub async fn setup_dynamo(config: &DynamoConfig) -> DynamoClient {
    let sdk_config = aws_config::load_from_env().await;
    let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config)
        .region(aws_sdk_dynamodb::config::Region::new(config.region.clone()))
        .timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(config.timeout_ms))
                .build(),
        );

    // Endpoint override for local development
    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint);
    }

    DynamoClient::from_conf(builder.build())
}

/// Connect to the document store and create indexes.
///
/// Retries with exponential backoff so the service survives a slow-starting
/// database during deploys.
///
/// # Errors
///
/// Returns the last connection error once the retry budget is exhausted.
pub async fn setup_mongo(config: &MongoConfig) -> Result<MongoDocStore, anyhow::Error> {
    let retry_deadline = Duration::from_secs(60); // overall retry budget
    let max_interval = Duration::from_secs(30); // cap single waits
    let mut delay = Duration::from_millis(500);
    let start = Instant::now();

    let uri = config.connection_uri();

    let db: Database = loop {
        info!("Attempting to connect to the document store...");

        match connect(&uri, &config.database).await {
            Ok(db) => break db,
            Err(err) => {
                if start.elapsed() >= retry_deadline {
                    warn!(error = %err, "document store not ready; retries exhausted");
                    return Err(err.into());
                }

                warn!(error = %err, "document store not ready yet; retrying");
                sleep(delay).await;
                delay = (delay.saturating_mul(2)).min(max_interval);
            }
        }
    };

    let store = MongoDocStore::new(db);
    store.ensure_indexes().await?;
    info!("Document store indexes ensured");
    Ok(store)
}

async fn connect(uri: &str, database: &str) -> Result<Database, mongodb::error::Error> {
    let client = mongodb::Client::with_uri_str(uri).await?;
    let db = client.database(database);
    // The driver connects lazily; ping to surface failures here.
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(db)
}
