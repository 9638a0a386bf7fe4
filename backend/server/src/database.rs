//! # Redis
//!
//! Document store for the counter and the complaints.
//!
//! ## Layout
//! - Counter: hash `metadata_v2:counters`, field `complaintsCount`
//! - Complaints: `complaints:<id>` → JSON document, written once
//!
//! ## Transaction
//! - Dedicated connection per attempt, since `WATCH` state belongs to a connection
//! - `WATCH` the counter, then read it together with the server clock (`TIME`)
//! - Run the body on what was read
//! - `WATCH` the new complaint key and refuse if it already exists
//! - `MULTI` / `SET` complaint / `HSET` counter / `EXEC`
//! - A nil `EXEC` means the counter moved after the read, so start over
//!
//! The complaint's `createdAt` is the Redis clock read inside the watched
//! section, so every instance of the service stamps from the same clock.
//!
//! ## Commands
//!
//! Create the counter before the first submission.
//! ```sh
//! cargo run -p admin -- init
//! ```
//!
//! Inspect by hand.
//! ```sh
//! redis-cli HGET metadata_v2:counters complaintsCount
//! redis-cli GET complaints:1
//! ```
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forms::records::{COUNT_FIELD, COUNTERS_KEY};
use redis::{
    Client, ErrorKind, RedisError, RedisResult,
    aio::{ConnectionManager, ConnectionManagerConfig, MultiplexedConnection},
};
use tracing::{debug, info};

use crate::{
    error::{SubmitError, TransactionError},
    store::{Counter, DocumentStore, Mutation, Snapshot, TransactionBody},
};

pub async fn init_redis(redis_url: &str) -> RedisResult<(Client, ConnectionManager)> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok((client, connection_manager))
}

pub struct RedisStore {
    client: Client,
    connection_manager: ConnectionManager,
    max_attempts: u32,
}

impl RedisStore {
    pub async fn connect(redis_url: &str, max_attempts: u32) -> RedisResult<Self> {
        let (client, connection_manager) = init_redis(redis_url).await?;
        info!("Connected to Redis");

        Ok(Self {
            client,
            connection_manager,
            max_attempts: max_attempts.max(1),
        })
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn transact(&self, body: TransactionBody<'_>) -> Result<Mutation, SubmitError> {
        for attempt in 1..=self.max_attempts {
            let mut connection = self
                .client
                .get_multiplexed_async_connection()
                .await
                .map_err(classify)?;

            redis::cmd("WATCH")
                .arg(COUNTERS_KEY)
                .query_async::<()>(&mut connection)
                .await
                .map_err(classify)?;

            let snapshot = read_snapshot(&mut connection).await.map_err(classify)?;

            let mutation = match body(&snapshot) {
                Ok(mutation) => mutation,
                Err(e) => {
                    let _ = redis::cmd("UNWATCH")
                        .query_async::<()>(&mut connection)
                        .await;
                    return Err(e);
                }
            };

            // complaints are immutable, a counter behind the records must not overwrite one
            let key = mutation.complaint.key();
            redis::cmd("WATCH")
                .arg(&key)
                .query_async::<()>(&mut connection)
                .await
                .map_err(classify)?;

            let occupied: bool = redis::cmd("EXISTS")
                .arg(&key)
                .query_async(&mut connection)
                .await
                .map_err(classify)?;

            if occupied {
                let _ = redis::cmd("UNWATCH")
                    .query_async::<()>(&mut connection)
                    .await;
                return Err(occupied_error(&key).into());
            }

            let document = serde_json::to_string(&mutation.complaint)
                .map_err(|e| TransactionError::Backend(e.to_string()))?;

            let committed: Option<()> = redis::pipe()
                .atomic()
                .set(&key, document)
                .ignore()
                .hset(COUNTERS_KEY, COUNT_FIELD, mutation.complaints_count)
                .ignore()
                .query_async(&mut connection)
                .await
                .map_err(classify)?;

            if committed.is_some() {
                return Ok(mutation);
            }

            debug!(attempt, "Counter changed since read, retrying");
        }

        Err(TransactionError::ConflictExhausted {
            attempts: self.max_attempts,
        }
        .into())
    }

    async fn ping(&self) -> Result<(), TransactionError> {
        let mut connection = self.connection_manager.clone();

        redis::cmd("PING")
            .query_async::<String>(&mut connection)
            .await
            .map(|_| ())
            .map_err(classify)
    }
}

async fn read_snapshot(connection: &mut MultiplexedConnection) -> RedisResult<Snapshot> {
    let (exists, complaints_count, (seconds, micros)): (bool, Option<u64>, (i64, u32)) =
        redis::pipe()
            .exists(COUNTERS_KEY)
            .hget(COUNTERS_KEY, COUNT_FIELD)
            .cmd("TIME")
            .query_async(connection)
            .await?;

    let server_time: DateTime<Utc> = DateTime::from_timestamp(seconds, micros * 1000)
        .ok_or_else(|| RedisError::from((ErrorKind::TypeError, "Invalid server time")))?;

    // a counter document without the field counts from zero
    let counter = exists.then(|| Counter {
        complaints_count: complaints_count.unwrap_or(0),
    });

    Ok(Snapshot {
        counter,
        server_time,
    })
}

pub(crate) fn occupied_error(key: &str) -> TransactionError {
    TransactionError::Backend(format!("{key} already exists, counter is behind the records"))
}

fn classify(e: RedisError) -> TransactionError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
    {
        TransactionError::Unavailable(e.to_string())
    } else if e.kind() == ErrorKind::AuthenticationFailed || e.code() == Some("NOPERM") {
        TransactionError::PermissionDenied(e.to_string())
    } else {
        TransactionError::Backend(e.to_string())
    }
}
