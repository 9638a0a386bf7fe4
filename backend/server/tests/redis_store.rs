//! Runs against a live Redis only when `REDIS_TEST_URL` is set, e.g.
//! `REDIS_TEST_URL=redis://127.0.0.1:6379/15 cargo test -p server --test redis_store`.
//! The selected database is flushed.

use std::{collections::BTreeSet, sync::Arc};

use forms::{
    Complaint, Locale, SubmissionPayload,
    records::{COUNT_FIELD, COUNTERS_KEY, complaint_key},
};
use redis::{AsyncCommands, aio::MultiplexedConnection};
use server::{
    database::RedisStore,
    error::{SubmitError, TransactionError},
    submission::submit,
};
use tokio::{
    sync::{Mutex, MutexGuard},
    task::JoinSet,
};

/// Every test flushes the same database, so they take turns.
static REDIS: Mutex<()> = Mutex::const_new(());

struct Fixture {
    store: RedisStore,
    connection: MultiplexedConnection,
    _turn: MutexGuard<'static, ()>,
}

async fn fresh_store(counter: Option<u64>) -> Option<Fixture> {
    let url = std::env::var("REDIS_TEST_URL").ok()?;
    let turn = REDIS.lock().await;

    let client = redis::Client::open(url.as_str()).expect("redis url");
    let mut connection = client
        .get_multiplexed_async_connection()
        .await
        .expect("connect redis");
    redis::cmd("FLUSHDB")
        .query_async::<()>(&mut connection)
        .await
        .expect("flush");

    if let Some(count) = counter {
        let _: () = connection
            .hset(COUNTERS_KEY, COUNT_FIELD, count)
            .await
            .expect("seed counter");
    }

    let store = RedisStore::connect(&url, 64).await.expect("store");
    Some(Fixture {
        store,
        connection,
        _turn: turn,
    })
}

fn payload(subject: &str) -> SubmissionPayload {
    SubmissionPayload {
        subject: subject.to_string(),
        body: "Printer on floor 2 is out of toner".to_string(),
        anonymous: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn redis_missing_counter() {
    let Some(Fixture {
        store,
        mut connection,
        _turn,
    }) = fresh_store(None).await
    else {
        return;
    };

    let result = submit(&store, &payload("Printer"), Locale::En, "test").await;

    assert!(matches!(result, Err(SubmitError::MissingCounter(_))));
    let written: bool = connection.exists(complaint_key(1)).await.unwrap();
    assert!(!written);
}

#[tokio::test]
async fn redis_writes_document_and_counter() {
    let Some(Fixture {
        store,
        mut connection,
        _turn,
    }) = fresh_store(Some(5)).await
    else {
        return;
    };

    let created = submit(&store, &payload("Printer"), Locale::En, "test")
        .await
        .unwrap();

    assert_eq!(created.complaint_id, 6);
    let raw: String = connection.get(complaint_key(6)).await.unwrap();
    let stored: Complaint = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, created);
    let count: u64 = connection.hget(COUNTERS_KEY, COUNT_FIELD).await.unwrap();
    assert_eq!(count, 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn redis_concurrent_ids_are_dense() {
    let Some(fixture) = fresh_store(Some(0)).await else {
        return;
    };
    let store = Arc::new(fixture.store);

    let mut tasks = JoinSet::new();
    for i in 0..20 {
        let store = store.clone();
        tasks.spawn(async move {
            submit(store.as_ref(), &payload(&format!("#{i}")), Locale::Ar, "test").await
        });
    }

    let mut ids = BTreeSet::new();
    while let Some(joined) = tasks.join_next().await {
        ids.insert(joined.unwrap().unwrap().complaint_id);
    }

    assert_eq!(ids, (1..=20).collect::<BTreeSet<_>>());
}

#[tokio::test]
async fn redis_counter_behind_records_never_overwrites() {
    let Some(Fixture {
        store,
        mut connection,
        _turn,
    }) = fresh_store(Some(0)).await
    else {
        return;
    };

    let first = submit(&store, &payload("Printer"), Locale::En, "test")
        .await
        .unwrap();
    let _: () = connection
        .hset(COUNTERS_KEY, COUNT_FIELD, 0)
        .await
        .expect("rewind counter");

    let result = submit(&store, &payload("Other"), Locale::En, "test").await;

    assert!(matches!(
        result,
        Err(SubmitError::Transaction(TransactionError::Backend(_)))
    ));
    let raw: String = connection.get(complaint_key(1)).await.unwrap();
    let stored: Complaint = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, first);
    let count: u64 = connection.hget(COUNTERS_KEY, COUNT_FIELD).await.unwrap();
    assert_eq!(count, 0);
}
