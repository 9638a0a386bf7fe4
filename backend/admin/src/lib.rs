//! # Complaint Desk Admin
//!
//! Operator side of the counter and the complaint records.
//!
//! ## Counter Setup
//! The submission path never creates the counter record. A deployment without
//! it rejects every submission with a configuration error, so run `init` once
//! per environment before opening the form.
//!
//! - `init` uses `HSETNX`, an existing count is never overwritten
//! - `--start N` continues a numbering that began elsewhere, the next complaint gets `N + 1`
//!
//! ## Audit
//! Complaint numbers must be exactly `1..=count`.
//! 1. Read the counter, `N`.
//! 2. Check `complaints:1` through `complaints:N` exist, in batches.
//! 3. Check nothing exists at `complaints:N+1`, which would mean a write bypassed the transaction.
//!
//! ## Export
//! JSON lines, one complaint per line, ascending by number. Missing numbers are
//! skipped and reported.
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, bail};
use chrono::Local;
use forms::{
    Complaint,
    records::{COUNT_FIELD, COUNTERS_KEY, complaint_key},
};
use redis::{AsyncCommands, aio::MultiplexedConnection};

pub mod utils;

use utils::{BATCH_SIZE, batches, format_ranges, progress_bar};

pub async fn connect(redis_url: &str) -> anyhow::Result<MultiplexedConnection> {
    let client = redis::Client::open(redis_url).context("Invalid Redis URL")?;

    client
        .get_multiplexed_async_connection()
        .await
        .with_context(|| format!("Failed to connect to {redis_url}"))
}

async fn read_counter(connection: &mut MultiplexedConnection) -> anyhow::Result<Option<u64>> {
    let (exists, count): (bool, Option<u64>) = redis::pipe()
        .exists(COUNTERS_KEY)
        .hget(COUNTERS_KEY, COUNT_FIELD)
        .query_async(connection)
        .await?;

    Ok(exists.then(|| count.unwrap_or(0)))
}

async fn require_counter(connection: &mut MultiplexedConnection) -> anyhow::Result<u64> {
    match read_counter(connection).await? {
        Some(count) => Ok(count),
        None => bail!("Counter {COUNTERS_KEY} does not exist, run `admin init` first"),
    }
}

pub async fn init(connection: &mut MultiplexedConnection, start: u64) -> anyhow::Result<()> {
    let created: bool = connection.hset_nx(COUNTERS_KEY, COUNT_FIELD, start).await?;

    if created {
        println!("Created {COUNTERS_KEY} with {COUNT_FIELD} = {start}");
        println!("Next complaint number: {}", start + 1);
    } else {
        let count = require_counter(connection).await?;
        println!("Counter already exists, left untouched: {COUNT_FIELD} = {count}");
    }

    Ok(())
}

pub async fn status(connection: &mut MultiplexedConnection) -> anyhow::Result<()> {
    match read_counter(connection).await? {
        Some(count) => {
            println!("{COUNT_FIELD}: {count}");
            println!("Next complaint number: {}", count + 1);
        }
        None => println!("Counter {COUNTERS_KEY} is missing, submissions will fail"),
    }

    Ok(())
}

pub async fn audit(connection: &mut MultiplexedConnection) -> anyhow::Result<()> {
    let count = require_counter(connection).await?;
    let pb = progress_bar(count);

    let mut missing = Vec::new();

    for batch in batches(count, BATCH_SIZE) {
        let mut pipe = redis::pipe();
        for complaint_id in batch.clone() {
            pipe.exists(complaint_key(complaint_id));
        }

        let present: Vec<bool> = pipe.query_async(connection).await?;
        missing.extend(
            batch
                .clone()
                .zip(present)
                .filter_map(|(complaint_id, exists)| (!exists).then_some(complaint_id)),
        );

        pb.inc(batch.count() as u64);
    }

    pb.finish_with_message("Done");

    let beyond: bool = connection.exists(complaint_key(count + 1)).await?;

    println!("\nCounter: {count}");
    println!("Missing: {}", missing.len());

    if !missing.is_empty() {
        println!("Missing numbers: {}", format_ranges(&missing));
    }

    if beyond {
        println!("Found complaints:{} beyond the counter", count + 1);
    }

    if !missing.is_empty() || beyond {
        bail!("Complaint numbering is not dense");
    }

    println!("Numbering is dense");
    Ok(())
}

pub async fn show(connection: &mut MultiplexedConnection, complaint_id: u64) -> anyhow::Result<()> {
    let raw: Option<String> = connection.get(complaint_key(complaint_id)).await?;
    let Some(raw) = raw else {
        bail!("No complaint #{complaint_id}");
    };

    let complaint: Complaint = serde_json::from_str(&raw)
        .with_context(|| format!("Complaint #{complaint_id} is not a valid document"))?;

    println!(
        "#{} [{}] {}",
        complaint.complaint_id,
        complaint.category,
        complaint
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    );
    println!("{}", serde_json::to_string_pretty(&complaint)?);

    Ok(())
}

pub async fn export(connection: &mut MultiplexedConnection, path: &Path) -> anyhow::Result<()> {
    let count = require_counter(connection).await?;
    let pb = progress_bar(count);

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut missing = Vec::new();
    let mut written = 0;

    for batch in batches(count, BATCH_SIZE) {
        let keys: Vec<String> = batch.clone().map(complaint_key).collect();
        let documents: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(connection)
            .await?;

        for (complaint_id, document) in batch.clone().zip(documents) {
            match document {
                Some(document) => {
                    // re-encode so every line is compact and validated
                    let complaint: Complaint = serde_json::from_str(&document).with_context(
                        || format!("Complaint #{complaint_id} is not a valid document"),
                    )?;
                    serde_json::to_writer(&mut writer, &complaint)?;
                    writer.write_all(b"\n")?;
                    written += 1;
                }
                None => missing.push(complaint_id),
            }
        }

        pb.inc(batch.count() as u64);
    }

    writer.flush()?;
    pb.finish_with_message("Done");

    println!("\nExported: {written}");
    println!("Output: {}", path.display());

    if !missing.is_empty() {
        println!("Skipped missing numbers: {}", format_ranges(&missing));
    }

    Ok(())
}
