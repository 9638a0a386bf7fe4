use std::{collections::BTreeSet, sync::Arc};

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use forms::{
    Locale,
    form::ComplaintForm,
    payloads::{Category, SubmissionReceipt},
};
use reqwest::Client;
use tokio::{sync::Semaphore, task::JoinSet};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:1111")]
    url: String,

    #[arg(long, default_value_t = 100)]
    count: u64,

    #[arg(long, default_value_t = 16)]
    concurrency: usize,
}

async fn send(client: &Client, url: &str, i: u64) -> anyhow::Result<u64> {
    let mut form = ComplaintForm::new(if i % 2 == 0 { Locale::Ar } else { Locale::En });
    form.category = if i % 3 == 0 {
        Category::Suggestion
    } else {
        Category::Complaint
    };
    form.subject = format!("Load test #{i}");
    form.message = "Generated by the submission tester".to_string();

    let locale = form.locale;
    let payload = form
        .begin_submit()
        .map_err(|blocked| anyhow!("Submission #{i} blocked: {}", blocked.message(locale)))?;

    let response = client
        .post(format!("{url}/complaints"))
        .json(&payload)
        .send()
        .await;

    let receipt = match response {
        Ok(response) if response.status().is_success() => {
            response.json::<SubmissionReceipt>().await.ok()
        }
        _ => None,
    };
    form.finish(receipt.is_some());

    receipt
        .map(|receipt| receipt.complaint_id)
        .with_context(|| format!("Submission #{i} failed"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = Client::new();
    let permits = Arc::new(Semaphore::new(args.concurrency.max(1)));

    let mut tasks = JoinSet::new();
    for i in 0..args.count {
        let client = client.clone();
        let url = args.url.clone();
        let permits = permits.clone();

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await?;
            send(&client, &url, i).await
        });
    }

    let mut ids = BTreeSet::new();
    let mut failures = 0;

    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(complaint_id) => {
                if !ids.insert(complaint_id) {
                    println!("Duplicate complaint number {complaint_id}");
                }
            }
            Err(e) => {
                println!("{e:#}");
                failures += 1;
            }
        }
    }

    println!("Submitted: {}", ids.len());
    println!("Failed: {failures}");

    if let (Some(first), Some(last)) = (ids.first(), ids.last()) {
        println!("Numbers: {first}..={last}");

        if last - first + 1 != ids.len() as u64 {
            bail!("Numbers are not contiguous");
        }
    }

    if ids.len() as u64 + failures != args.count {
        bail!("Some submissions shared a number");
    }

    Ok(())
}
