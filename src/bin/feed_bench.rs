//! Feed throughput bench driver
//!
//! Synthesizes a batch of records, pushes them through the full pipeline,
//! and prints the final throughput snapshot as JSON. Runs against Redis by
//! default; pass `--memory` to bench the processing path alone.

#![allow(missing_docs)]

use clap::Parser;
use feedflow::{BatchProcessor, FeedQueue, InMemoryQueue, QueueClient, Record, Settings, telemetry};
use rand::Rng;
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

const ENQUEUE_CHUNK: usize = 1_000;

/// Load-drive the feed pipeline and report throughput
#[derive(Parser, Debug)]
#[command(name = "feed-bench", version, about)]
struct Args {
    /// Number of records to synthesize and enqueue
    #[arg(long, default_value_t = 10_000)]
    records: usize,

    /// Records pulled per batch
    #[arg(long, default_value_t = 50)]
    batch_size: usize,

    /// Worker loops sharing the queue
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Size of the record-processing pool (defaults to the CPU count)
    #[arg(long)]
    processing_workers: Option<usize>,

    /// Pause between processed batches, in milliseconds
    #[arg(long, default_value_t = 0)]
    flush_interval_ms: u64,

    /// Blocking dequeue timeout, in milliseconds
    #[arg(long, default_value_t = 500)]
    dequeue_timeout_ms: u64,

    /// Queue (Redis list) name
    #[arg(long, default_value = "feed:bench")]
    queue: String,

    /// Redis connection URL
    #[arg(long, env = "FEED_REDIS_URL", default_value = "redis://localhost:6379")]
    redis_url: String,

    /// Run against an in-memory queue instead of Redis
    #[arg(long)]
    memory: bool,

    /// Purge the queue before enqueueing
    #[arg(long)]
    purge: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings {
        redis_url: args.redis_url.clone(),
        queue_name: args.queue.clone(),
        batch_size: args.batch_size,
        dequeue_timeout: args.dequeue_timeout_ms as f64 / 1000.0,
        worker_concurrency: args.workers,
        processing_workers: args.processing_workers.unwrap_or_else(num_cpus::get),
        flush_interval: args.flush_interval_ms as f64 / 1000.0,
        ..Settings::default()
    };
    settings.validate()?;
    telemetry::init(&settings)?;

    let queue: Arc<dyn FeedQueue> = if args.memory {
        Arc::new(InMemoryQueue::new())
    } else {
        Arc::new(QueueClient::connect(&settings.redis_url, &settings.queue_name).await?)
    };

    if args.purge {
        queue.purge().await?;
    }

    info!(records = args.records, "Synthesizing records");
    let records = synthesize_records(args.records);

    let started = Instant::now();
    for chunk in records.chunks(ENQUEUE_CHUNK) {
        queue.enqueue_many(chunk).await?;
    }
    info!(
        pending = queue.pending().await?,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Records enqueued"
    );

    let processor = Arc::new(BatchProcessor::new(queue.clone(), &settings));
    let tracker = processor.tracker();

    let runner = {
        let processor = processor.clone();
        tokio::spawn(async move { processor.run().await })
    };

    while tracker.snapshot().records_total < args.records as u64 {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    processor.stop();
    runner.await??;
    queue.close().await?;

    let elapsed = started.elapsed();
    let snapshot = tracker.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    println!(
        "processed {} records in {:.2}s ({:.0} records/s overall)",
        snapshot.records_total,
        elapsed.as_secs_f64(),
        snapshot.throughput_avg_overall
    );

    Ok(())
}

fn synthesize_records(count: usize) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            Record::new(json!({
                "seq": i,
                "temperature": rng.gen_range(-40.0..55.0),
                "status": (["ok", "degraded", "offline"][rng.gen_range(0..3)]),
            }))
            .with_id(Uuid::new_v4().to_string())
        })
        .collect()
}
