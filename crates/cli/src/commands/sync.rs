// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use lift_core::{QueueCounts, QueueEntry};
use serde::Serialize;

use super::workout::print_json;
use super::Context;
use crate::cli::OutputFormat;
use crate::display::{format_queue_entry, unsynced_banner};
use crate::error::Result;
use crate::sync::{Connectivity, SyncProcessor, SyncReport};

#[derive(Serialize)]
struct StatusView {
    online: bool,
    #[serde(flatten)]
    counts: QueueCounts,
    entries: Vec<QueueEntry>,
}

pub async fn status(ctx: &Context, output: OutputFormat) -> Result<()> {
    let (counts, entries) = {
        let db = ctx.db.lock().await;
        (db.queue_counts()?, db.list_queue(None)?)
    };

    match output {
        OutputFormat::Json => print_json(&StatusView {
            online: ctx.connectivity.is_online(),
            counts,
            entries,
        })?,
        OutputFormat::Text => {
            match ctx.config.remote_url() {
                Some(url) => println!("Remote: {}", url),
                None => println!("Remote: none (local only)"),
            }
            match unsynced_banner(&counts) {
                Some(banner) => println!("{}", banner),
                None => println!("Everything is synced"),
            }
            for entry in &entries {
                println!("{}", format_queue_entry(entry));
            }
        }
    }
    Ok(())
}

/// Drain the queue once, or keep draining on the configured interval.
pub async fn run(ctx: &Context, watch: bool) -> Result<SyncReport> {
    let processor = ctx.processor()?;
    if ctx.is_forced_offline() {
        println!("Offline: nothing sent");
        ctx.report_unsynced().await?;
        return Ok(SyncReport::default());
    }

    if watch {
        watch_until_interrupted(ctx, Arc::new(processor)).await?;
        return Ok(SyncReport::default());
    }

    let report = processor.run().await;
    if ctx.connectivity.is_online() {
        println!("Sync: {}", report);
    } else {
        println!("Remote unreachable: {}", report);
    }
    ctx.report_unsynced().await?;
    Ok(report)
}

async fn watch_until_interrupted(
    ctx: &Context,
    processor: Arc<SyncProcessor>,
) -> Result<()> {
    let period = ctx
        .config
        .remote
        .as_ref()
        .map(|r| r.sync_interval())
        .unwrap_or(Duration::from_secs(30));
    println!("Syncing every {}s, press Ctrl-C to stop", period.as_secs());

    let drain = processor.spawn_periodic(period);
    let mut probe = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            // Re-arm the signal so the next drain attempts a connection
            _ = probe.tick() => ctx.connectivity.set_online(true),
        }
    }
    drain.abort();
    ctx.report_unsynced().await
}

/// Requeue entries that exhausted their retries, then try them once.
pub async fn retry(ctx: &Context) -> Result<usize> {
    let reset = ctx.db.lock().await.reset_failed()?;
    if reset == 0 {
        println!("Nothing to retry");
        return Ok(0);
    }
    println!("Requeued {} change{}", reset, if reset == 1 { "" } else { "s" });

    if let Ok(processor) = ctx.processor() {
        if ctx.connectivity.is_online() {
            println!("Sync: {}", processor.run().await);
        }
    }
    ctx.report_unsynced().await?;
    Ok(reset)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
