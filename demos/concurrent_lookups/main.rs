//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//

// This is an example program showing how a SeaTable Handle can be used across
// multiple tasks. It invalidates the cached credential, then spawns a number of
// tasks that all look up rows at once. Only one token exchange is made; every
// task waits for it and then reuses the result. Each task keeps querying until
// a certain amount of time expires.

// To run this example:
//    SEATABLE_API_TOKEN=<token> cargo run --example concurrent_lookups -- <table> <column> <value>
//
// for extra output:
//    RUST_LOG=debug cargo run --example concurrent_lookups -- ...
//
// or, for a LOT of tracing output:
//    RUST_LOG=trace cargo run --example concurrent_lookups -- ...

// Parameters for runtime execution
// Number of tasks to spawn
const NUM_TASKS: usize = 8;
// Amount of time to run each task for
const RUNTIME_SECONDS: u64 = 10;

use seatable_rust_sdk::Handle;
use seatable_rust_sdk::QueryRowsRequest;
use seatable_rust_sdk::SeaTableError;
use std::error::Error;
use std::time::{Duration, SystemTime};
use tokio::time::sleep;
use tracing::{debug, info};

async fn get_handle() -> Result<Handle, SeaTableError> {
    Handle::builder()
        .from_environment()?
        .timeout(Duration::from_secs(15))?
        .build()
        .await
}

async fn run_lookups(
    id: usize,
    handle: Handle,
    table: String,
    column: String,
    value: String,
) -> Result<usize, SeaTableError> {
    let start = SystemTime::now();
    let mut lookups = 0;
    loop {
        let rows = QueryRowsRequest::new(&table, &column, &value)
            .execute(&handle)
            .await?;
        lookups += 1;
        debug!("task {}: lookup {} found {} rows", id, lookups, rows.len());
        if start.elapsed().unwrap_or_default() > Duration::from_secs(RUNTIME_SECONDS) {
            break;
        }
        sleep(Duration::from_millis(250)).await;
    }
    Ok(lookups)
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<(), Box<dyn Error>> {
    // Set up a tracing subscriber to see output based on RUST_LOG environment setting
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_ansi(false)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        return Err("usage: concurrent_lookups <table> <column> <value>".into());
    }

    info!("Creating new handle...");
    let handle = get_handle().await?;
    // Start from a clean slate so that every task needs a credential at once
    handle.invalidate().await?;

    let mut tasks = Vec::new();
    for id in 0..NUM_TASKS {
        tasks.push(tokio::spawn(run_lookups(
            id,
            handle.clone(),
            args[0].clone(),
            args[1].clone(),
            args[2].clone(),
        )));
    }
    let mut total = 0;
    for t in tasks {
        total += t.await??;
    }
    info!("{} tasks finished {} lookups", NUM_TASKS, total);
    println!("TokenInfo={:?}", handle.token_info());
    Ok(())
}
