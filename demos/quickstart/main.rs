//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//

// This is an example program showing the basic use of a SeaTable Handle. It
// checks the connection, lists the tables of the base, reads the rows of one
// table, looks up rows by a column value and optionally updates one of them.

// To run this example:
//    SEATABLE_API_TOKEN=<token> cargo run --example quickstart -- <table> [<column> <value>]
//
// for extra output:
//    RUST_LOG=debug cargo run --example quickstart -- Mentors
//
// or, for a LOT of tracing output:
//    RUST_LOG=trace cargo run --example quickstart -- Mentors

use seatable_rust_sdk::Handle;
use seatable_rust_sdk::ListRowsRequest;
use seatable_rust_sdk::QueryRowsRequest;
use seatable_rust_sdk::SeaTableError;
use seatable_rust_sdk::UpdateRowRequest;
use std::error::Error;
use std::time::Duration;
use tracing::info;

// This method shows various ways to configure a SeaTable Handle.
async fn get_handle() -> Result<Handle, SeaTableError> {
    // Note: later methods called on this builder will override earlier methods.
    // This allows for setting desired defaults that can be overridden by, for example,
    // .from_environment().
    Handle::builder()
        // For a self-hosted server:
        // .endpoint("https://seatable.my.company.com")?
        //
        // Keep credentials between runs:
        // .cache_file("~/.seatable/cache.json")?
        //
        // Or read everything from a config file:
        // .from_config_file("~/.seatable/config")?
        //
        // To read all of the above from environment variables:
        // or, to override above from environment;
        .from_environment()?
        //
        // Optional: set a different default timeout (default is 30 seconds)
        .timeout(Duration::from_secs(15))?
        //
        // Build the handle
        .build()
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Set up a tracing subscriber to see output based on RUST_LOG environment setting
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_ansi(false)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        return Err("usage: quickstart <table> [<column> <value>]".into());
    }
    let table = &args[0];

    // Create a handle. This should be used throughout the program
    info!("Creating new handle...");
    let handle = get_handle().await?;

    let report = handle.debug_connection().await;
    println!("Connection: {:?}", report);
    if !report.success {
        return Err(report.message.into());
    }
    println!("TokenInfo={:?}", handle.token_info());
    println!("Tables={:?}", handle.list_tables().await?);

    let schema = handle
        .get_table_structure(table)
        .await?
        .ok_or(format!("table '{}' not found", table))?;
    println!("Columns of {}: {:?}", table, schema.column_names());

    // Get all rows, keyed by column name
    let rows = ListRowsRequest::new(table).execute(&handle).await?;
    println!("{} rows", rows.len());
    for row in rows.iter().take(5) {
        println!("  {}", serde_json::to_string(row)?);
    }

    if args.len() >= 3 {
        let (column, value) = (&args[1], &args[2]);
        // Look up rows by a display value
        let found = QueryRowsRequest::new(table, column, value)
            .execute(&handle)
            .await?;
        println!("{} rows where {} = {}", found.len(), column, value);

        // Optionally write a field back: quickstart <table> <column> <value> <field> <new value>
        if args.len() >= 5 {
            let outcome = UpdateRowRequest::new(table)
                .matching(column, value)
                .field(&args[3], args[4].as_str())
                .execute(&handle)
                .await?;
            println!("UpdateOutcome={:?}", outcome);
        }
    }

    Ok(())
}
