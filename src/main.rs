use std::net::SocketAddr;
use std::sync::atomic::Ordering;

use astra::Server;

use crate::api::{ClientConfig, ReportsClient};
use crate::db::connection::{init_db, Database};
use crate::router::{handle, refresh_working_set, App};

mod api;
mod db;
mod domain;
mod errors;
mod events;
mod responses;
mod router;
mod spreadsheets;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    // 1️⃣ Create the local store handle
    let db = Database::new("civic_connect.sqlite3");

    // 2️⃣ Initialize it from schema.sql
    if let Err(e) = init_db(&db, "sql/schema.sql") {
        eprintln!("❌ Local store initialization failed: {e}");
        std::process::exit(1);
    }

    // 3️⃣ Build the reports API client
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Bad API configuration: {e}");
            std::process::exit(1);
        }
    };
    let client = match ReportsClient::new(config, db.clone()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Could not build API client: {e}");
            std::process::exit(1);
        }
    };

    let app = App::new(db, client);

    // 4️⃣ Wire up event bus listeners: a diagnostics log line and the
    // per-session transition counter shown on the worker panel.
    app.events.subscribe(|event| {
        eprintln!(
            "🔔 Report {} changed status to {}",
            event.report_id,
            event.status.as_str()
        );
    });
    let transitions = app.transitions.clone();
    app.events.subscribe(move |_| {
        transitions.fetch_add(1, Ordering::SeqCst);
    });

    // 5️⃣ Warm the working set in the background so the first page view
    // doesn't wait on the network.
    {
        let app = app.clone();
        std::thread::spawn(move || {
            eprintln!("🧵 Initial report fetch started");
            if let Err(e) = refresh_working_set(&app) {
                eprintln!("⚠️ Initial fetch failed: {e}");
            }
        });
    }

    // 6️⃣ Start the server
    let addr: SocketAddr = std::env::var("CIVIC_BIND")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("❌ Bad CIVIC_BIND address: {e}");
            std::process::exit(1);
        });
    println!("Starting CivicConnect panel at http://{addr}");

    let server = Server::bind(&addr).max_workers(8);

    // 7️⃣ Serve requests, passing the app handle into the closure
    let result = server.serve(move |req, _info| match handle(req, &app) {
        Ok(resp) => resp,
        Err(err) => responses::error_to_response(err),
    });

    if let Err(e) = result {
        eprintln!("Server ended with error: {e}");
    }

    println!("Server shut down cleanly.");
}
