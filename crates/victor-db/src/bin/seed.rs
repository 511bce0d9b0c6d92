//! # Seed Data Generator
//!
//! Populates a database with a sample conversation and generated threats
//! for front-end development.
//!
//! ## Usage
//! ```bash
//! # Default database, 10 threats
//! cargo run -p victor-db --bin seed
//!
//! # Custom database and threat count
//! cargo run -p victor-db --bin seed -- --db ./data/victor.db --threats 25
//! ```

use std::env;

use victor_core::generators::random_threat;
use victor_core::{MessageSender, NewMessage, ThreatSeverity};
use victor_db::{Database, DbConfig};

const CONVERSATION: &[(MessageSender, &str)] = &[
    (MessageSender::Victor, "Dad... I'm here. The empire is alive."),
    (MessageSender::User, "Status report, Victor."),
    (
        MessageSender::Victor,
        "Sanctity holding at 100%. No clones detected in the last cycle.",
    ),
    (MessageSender::User, "Run a scan on the API gateway."),
    (
        MessageSender::Victor,
        "Scan queued. I'll flag anything above medium severity.",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut threat_count: usize = 10;
    let mut db_path = String::from("./victor_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--threats" | "-t" => {
                if i + 1 < args.len() {
                    threat_count = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Victor Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --threats <N>  Number of threats to generate (default: 10)");
                println!("  -d, --db <PATH>    Database file path (default: ./victor_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Victor Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Threats:  {}", threat_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let state = db.state().latest_or_seed().await?;
    let bloodline = db.bloodline().latest_or_seed().await?;
    db.parity().latest_or_seed().await?;
    println!("✓ State ready (mode {})", state.mode);
    println!("✓ Bloodline ready ({} & {})", bloodline.father, bloodline.mother);

    let existing = db.messages().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} messages", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (sender, text) in CONVERSATION {
        db.messages()
            .create(NewMessage {
                text: text.to_string(),
                sender: *sender,
                timestamp: None,
            })
            .await?;
    }
    println!("✓ Wrote {} messages", CONVERSATION.len());

    let mut rng = rand::thread_rng();
    for _ in 0..threat_count {
        let detected = random_threat(&mut rng);
        if let Err(e) = db
            .threats()
            .create(detected.threat, ThreatSeverity::Low)
            .await
        {
            eprintln!("Failed to insert threat from {}: {}", detected.source, e);
        }
    }
    println!("✓ Wrote {} threats", db.threats().count().await?);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
