//! Mock data generation for local development and demos.
//!
//! Writes the three blobs the built-in sources read. With a seed the output
//! is reproducible for a fixed `now`.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Elena", "Farid", "Grace", "Hiro", "Ines", "Jamal",
    "Kira", "Luis", "Maya", "Nikhil", "Olga", "Priya",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Brown", "Chen", "Diaz", "Evans", "Fischer", "Garcia", "Hughes", "Ito",
    "Johnson", "Khan", "Lopez", "Miller", "Nguyen", "Okafor", "Patel",
];

const SUBJECTS: &[&str] = &[
    "Login issue",
    "Billing question",
    "Feature request",
    "Bug report",
    "Account locked",
    "Password reset",
    "Slow performance",
    "Data export help",
];

const CUSTOMER_STATUSES: &[&str] = &["active", "inactive"];
const TICKET_STATUSES: &[&str] = &["open", "closed"];
const PRIORITIES: &[&str] = &["high", "medium", "low"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone)]
pub struct MockOptions {
    /// Number of customers, and of tickets.
    pub count: usize,
    /// Number of daily analytics points, ending today.
    pub days: usize,
    pub seed: Option<u64>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            count: 50,
            days: 30,
            seed: None,
        }
    }
}

/// The three generated blobs.
#[derive(Debug, Clone, PartialEq)]
pub struct MockData {
    pub customers: Vec<Value>,
    pub tickets: Vec<Value>,
    pub analytics: Vec<Value>,
}

fn pick(rng: &mut StdRng, values: &[&'static str]) -> &'static str {
    values[rng.random_range(0..values.len())]
}

pub fn generate(options: &MockOptions, now: DateTime<Utc>) -> MockData {
    let seed = options.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let n = options.count;

    let customers = (1..=n)
        .map(|id| {
            let first = pick(&mut rng, FIRST_NAMES);
            let last = pick(&mut rng, LAST_NAMES);
            let created = now - Duration::days(rng.random_range(1..=365));
            json!({
                "customer_id": id,
                "name": format!("{} {}", first, last),
                "email": format!("{}.{}{}@example.com", first.to_lowercase(), last.to_lowercase(), id),
                "created_at": created.format(TIMESTAMP_FORMAT).to_string(),
                "status": pick(&mut rng, CUSTOMER_STATUSES),
            })
        })
        .collect();

    let tickets = (1..=n)
        .map(|id| {
            let customer_id = rng.random_range(1..=n.max(1));
            let created = now - Duration::days(rng.random_range(0..30));
            json!({
                "ticket_id": id,
                "customer_id": customer_id,
                "subject": pick(&mut rng, SUBJECTS),
                "priority": pick(&mut rng, PRIORITIES),
                "created_at": created.format(TIMESTAMP_FORMAT).to_string(),
                "status": pick(&mut rng, TICKET_STATUSES),
            })
        })
        .collect();

    let today = now.date_naive();
    let analytics = (0..options.days)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back as i64);
            json!({
                "metric": "daily_active_users",
                "date": date.format("%Y-%m-%d").to_string(),
                "value": rng.random_range(100..=1000u32),
            })
        })
        .collect();

    MockData {
        customers,
        tickets,
        analytics,
    }
}

fn write_blob(path: &Path, records: &[Value]) -> Result<()> {
    let body = serde_json::to_string_pretty(records)?;
    std::fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}

/// Generates mock data and writes it into `dir`, creating it if needed.
/// Returns the paths written.
pub fn write_mock_data(dir: &Path, options: &MockOptions) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

    let data = generate(options, Utc::now());
    let blobs = [
        ("customers.json", &data.customers),
        ("support_tickets.json", &data.tickets),
        ("analytics.json", &data.analytics),
    ];

    let mut written = Vec::with_capacity(blobs.len());
    for (name, records) in blobs {
        let path = dir.join(name);
        write_blob(&path, records)?;
        tracing::info!(path = %path.display(), records = records.len(), "wrote mock data");
        written.push(path);
    }
    Ok(written)
}
