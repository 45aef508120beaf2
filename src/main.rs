use std::io::Read;

use tracing::{info, warn};

use nightbook::check::{CheckRequest, run_check};
use nightbook::config::Config;
use nightbook::engine::Engine;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = Config::from_env()?;
    let engine = Engine::from_config(&config);
    info!(
        "nightbook: {} slots of {}h, session tier at {} consecutive or {} total",
        config.slot_count, config.slot_hours, config.session_min_run, config.session_min_total
    );

    // Request comes from the path argument, or stdin when none is given.
    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let request: CheckRequest = serde_json::from_str(&input)?;
    info!(
        "checking {} for {} ({} reservation records)",
        request.domain.as_str(),
        request.date,
        request.reservations.len()
    );

    let report = run_check(&engine, &request);
    if !report.conflicts.is_empty() {
        warn!("selected slots already taken: {:?}", report.conflicts);
    }
    if !report.table_conflicts.is_empty() {
        warn!("selected tables already taken: {:?}", report.table_conflicts);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
