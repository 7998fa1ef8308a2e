use std::io;

use log::warn;

use mpxv::{load_snapshot, naive_today, write_summary, write_table, SnapshotCache};


static STALE_AFTER_DAYS: i64 = 7;


fn main() -> Result<(), Box<dyn std::error::Error>> {
	pretty_env_logger::init();
	let argv: Vec<String> = std::env::args().collect();

	let cache = SnapshotCache::new();
	let snapshot = load_snapshot(&cache)?;

	if let Some(date) = snapshot.last_updated() {
		let age = (naive_today() - date).num_days();
		if age > STALE_AFTER_DAYS {
			warn!("newest data is {} days old", age);
		}
	}

	let stdout = io::stdout();
	let mut out = stdout.lock();
	match argv.get(1).map(|s| s.as_str()) {
		Some("--csv") => write_table(&mut out, &snapshot.aggregates)?,
		_ => write_summary(&mut out, &snapshot)?,
	}
	Ok(())
}
