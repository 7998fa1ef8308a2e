use chrono::{NaiveDate, Utc};

mod aggregate;
mod error;
mod geojoin;
mod ioutil;
mod loader;
mod names;
mod output;
mod records;
mod series;
mod snapshot;

pub use aggregate::*;
pub use error::*;
pub use geojoin::*;
pub use ioutil::{magic_open, open_source};
pub use loader::*;
pub use names::*;
pub use output::*;
pub use records::*;
pub use series::*;
pub use snapshot::*;


pub fn naive_today() -> NaiveDate {
	Utc::now().date_naive()
}

/// Load every source named in the environment and build a snapshot of the
/// derived tables.
pub fn load_snapshot(cache: &SnapshotCache) -> Result<std::sync::Arc<Snapshot>, LoadError> {
	let inputs = load_inputs(&env_sources())?;
	Ok(cache.refresh_from(&inputs))
}
