use std::env;
use std::io;

use chrono::{DateTime, Utc};

use log::{info, trace, warn};

use super::error::LoadError;
use super::geojoin::Boundary;
use super::ioutil::open_source;
use super::records::{CaseRecord, CountrySeriesRow, GlobalSeriesRow, StateCaseRecord};
use super::series::{global_series, CountrySeries, SeriesSet};


pub static DEFAULT_CASES_URL: &'static str = "https://raw.githubusercontent.com/globaldothealth/monkeypox/main/latest.csv";
pub static DEFAULT_SERIES_URL: &'static str = "https://raw.githubusercontent.com/globaldothealth/monkeypox/main/timeseries-country-confirmed.csv";
pub static DEFAULT_TOTALS_URL: &'static str = "https://raw.githubusercontent.com/globaldothealth/monkeypox/main/timeseries-confirmed.csv";

/// Property holding the country name in Natural Earth admin-0 boundaries.
pub static NATURAL_EARTH_NAME: &'static str = "NAME";


/// Where the input tables come from. Each entry is a URL or a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
	pub cases: String,
	pub series: String,
	pub totals: String,
	pub boundaries: Option<String>,
}

impl Default for Sources {
	fn default() -> Self {
		Self{
			cases: DEFAULT_CASES_URL.into(),
			series: DEFAULT_SERIES_URL.into(),
			totals: DEFAULT_TOTALS_URL.into(),
			boundaries: None,
		}
	}
}

pub fn env_sources() -> Sources {
	let defaults = Sources::default();
	Sources{
		cases: env::var("MPXV_CASES_URL").unwrap_or(defaults.cases),
		series: env::var("MPXV_SERIES_URL").unwrap_or(defaults.series),
		totals: env::var("MPXV_TOTALS_URL").unwrap_or(defaults.totals),
		boundaries: env::var("MPXV_BOUNDARIES").ok(),
	}
}


/// Read the line list, keeping confirmed and suspected cases only.
pub fn load_case_records<R: io::Read>(r: R) -> Result<Vec<CaseRecord>, LoadError> {
	let mut r = csv::Reader::from_reader(r);
	let mut result = Vec::new();
	let mut skipped = 0;
	for row in r.deserialize() {
		let rec: CaseRecord = row?;
		if !rec.status.counted() {
			trace!("skipping {:?} case in {:?}", rec.status, rec.country);
			skipped += 1;
			continue
		}
		result.push(rec);
	}
	info!("loaded {} case records ({} skipped by status)", result.len(), skipped);
	Ok(result)
}

pub fn load_country_series<R: io::Read>(r: R) -> Result<SeriesSet, LoadError> {
	let mut r = csv::Reader::from_reader(r);
	let rows = r.deserialize().collect::<Result<Vec<CountrySeriesRow>, _>>()?;
	let nrows = rows.len();
	let set = SeriesSet::from_rows(rows)?;
	info!("loaded {} series rows for {} countries", nrows, set.len());
	Ok(set)
}

pub fn load_global_series<R: io::Read>(r: R) -> Result<CountrySeries, LoadError> {
	let mut r = csv::Reader::from_reader(r);
	let rows = r.deserialize().collect::<Result<Vec<GlobalSeriesRow>, _>>()?;
	Ok(global_series(rows)?)
}

pub fn load_state_cases<R: io::Read>(r: R) -> Result<Vec<StateCaseRecord>, LoadError> {
	let mut r = csv::Reader::from_reader(r);
	Ok(r.deserialize().collect::<Result<Vec<StateCaseRecord>, _>>()?)
}

/// Read boundaries from a GeoJSON FeatureCollection.
pub fn load_boundaries<R: io::Read>(mut r: R, name_property: &str) -> Result<Vec<Boundary>, LoadError> {
	let mut buf = String::new();
	r.read_to_string(&mut buf)?;
	let fc = match buf.parse::<geojson::GeoJson>()? {
		geojson::GeoJson::FeatureCollection(fc) => fc,
		_ => return Err(LoadError::NotAFeatureCollection),
	};
	let mut result = Vec::with_capacity(fc.features.len());
	for (i, feature) in fc.features.into_iter().enumerate() {
		result.push(Boundary::from_feature(i, feature, name_property)?);
	}
	info!("loaded {} boundaries", result.len());
	Ok(result)
}


/// All input tables of one refresh.
#[derive(Debug, Clone)]
pub struct Inputs {
	pub fetched_at: DateTime<Utc>,
	pub cases: Vec<CaseRecord>,
	pub series: SeriesSet,
	pub totals: CountrySeries,
	pub boundaries: Option<Vec<Boundary>>,
}

pub fn load_inputs(sources: &Sources) -> Result<Inputs, LoadError> {
	let fetched_at = Utc::now();
	let cases = load_case_records(open_source(&sources.cases)?)?;
	let series = load_country_series(open_source(&sources.series)?)?;
	let totals = load_global_series(open_source(&sources.totals)?)?;
	let boundaries = match sources.boundaries.as_ref() {
		Some(src) => Some(load_boundaries(open_source(src)?, NATURAL_EARTH_NAME)?),
		None => None,
	};
	if series.is_empty() {
		warn!("per-country series from {} is empty", sources.series);
	}
	Ok(Inputs{
		fetched_at,
		cases,
		series,
		totals,
		boundaries,
	})
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_filter_drops_discarded_cases() {
		let data = "Status,Country\nconfirmed,Peru\ndiscarded,Peru\nsuspected,Chile\nomit_error,Chile\n";
		let recs = load_case_records(data.as_bytes()).unwrap();
		assert_eq!(recs.len(), 2);
		assert_eq!(recs[0].country, "Peru");
		assert_eq!(recs[1].country, "Chile");
	}

	#[test]
	fn malformed_csv_is_reported() {
		let data = "Country,Date,Cases,Cumulative_cases\nPeru,2022-07-01,many,1\n";
		assert!(matches!(load_country_series(data.as_bytes()), Err(LoadError::Csv(_))));
	}

	#[test]
	fn invalid_series_is_reported() {
		let data = "Date,Cases,Cumulative_cases\n2022-07-01,1,5\n2022-07-01,1,6\n";
		assert!(matches!(load_global_series(data.as_bytes()), Err(LoadError::Series(_))));
	}

	#[test]
	fn boundaries_must_be_a_feature_collection() {
		let data = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
		assert!(matches!(load_boundaries(data.as_bytes(), NATURAL_EARTH_NAME), Err(LoadError::NotAFeatureCollection)));
	}

	#[test]
	fn state_cases_read() {
		let data = "state,cases,note\nTexas,40,x\nOhio,2,\n";
		let rows = load_state_cases(data.as_bytes()).unwrap();
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[1].cases, 2);
	}

	#[test]
	fn defaults_point_at_global_health() {
		let s = Sources::default();
		assert!(s.cases.ends_with("latest.csv"));
		assert!(s.boundaries.is_none());
	}
}
