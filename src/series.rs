use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use chrono::NaiveDate;

use log::debug;

use smartstring::alias::{String as SmartString};

use super::error::SeriesError;
use super::names::canonicalize;
use super::records::{CountrySeriesRow, GlobalSeriesRow};


/// Countries shown on the cumulative line chart until the user picks others.
pub static DEFAULT_SELECTION: &'static [&'static str] = &[
	"United States",
	"Germany",
	"Spain",
	"United Kingdom",
];

/// Leading rows of the global series hidden from the totals chart; the
/// first weeks of reporting are close to zero and flatten the plot.
pub const GLOBAL_SERIES_SKIP: usize = 60;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesPoint {
	pub date: NaiveDate,
	pub cases: u64,
	pub cumulative: u64,
}


/// Most recent daily count of a country, or the fact that there is none.
///
/// A zero is a real observation and is kept apart from missing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DailyDelta {
	Available(u64),
	NotAvailable,
}

impl DailyDelta {
	pub fn value(&self) -> Option<u64> {
		match self {
			Self::Available(v) => Some(*v),
			Self::NotAvailable => None,
		}
	}
}

impl From<Option<u64>> for DailyDelta {
	fn from(other: Option<u64>) -> Self {
		match other {
			Some(v) => Self::Available(v),
			None => Self::NotAvailable,
		}
	}
}

impl fmt::Display for DailyDelta {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Available(v) => write!(f, "{}", v),
			Self::NotAvailable => f.write_str("Not Available"),
		}
	}
}


/// Daily and cumulative counts of one country, dates strictly increasing and
/// cumulative counts never decreasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySeries {
	name: SmartString,
	points: Vec<SeriesPoint>,
}

impl CountrySeries {
	pub fn new<S: Into<SmartString>>(name: S) -> Self {
		Self{
			name: name.into(),
			points: Vec::new(),
		}
	}

	/// Build a series from rows in any order. Rows are sorted by date first;
	/// duplicate dates and shrinking cumulative counts are still rejected.
	pub fn from_points<S: Into<SmartString>>(name: S, mut points: Vec<SeriesPoint>) -> Result<Self, SeriesError> {
		points.sort_by_key(|p| p.date);
		let mut result = Self::new(name);
		result.points.reserve(points.len());
		for p in points {
			result.push(p.date, p.cases, p.cumulative)?;
		}
		Ok(result)
	}

	pub fn push(&mut self, date: NaiveDate, cases: u64, cumulative: u64) -> Result<(), SeriesError> {
		if let Some(last) = self.points.last() {
			if date <= last.date {
				return Err(SeriesError::NonIncreasingDate{
					country: self.name.clone(),
					prev: last.date,
					date,
				})
			}
			if cumulative < last.cumulative {
				return Err(SeriesError::DecreasingCumulative{
					country: self.name.clone(),
					date,
					prev: last.cumulative,
					cumulative,
				})
			}
		}
		self.points.push(SeriesPoint{date, cases, cumulative});
		Ok(())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn points(&self) -> &[SeriesPoint] {
		&self.points[..]
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	pub fn last(&self) -> Option<&SeriesPoint> {
		self.points.last()
	}

	pub fn last_date(&self) -> Option<NaiveDate> {
		self.last().map(|p| p.date)
	}

	/// The daily count of the most recent row.
	pub fn daily_delta(&self) -> DailyDelta {
		self.last().map(|p| p.cases).into()
	}

	pub fn skip_leading(&self, n: usize) -> Self {
		Self{
			name: self.name.clone(),
			points: self.points.iter().skip(n).copied().collect(),
		}
	}

	/// Sum two series date by date. On a date only one side reports, the
	/// other side contributes no daily cases and its last known cumulative.
	pub fn merged<S: Into<SmartString>>(&self, other: &CountrySeries, name: S) -> Self {
		let mut points = Vec::with_capacity(self.points.len().max(other.points.len()));
		let (mut i, mut j) = (0, 0);
		let (mut cum_l, mut cum_r) = (0u64, 0u64);
		loop {
			let (date, cases) = match (self.points.get(i), other.points.get(j)) {
				(Some(l), Some(r)) if l.date == r.date => {
					cum_l = l.cumulative;
					cum_r = r.cumulative;
					i += 1;
					j += 1;
					(l.date, l.cases + r.cases)
				},
				(Some(l), Some(r)) if l.date < r.date => {
					cum_l = l.cumulative;
					i += 1;
					(l.date, l.cases)
				},
				(Some(l), None) => {
					cum_l = l.cumulative;
					i += 1;
					(l.date, l.cases)
				},
				(_, Some(r)) => {
					cum_r = r.cumulative;
					j += 1;
					(r.date, r.cases)
				},
				(None, None) => break,
			};
			points.push(SeriesPoint{date, cases, cumulative: cum_l + cum_r});
		}
		Self{
			name: name.into(),
			points,
		}
	}
}


/// Per-country series keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SeriesSet {
	series: HashMap<SmartString, CountrySeries>,
}

impl SeriesSet {
	pub fn new() -> Self {
		Self{
			series: HashMap::new(),
		}
	}

	/// Group raw rows by country, validate each series and key the result by
	/// canonical name.
	pub fn from_rows<I: IntoIterator<Item = CountrySeriesRow>>(rows: I) -> Result<Self, SeriesError> {
		let mut grouped: HashMap<SmartString, Vec<SeriesPoint>> = HashMap::new();
		for row in rows {
			grouped.entry(row.country).or_insert_with(Vec::new).push(SeriesPoint{
				date: row.date,
				cases: row.cases,
				cumulative: row.cumulative,
			});
		}
		let mut raw = Self::new();
		for (country, points) in grouped {
			raw.insert(CountrySeries::from_points(country, points)?);
		}
		// a series already reported under the canonical name wins over the
		// parts that would be folded into it
		Ok(raw.rekeyed(|name| {
			let canonical = canonicalize(name);
			if canonical != name && raw.get(canonical).is_some() {
				debug!("dropping series {:?} in favour of {:?}", name, canonical);
				return None
			}
			Some(canonical.into())
		}))
	}

	/// Insert a series; a series already present under the same name is
	/// merged with it.
	pub fn insert(&mut self, series: CountrySeries) {
		match self.series.entry(series.name.clone()) {
			Entry::Occupied(mut e) => {
				debug!("merging duplicate series for {:?}", series.name);
				let merged = e.get().merged(&series, series.name.clone());
				e.insert(merged);
			},
			Entry::Vacant(e) => {
				e.insert(series);
			},
		}
	}

	pub fn rekeyed<F: Fn(&str) -> Option<SmartString>>(&self, f: F) -> SeriesSet {
		let mut result = SeriesSet::new();
		for series in self.series.values() {
			let k_new = match f(&series.name) {
				Some(k) => k,
				None => continue,
			};
			if k_new != series.name {
				debug!("series {:?} rekeyed to {:?}", series.name, k_new);
			}
			let mut series = series.clone();
			series.name = k_new;
			result.insert(series);
		}
		result
	}

	pub fn get(&self, name: &str) -> Option<&CountrySeries> {
		self.series.get(name)
	}

	pub fn daily_delta(&self, name: &str) -> DailyDelta {
		match self.get(name) {
			Some(s) => s.daily_delta(),
			None => DailyDelta::NotAvailable,
		}
	}

	/// Latest date reported by any country.
	pub fn last_updated(&self) -> Option<NaiveDate> {
		self.series.values().filter_map(|s| s.last_date()).max()
	}

	/// Series for the requested names in request order; names without a
	/// series are skipped.
	pub fn select<'x, S: AsRef<str>>(&'x self, names: &[S]) -> Vec<&'x CountrySeries> {
		names.iter().filter_map(|n| self.get(n.as_ref())).collect()
	}

	/// All country names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.series.keys().map(|k| k.as_str()).collect();
		names.sort_unstable();
		names
	}

	pub fn len(&self) -> usize {
		self.series.len()
	}

	pub fn is_empty(&self) -> bool {
		self.series.is_empty()
	}
}


pub fn global_series<I: IntoIterator<Item = GlobalSeriesRow>>(rows: I) -> Result<CountrySeries, SeriesError> {
	CountrySeries::from_points(
		"World",
		rows.into_iter().map(|r| SeriesPoint{date: r.date, cases: r.cases, cumulative: r.cumulative}).collect(),
	)
}

/// Render the data stamp shown in page headers, e.g. `Jul 05, 2022`.
pub fn format_last_updated(date: NaiveDate) -> String {
	date.format("%b %d, %Y").to_string()
}
