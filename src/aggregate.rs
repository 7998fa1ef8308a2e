use std::collections::HashMap;

use enum_map::EnumMap;

use log::trace;

use smartstring::alias::{String as SmartString};

use super::names::canonicalize;
use super::records::{CaseRecord, Gender, Hospitalisation};
use super::series::{DailyDelta, SeriesSet};


/// Number of countries given their own slice in the breakdown pie.
pub const PIE_SLICES: usize = 9;

pub static OTHER_LABEL: &'static str = "Other";


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryAggregate {
	pub name: SmartString,
	pub total: u64,
	pub delta: DailyDelta,
	/// 1-based position in the ordering returned by [`aggregate`].
	pub rank: usize,
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
	pub label: SmartString,
	pub count: u64,
}


/// Count cases per canonical country name.
pub fn count_by_country<'x, I: IntoIterator<Item = &'x CaseRecord>>(records: I) -> HashMap<SmartString, u64> {
	let mut counts: HashMap<SmartString, u64> = HashMap::new();
	for rec in records {
		let name = canonicalize(&rec.country);
		match counts.get_mut(name) {
			Some(v) => *v += 1,
			None => {
				counts.insert(name.into(), 1);
			},
		}
	}
	counts
}

/// Order countries by case count, descending, equal counts by name.
pub fn ranked(counts: HashMap<SmartString, u64>, series: &SeriesSet) -> Vec<CountryAggregate> {
	let mut result: Vec<CountryAggregate> = counts.into_iter().map(|(name, total)| {
		let delta = series.daily_delta(&name);
		if delta == DailyDelta::NotAvailable {
			trace!("no series for {:?}", name);
		}
		CountryAggregate{
			name,
			total,
			delta,
			rank: 0,
		}
	}).collect();
	result.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
	for (i, agg) in result.iter_mut().enumerate() {
		agg.rank = i + 1;
	}
	result
}

pub fn aggregate(records: &[CaseRecord], series: &SeriesSet) -> Vec<CountryAggregate> {
	ranked(count_by_country(records), series)
}

/// Keep the first `n` entries and fold the rest into one trailing
/// [`OTHER_LABEL`] slice. No such slice is added when nothing is left over.
pub fn top_n(aggregates: &[CountryAggregate], n: usize) -> Vec<Slice> {
	let mut result: Vec<Slice> = aggregates.iter().take(n).map(|a| Slice{
		label: a.name.clone(),
		count: a.total,
	}).collect();
	if aggregates.len() > n {
		let rest = aggregates[n..].iter().map(|a| a.total).sum();
		result.push(Slice{
			label: OTHER_LABEL.into(),
			count: rest,
		});
	}
	result
}


pub type GenderBreakdown = EnumMap<Gender, u64>;
pub type HospitalisationBreakdown = EnumMap<Hospitalisation, u64>;

pub fn gender_breakdown<'x, I: IntoIterator<Item = &'x CaseRecord>>(records: I) -> GenderBreakdown {
	let mut result = GenderBreakdown::default();
	for rec in records {
		result[rec.gender] += 1;
	}
	result
}

pub fn hospitalisation_breakdown<'x, I: IntoIterator<Item = &'x CaseRecord>>(records: I) -> HospitalisationBreakdown {
	let mut result = HospitalisationBreakdown::default();
	for rec in records {
		result[rec.hospitalised] += 1;
	}
	result
}

/// The two-slice gender pie; cases without a reported gender are left out.
pub fn gender_slices(b: &GenderBreakdown) -> Vec<Slice> {
	vec![
		Slice{label: Gender::Male.to_string().into(), count: b[Gender::Male]},
		Slice{label: Gender::Female.to_string().into(), count: b[Gender::Female]},
	]
}

/// The two-bar hospitalisation chart; unreported cases are left out.
pub fn hospitalisation_bars(b: &HospitalisationBreakdown) -> Vec<Slice> {
	vec![
		Slice{label: Hospitalisation::Hospitalised.to_string().into(), count: b[Hospitalisation::Hospitalised]},
		Slice{label: Hospitalisation::NotHospitalised.to_string().into(), count: b[Hospitalisation::NotHospitalised]},
	]
}
