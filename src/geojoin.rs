use std::collections::HashMap;
use std::convert::TryFrom;

use log::debug;

use smartstring::alias::{String as SmartString};

use super::aggregate::CountryAggregate;
use super::error::LoadError;
use super::names::{canonicalize, is_uk_constituent};
use super::records::StateCaseRecord;
use super::series::DailyDelta;


/// Boundaries dropped before joining, matched on canonical name. Boundaries
/// of UK constituents are dropped as well, their cases are drawn on the
/// United Kingdom polygon.
pub static EXCLUDED_BOUNDARIES: &'static [&'static str] = &[
	"Antarctica",
];


#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
	pub name: SmartString,
	pub geometry: geo::Geometry<f64>,
}

impl Boundary {
	pub fn new<S: Into<SmartString>>(name: S, geometry: geo::Geometry<f64>) -> Self {
		Self{
			name: name.into(),
			geometry,
		}
	}

	/// Read a boundary from a GeoJSON feature, taking the name from the
	/// string property `name_property`.
	pub fn from_feature(index: usize, feature: geojson::Feature, name_property: &str) -> Result<Self, LoadError> {
		let name: SmartString = match feature.property(name_property).and_then(|v| v.as_str()) {
			Some(v) => v.into(),
			None => return Err(LoadError::MissingProperty{
				index,
				property: name_property.into(),
			}),
		};
		let geometry = match feature.geometry {
			Some(g) => match geo::Geometry::<f64>::try_from(g) {
				Ok(g) => g,
				Err(_) => return Err(LoadError::UnsupportedGeometry{name}),
			},
			None => return Err(LoadError::UnsupportedGeometry{name}),
		};
		Ok(Self{name, geometry})
	}
}


/// A boundary with the case figures of its country attached.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJoinedRow {
	pub name: SmartString,
	pub geometry: geo::Geometry<f64>,
	pub count: u64,
	pub delta: DailyDelta,
	pub rank: Option<usize>,
}

impl GeoJoinedRow {
	fn unmatched(name: SmartString, geometry: geo::Geometry<f64>) -> Self {
		Self{
			name,
			geometry,
			count: 0,
			delta: DailyDelta::NotAvailable,
			rank: None,
		}
	}
}


/// Whether the boundary with source name `raw` is left off the map.
pub fn is_excluded(raw: &str) -> bool {
	if is_uk_constituent(raw) {
		return true
	}
	let name = canonicalize(raw);
	EXCLUDED_BOUNDARIES.iter().any(|n| *n == name)
}

/// Left-join boundaries to aggregates on canonical name.
///
/// Every boundary not excluded by [`EXCLUDED_BOUNDARIES`] yields exactly one
/// row; boundaries without case data get a count of zero.
pub fn join(boundaries: &[Boundary], aggregates: &[CountryAggregate]) -> Vec<GeoJoinedRow> {
	let by_name: HashMap<&str, &CountryAggregate> = aggregates.iter().map(|a| (a.name.as_str(), a)).collect();
	let mut result = Vec::with_capacity(boundaries.len());
	let mut unmatched = 0;
	for b in boundaries {
		if is_excluded(&b.name) {
			debug!("dropping excluded boundary {:?}", b.name);
			continue
		}
		let name = canonicalize(&b.name);
		let row = match by_name.get(name) {
			Some(agg) => GeoJoinedRow{
				name: name.into(),
				geometry: b.geometry.clone(),
				count: agg.total,
				delta: agg.delta,
				rank: Some(agg.rank),
			},
			None => {
				unmatched += 1;
				GeoJoinedRow::unmatched(name.into(), b.geometry.clone())
			},
		};
		result.push(row);
	}
	debug!("joined {} boundaries, {} without case data", result.len(), unmatched);
	result
}

/// Join boundaries to per-region counts by exact name, dropping boundaries
/// without a count.
pub fn join_inner(boundaries: &[Boundary], counts: &[StateCaseRecord]) -> Vec<GeoJoinedRow> {
	let by_name: HashMap<&str, u64> = counts.iter().map(|c| (c.state.as_str(), c.cases)).collect();
	boundaries.iter().filter_map(|b| {
		let count = *by_name.get(b.name.as_str())?;
		Some(GeoJoinedRow{
			name: b.name.clone(),
			geometry: b.geometry.clone(),
			count,
			delta: DailyDelta::NotAvailable,
			rank: None,
		})
	}).collect()
}

/// Upper end of the choropleth colour scale: the largest count rounded to
/// the nearest thousand, halves to the even thousand.
pub fn colour_scale_max(rows: &[GeoJoinedRow]) -> u64 {
	let max = rows.iter().map(|r| r.count).max().unwrap_or(0);
	let (mut thousands, rest) = (max / 1000, max % 1000);
	if rest > 500 || (rest == 500 && thousands % 2 == 1) {
		thousands += 1;
	}
	thousands * 1000
}


#[cfg(test)]
mod tests {
	use super::*;
	use geo::{polygon, Geometry};

	fn square(x: f64) -> Geometry<f64> {
		Geometry::Polygon(polygon![
			(x: x, y: 0.0),
			(x: x + 1.0, y: 0.0),
			(x: x + 1.0, y: 1.0),
			(x: x, y: 1.0),
		])
	}

	fn agg(name: &str, total: u64, rank: usize) -> CountryAggregate {
		CountryAggregate{
			name: name.into(),
			total,
			delta: DailyDelta::Available(1),
			rank,
		}
	}

	#[test]
	fn unmatched_boundary_joins_to_zero() {
		let boundaries = vec![
			Boundary::new("Dem. Rep. Congo", square(0.0)),
			Boundary::new("United States of America", square(1.0)),
		];
		let rows = join(&boundaries, &[agg("United States", 120, 1)]);
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0].name, "Democratic Republic Of The Congo");
		assert_eq!(rows[0].count, 0);
		assert_eq!(rows[0].delta, DailyDelta::NotAvailable);
		assert_eq!(rows[0].rank, None);
		assert_eq!(rows[1].name, "United States");
		assert_eq!(rows[1].count, 120);
		assert_eq!(rows[1].rank, Some(1));
		assert_eq!(rows[1].geometry, square(1.0));
	}

	#[test]
	fn row_count_is_boundaries_minus_excluded() {
		let boundaries = vec![
			Boundary::new("Peru", square(0.0)),
			Boundary::new("Antarctica", square(1.0)),
			Boundary::new("Chile", square(2.0)),
			Boundary::new("Chile", square(3.0)),
		];
		for aggs in vec![vec![], vec![agg("Peru", 3, 1)], vec![agg("Peru", 3, 1), agg("Chile", 2, 2), agg("Spain", 1, 3)]] {
			let rows = join(&boundaries, &aggs);
			assert_eq!(rows.len(), 3);
			assert!(rows.iter().all(|r| r.name != "Antarctica"));
		}
	}

	#[test]
	fn united_kingdom_boundary_gets_summed_count() {
		let boundaries = vec![Boundary::new("United Kingdom", square(0.0))];
		let recs: Vec<crate::CaseRecord> = vec!["England", "England", "Northern Ireland"].into_iter().map(crate::CaseRecord::new).collect();
		let aggs = crate::aggregate(&recs, &crate::SeriesSet::new());
		let rows = join(&boundaries, &aggs);
		assert_eq!(rows[0].count, 3);
	}

	#[test]
	fn constituent_boundary_is_not_a_second_united_kingdom() {
		let boundaries = vec![
			Boundary::new("United Kingdom", square(0.0)),
			Boundary::new("Cayman Islands", square(1.0)),
			Boundary::new("Jamaica", square(2.0)),
		];
		let rows = join(&boundaries, &[agg("United Kingdom", 7, 1)]);
		assert_eq!(rows.len(), 2);
		assert_eq!(rows.iter().filter(|r| r.name == "United Kingdom").count(), 1);
		assert_eq!(rows[0].geometry, square(0.0));
		assert_eq!(rows[0].count, 7);
		assert_eq!(rows[1].name, "Jamaica");
		assert!(is_excluded("Cayman Islands"));
		assert!(is_excluded("Antarctica"));
		assert!(!is_excluded("United Kingdom"));
	}

	#[test]
	fn inner_join_drops_unmatched() {
		let boundaries = vec![
			Boundary::new("Texas", square(0.0)),
			Boundary::new("Puerto Rico", square(1.0)),
		];
		let counts = vec![StateCaseRecord{state: "Texas".into(), cases: 40}];
		let rows = join_inner(&boundaries, &counts);
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].name, "Texas");
		assert_eq!(rows[0].count, 40);
	}

	#[test]
	fn colour_scale_rounds_to_thousands() {
		let row = |count| GeoJoinedRow{count, ..GeoJoinedRow::unmatched("x".into(), square(0.0))};
		assert_eq!(colour_scale_max(&[]), 0);
		assert_eq!(colour_scale_max(&[row(499)]), 0);
		assert_eq!(colour_scale_max(&[row(500)]), 0);
		assert_eq!(colour_scale_max(&[row(12), row(4_500)]), 4_000);
		assert_eq!(colour_scale_max(&[row(4_501)]), 5_000);
		assert_eq!(colour_scale_max(&[row(5_500)]), 6_000);
		assert_eq!(colour_scale_max(&[row(23_410), row(7)]), 23_000);
	}

	#[test]
	fn boundary_from_feature_reads_name_and_geometry() {
		let feature: geojson::Feature = serde_json::from_str(r#"{
			"type": "Feature",
			"properties": {"NAME": "Czechia", "POP_EST": 10000000},
			"geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}
		}"#).unwrap();
		let b = Boundary::from_feature(0, feature, "NAME").unwrap();
		assert_eq!(b.name, "Czechia");
		assert!(matches!(b.geometry, Geometry::Polygon(_)));

		let feature: geojson::Feature = serde_json::from_str(r#"{"type": "Feature", "properties": {}, "geometry": null}"#).unwrap();
		assert!(matches!(
			Boundary::from_feature(4, feature, "NAME"),
			Err(LoadError::MissingProperty{index: 4, ..})
		));
	}
}
