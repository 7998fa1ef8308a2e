use std::io;

use serde::Serialize;

use serde_json::{json, Value as JsonValue};

use super::aggregate::{gender_slices, hospitalisation_bars, CountryAggregate, Slice};
use super::geojoin::GeoJoinedRow;
use super::series::format_last_updated;
use super::snapshot::Snapshot;


#[derive(Debug, Serialize)]
struct TableRow<'x> {
	#[serde(rename = "Rank")]
	rank: usize,
	#[serde(rename = "Country")]
	country: &'x str,
	#[serde(rename = "Cases")]
	cases: u64,
	#[serde(rename = "Increase From Yesterday")]
	delta: String,
}

/// Write the ranked case table as CSV.
pub fn write_table<W: io::Write>(w: W, aggregates: &[CountryAggregate]) -> Result<(), csv::Error> {
	let mut w = csv::Writer::from_writer(w);
	for agg in aggregates {
		w.serialize(TableRow{
			rank: agg.rank,
			country: &agg.name,
			cases: agg.total,
			delta: agg.delta.to_string(),
		})?;
	}
	w.flush()?;
	Ok(())
}

fn feature(row: &GeoJoinedRow) -> geojson::Feature {
	let mut properties = geojson::JsonObject::new();
	properties.insert("name".into(), json!(row.name.as_str()));
	properties.insert("cases".into(), json!(row.count));
	properties.insert("delta".into(), row.delta.value().map(JsonValue::from).unwrap_or(JsonValue::Null));
	properties.insert("rank".into(), row.rank.map(JsonValue::from).unwrap_or(JsonValue::Null));
	geojson::Feature{
		bbox: None,
		geometry: Some(geojson::Geometry::new(geojson::Value::from(&row.geometry))),
		id: None,
		properties: Some(properties),
		foreign_members: None,
	}
}

/// Write joined rows as a GeoJSON FeatureCollection for the choropleth.
pub fn write_joined_geojson<W: io::Write>(w: W, rows: &[GeoJoinedRow]) -> io::Result<()> {
	let fc = geojson::FeatureCollection{
		bbox: None,
		features: rows.iter().map(feature).collect(),
		foreign_members: None,
	};
	serde_json::to_writer(w, &geojson::GeoJson::FeatureCollection(fc))?;
	Ok(())
}

fn write_slices<W: io::Write>(w: &mut W, slices: &[Slice]) -> io::Result<()> {
	let total: u64 = slices.iter().map(|s| s.count).sum();
	for s in slices {
		let share = if total == 0 {
			0.
		} else {
			s.count as f64 / total as f64 * 100.
		};
		writeln!(w, "  {:<40} {:>8} {:>5.1}%", s.label, s.count, share)?;
	}
	Ok(())
}

/// Plain-text rendering of a snapshot for terminals.
pub fn write_summary<W: io::Write>(w: &mut W, snapshot: &Snapshot) -> io::Result<()> {
	match snapshot.last_updated() {
		Some(date) => writeln!(w, "Data last updated {}.", format_last_updated(date))?,
		None => writeln!(w, "No series data available.")?,
	}
	writeln!(w, "{} cases in {} countries", snapshot.total_cases(), snapshot.aggregates.len())?;
	writeln!(w)?;

	writeln!(w, "{:>4}  {:<40} {:>8} {:>14}", "#", "Country", "Cases", "Since yesterday")?;
	for agg in snapshot.aggregates.iter() {
		writeln!(w, "{:>4}  {:<40} {:>8} {:>14}", agg.rank, agg.name, agg.total, agg.delta.to_string())?;
	}
	writeln!(w)?;

	writeln!(w, "Breakdown of global cases:")?;
	write_slices(w, &snapshot.pie)?;
	writeln!(w, "Gender distribution:")?;
	write_slices(w, &gender_slices(&snapshot.gender))?;
	writeln!(w, "Hospitalization:")?;
	write_slices(w, &hospitalisation_bars(&snapshot.hospitalisation))?;
	writeln!(w)?;
	writeln!(w, "Note: gender and hospitalization were not reported for all cases.")?;
	Ok(())
}
