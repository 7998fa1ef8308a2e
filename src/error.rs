use std::fmt;
use std::io;

use chrono::NaiveDate;

use smartstring::alias::{String as SmartString};


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
	NonIncreasingDate{
		country: SmartString,
		prev: NaiveDate,
		date: NaiveDate,
	},
	DecreasingCumulative{
		country: SmartString,
		date: NaiveDate,
		prev: u64,
		cumulative: u64,
	},
}

impl fmt::Display for SeriesError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::NonIncreasingDate{country, prev, date} => write!(f, "series for {:?}: date {} does not follow {}", country, date, prev),
			Self::DecreasingCumulative{country, date, prev, cumulative} => write!(f, "series for {:?}: cumulative count drops from {} to {} on {}", country, prev, cumulative, date),
		}
	}
}

impl std::error::Error for SeriesError {}


#[derive(Debug)]
pub enum LoadError {
	Io(io::Error),
	Csv(csv::Error),
	Request(reqwest::Error),
	GeoJson(geojson::Error),
	Series(SeriesError),
	NotAFeatureCollection,
	MissingProperty{
		index: usize,
		property: String,
	},
	UnsupportedGeometry{
		name: SmartString,
	},
}

impl fmt::Display for LoadError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Io(e) => fmt::Display::fmt(e, f),
			Self::Csv(e) => fmt::Display::fmt(e, f),
			Self::Request(e) => fmt::Display::fmt(e, f),
			Self::GeoJson(e) => fmt::Display::fmt(e, f),
			Self::Series(e) => fmt::Display::fmt(e, f),
			Self::NotAFeatureCollection => write!(f, "boundary data is not a FeatureCollection"),
			Self::MissingProperty{index, property} => write!(f, "feature #{} has no string property {:?}", index, property),
			Self::UnsupportedGeometry{name} => write!(f, "feature {:?} has no usable geometry", name),
		}
	}
}

impl std::error::Error for LoadError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(e) => Some(e),
			Self::Csv(e) => Some(e),
			Self::Request(e) => Some(e),
			Self::GeoJson(e) => Some(e),
			Self::Series(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for LoadError {
	fn from(err: io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<csv::Error> for LoadError {
	fn from(err: csv::Error) -> Self {
		Self::Csv(err)
	}
}

impl From<reqwest::Error> for LoadError {
	fn from(err: reqwest::Error) -> Self {
		Self::Request(err)
	}
}

impl From<geojson::Error> for LoadError {
	fn from(err: geojson::Error) -> Self {
		Self::GeoJson(err)
	}
}

impl From<SeriesError> for LoadError {
	fn from(err: SeriesError) -> Self {
		Self::Series(err)
	}
}
