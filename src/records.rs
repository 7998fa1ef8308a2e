use std::fmt;

use serde::{de, Deserialize, Deserializer};

use chrono::naive::NaiveDate;

use enum_map::{Enum};

use smartstring::alias::{String as SmartString};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Gender {
	Male,
	Female,
	Unknown,
}

impl Default for Gender {
	fn default() -> Self {
		Self::Unknown
	}
}

impl fmt::Display for Gender {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Male => f.write_str("Male"),
			Self::Female => f.write_str("Female"),
			Self::Unknown => f.write_str("Unknown"),
		}
	}
}

impl<'de> Deserialize<'de> for Gender {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where D: Deserializer<'de>
	{
		let s = String::deserialize(deserializer)?;
		if s.eq_ignore_ascii_case("male") {
			Ok(Self::Male)
		} else if s.eq_ignore_ascii_case("female") {
			Ok(Self::Female)
		} else {
			Ok(Self::Unknown)
		}
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Hospitalisation {
	Hospitalised,
	NotHospitalised,
	NotAvailable,
}

impl Default for Hospitalisation {
	fn default() -> Self {
		Self::NotAvailable
	}
}

impl fmt::Display for Hospitalisation {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Hospitalised => f.write_str("Hospitalized"),
			Self::NotHospitalised => f.write_str("Not Hospitalized"),
			Self::NotAvailable => f.write_str("Not Available"),
		}
	}
}

impl<'de> Deserialize<'de> for Hospitalisation {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where D: Deserializer<'de>
	{
		let s = String::deserialize(deserializer)?;
		match s.trim() {
			"Y" | "y" => Ok(Self::Hospitalised),
			"N" | "n" => Ok(Self::NotHospitalised),
			_ => Ok(Self::NotAvailable),
		}
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
	Confirmed,
	Suspected,
	Discarded,
	Other,
}

impl Status {
	/// Whether a case with this status counts towards the dashboard totals.
	pub fn counted(&self) -> bool {
		match self {
			Self::Confirmed | Self::Suspected => true,
			_ => false,
		}
	}
}

// line lists without a Status column are taken as already filtered
impl Default for Status {
	fn default() -> Self {
		Self::Confirmed
	}
}

impl<'de> Deserialize<'de> for Status {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where D: Deserializer<'de>
	{
		let s = String::deserialize(deserializer)?;
		match s.as_str() {
			"confirmed" => Ok(Self::Confirmed),
			"suspected" => Ok(Self::Suspected),
			"discarded" => Ok(Self::Discarded),
			_ => Ok(Self::Other),
		}
	}
}


fn series_date_compat<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
	where D: Deserializer<'de>
{
	let mut s = String::deserialize(deserializer)?;
	if s.len() == 10 {
		s.replace("/", "-").parse::<NaiveDate>().map_err(de::Error::custom)
	} else if s.len() == 19 {
		// date with a midnight timestamp attached
		s.truncate(10);
		s.replace("/", "-").parse::<NaiveDate>().map_err(de::Error::custom)
	} else {
		Err(de::Error::custom("invalid length for date, must be either 10 or 19 bytes"))
	}
}


/// One row of the per-case line list. Columns not named here are ignored.
#[derive(Debug, Clone, Hash, Deserialize)]
pub struct CaseRecord {
	#[serde(rename = "Country")]
	pub country: SmartString,
	#[serde(rename = "Gender", default)]
	pub gender: Gender,
	#[serde(rename = "Hospitalised (Y/N/NA)", alias = "Hospitalised", default)]
	pub hospitalised: Hospitalisation,
	#[serde(rename = "Status", default)]
	pub status: Status,
}

impl CaseRecord {
	pub fn new<S: Into<SmartString>>(country: S) -> Self {
		Self{
			country: country.into(),
			gender: Gender::Unknown,
			hospitalised: Hospitalisation::NotAvailable,
			status: Status::Confirmed,
		}
	}
}


#[derive(Debug, Clone, Deserialize)]
pub struct CountrySeriesRow {
	#[serde(rename = "Country")]
	pub country: SmartString,
	#[serde(rename = "Date", deserialize_with = "series_date_compat")]
	pub date: NaiveDate,
	#[serde(rename = "Cases")]
	pub cases: u64,
	#[serde(rename = "Cumulative_cases", alias = "Cumulative Cases")]
	pub cumulative: u64,
}


#[derive(Debug, Clone, Deserialize)]
pub struct GlobalSeriesRow {
	#[serde(rename = "Date", deserialize_with = "series_date_compat")]
	pub date: NaiveDate,
	#[serde(rename = "Cases")]
	pub cases: u64,
	#[serde(rename = "Cumulative_cases", alias = "Cumulative Cases")]
	pub cumulative: u64,
}


#[derive(Debug, Clone, Deserialize)]
pub struct StateCaseRecord {
	#[serde(rename = "state")]
	pub state: SmartString,
	#[serde(rename = "cases")]
	pub cases: u64,
}


#[cfg(test)]
mod tests {
	use super::*;

	fn read_cases(data: &str) -> Vec<CaseRecord> {
		let mut r = csv::Reader::from_reader(data.as_bytes());
		r.deserialize().collect::<Result<Vec<CaseRecord>, _>>().unwrap()
	}

	#[test]
	fn case_record_reads_known_columns_and_ignores_the_rest() {
		let recs = read_cases("ID,Status,Country,Gender,Hospitalised (Y/N/NA),Source\n\
			1,confirmed,Germany,male,Y,http://x\n\
			2,suspected,Spain,Female,N,\n\
			3,discarded,Spain,,NA,\n");
		assert_eq!(recs.len(), 3);
		assert_eq!(recs[0].country, "Germany");
		assert_eq!(recs[0].gender, Gender::Male);
		assert_eq!(recs[0].hospitalised, Hospitalisation::Hospitalised);
		assert_eq!(recs[0].status, Status::Confirmed);
		assert_eq!(recs[1].gender, Gender::Female);
		assert_eq!(recs[1].hospitalised, Hospitalisation::NotHospitalised);
		assert_eq!(recs[1].status, Status::Suspected);
		assert_eq!(recs[2].gender, Gender::Unknown);
		assert_eq!(recs[2].hospitalised, Hospitalisation::NotAvailable);
		assert!(!recs[2].status.counted());
	}

	#[test]
	fn case_record_defaults_optional_columns() {
		let recs = read_cases("Country\nPeru\n");
		assert_eq!(recs[0].gender, Gender::Unknown);
		assert_eq!(recs[0].hospitalised, Hospitalisation::NotAvailable);
		assert!(recs[0].status.counted());
	}

	#[test]
	fn series_row_accepts_both_cumulative_headers_and_date_forms() {
		let mut r = csv::Reader::from_reader("Country,Date,Cases,Cumulative_cases\nPeru,2022-07-01,3,10\nPeru,2022/07/02 00:00:00,1,11\n".as_bytes());
		let rows: Vec<CountrySeriesRow> = r.deserialize().collect::<Result<_, _>>().unwrap();
		assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2022, 7, 1).unwrap());
		assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2022, 7, 2).unwrap());
		assert_eq!(rows[1].cumulative, 11);

		let mut r = csv::Reader::from_reader("Date,Cases,Cumulative Cases\n2022-07-01,3,10\n".as_bytes());
		let rows: Vec<GlobalSeriesRow> = r.deserialize().collect::<Result<_, _>>().unwrap();
		assert_eq!(rows[0].cumulative, 10);
	}

	#[test]
	fn series_row_rejects_garbage_dates() {
		let mut r = csv::Reader::from_reader("Date,Cases,Cumulative_cases\nyesterday,3,10\n".as_bytes());
		let row: Result<GlobalSeriesRow, _> = r.deserialize().next().unwrap();
		assert!(row.is_err());
	}
}
