use std::io;
use std::io::Read;
use std::fs;
use std::path::Path;

use bytes::Buf;

use log::info;

use flate2;

use super::error::LoadError;


fn is_gzip(name: &str) -> bool {
	name.ends_with(".gz")
}

fn is_url(source: &str) -> bool {
	source.starts_with("http://") || source.starts_with("https://")
}


pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	match path.extension() {
		Some(x) if x == "gz" => {
			Ok(Box::new(flate2::read::GzDecoder::new(fs::File::open(path)?)))
		},
		_ => Ok(Box::new(fs::File::open(path)?)),
	}
}

/// Open a data source, fetching it over HTTP if it looks like a URL and
/// reading it from disk otherwise. Gzip is undone on `.gz` in both cases.
pub fn open_source(source: &str) -> Result<Box<dyn Read>, LoadError> {
	if !is_url(source) {
		return Ok(magic_open(source)?)
	}
	info!("fetching {}", source);
	let body = reqwest::blocking::get(source)?.error_for_status()?.bytes()?;
	info!("fetched {} bytes from {}", body.len(), source);
	let r = body.reader();
	if is_gzip(source) {
		Ok(Box::new(flate2::read::GzDecoder::new(r)))
	} else {
		Ok(Box::new(r))
	}
}
