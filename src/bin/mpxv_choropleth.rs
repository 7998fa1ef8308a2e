use std::fs::File;
use std::io::BufWriter;

use log::info;

use mpxv::{colour_scale_max, env_sources, join, load_boundaries, load_case_records, load_country_series, open_source, aggregate, write_joined_geojson, NATURAL_EARTH_NAME};


fn main() -> Result<(), Box<dyn std::error::Error>> {
	pretty_env_logger::init();
	let argv: Vec<String> = std::env::args().collect();
	if argv.len() != 3 {
		eprintln!("usage: {} <boundaries.geojson> <out.geojson>", argv[0]);
		std::process::exit(2);
	}
	let sources = env_sources();

	println!("loading cases ...");
	let cases = load_case_records(open_source(&sources.cases)?)?;
	let series = load_country_series(open_source(&sources.series)?)?;
	let aggregates = aggregate(&cases, &series);

	println!("joining boundaries ...");
	let boundaries = load_boundaries(open_source(&argv[1])?, NATURAL_EARTH_NAME)?;
	let rows = join(&boundaries, &aggregates);
	info!("colour scale 0 .. {}", colour_scale_max(&rows));

	println!("writing {} regions to {} ...", rows.len(), argv[2]);
	write_joined_geojson(BufWriter::new(File::create(&argv[2])?), &rows)?;
	Ok(())
}
