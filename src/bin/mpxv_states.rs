use std::fs::File;
use std::io::BufWriter;

use log::info;

use mpxv::{colour_scale_max, join_inner, load_boundaries, load_state_cases, open_source, write_joined_geojson};


static STATE_NAME_PROPERTY: &'static str = "NAME";


fn main() -> Result<(), Box<dyn std::error::Error>> {
	pretty_env_logger::init();
	let argv: Vec<String> = std::env::args().collect();
	if argv.len() != 4 {
		eprintln!("usage: {} <states.geojson> <state_cases.csv> <out.geojson>", argv[0]);
		std::process::exit(2);
	}

	let boundaries = load_boundaries(open_source(&argv[1])?, STATE_NAME_PROPERTY)?;
	let counts = load_state_cases(open_source(&argv[2])?)?;
	let rows = join_inner(&boundaries, &counts);
	info!("{} of {} states have case data, colour scale 0 .. {}", rows.len(), boundaries.len(), colour_scale_max(&rows));

	write_joined_geojson(BufWriter::new(File::create(&argv[3])?), &rows)?;
	Ok(())
}
