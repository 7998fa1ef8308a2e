//! Country name reconciliation.
//!
//! The line list, the per-country series and the Natural Earth boundaries
//! disagree on how some countries are spelled. Every name is passed through
//! [`canonicalize`] before it is used as a grouping or join key, so that all
//! three sources meet on the spelling used by the line list.

pub static UNITED_KINGDOM: &'static str = "United Kingdom";

/// Territories the line list reports separately and which are counted
/// towards the United Kingdom.
pub static UK_CONSTITUENTS: &'static [&'static str] = &[
	"England",
	"Scotland",
	"Wales",
	"Northern Ireland",
	"Cayman Islands",
];

/// Fixed source spelling -> canonical name pairs. No canonical name on the
/// right appears on the left, which keeps [`canonicalize`] idempotent.
pub static ALIASES: &'static [(&'static str, &'static str)] = &[
	("United States of America", "United States"),
	("Bosnia and Herz.", "Bosnia And Herzegovina"),
	("Congo", "Republic of Congo"),
	("Dem. Rep. Congo", "Democratic Republic Of The Congo"),
	("Dominican Rep.", "Dominican Republic"),
	("Central African Rep.", "Central African Republic"),
	("Czechia", "Czech Republic"),
	("England", UNITED_KINGDOM),
	("Scotland", UNITED_KINGDOM),
	("Wales", UNITED_KINGDOM),
	("Northern Ireland", UNITED_KINGDOM),
	("Cayman Islands", UNITED_KINGDOM),
];


/// Map a raw country name from any source to its canonical name.
///
/// Unknown names are returned unchanged.
pub fn canonicalize<'x>(raw: &'x str) -> &'x str {
	for (from, to) in ALIASES.iter() {
		if *from == raw {
			return to
		}
	}
	raw
}

pub fn is_uk_constituent(raw: &str) -> bool {
	UK_CONSTITUENTS.iter().any(|c| *c == raw)
}
