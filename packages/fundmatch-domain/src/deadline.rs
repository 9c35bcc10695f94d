use regex::Regex;
use time::{Date, Month};

use crate::opportunity::Opportunity;

/// Where an opportunity stands relative to its deadline.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeadlineStatus {
	/// No deadline given; proposals are accepted on a rolling basis.
	Rolling,
	/// The deadline has passed.
	Closed,
	/// The deadline is today or later.
	Due { days: i64 },
	/// A deadline string was given but none of the heuristics could read it.
	Unparsed,
}

/// Reads a deadline out of one of the date formats upstream feeds use.
///
/// Tried in order: year-first numeric, month-first numeric (day-first when
/// the leading field cannot be a month), month-name forms, and finally a
/// month-name scan anywhere inside longer text.
pub fn parse_deadline(raw: &str) -> Option<Date> {
	let raw = raw.trim();

	if raw.is_empty() {
		return None;
	}

	parse_year_first(raw)
		.or_else(|| parse_month_first(raw))
		.or_else(|| parse_month_name(raw))
		.or_else(|| parse_day_first_name(raw))
		.or_else(|| scan_month_name(raw))
}

/// The deadline date for an opportunity, if its close-date field parses.
pub fn deadline_date(opportunity: &Opportunity) -> Option<Date> {
	opportunity.close_date.as_deref().and_then(parse_deadline)
}

/// Whether an opportunity is still open for proposals.
///
/// A missing or unreadable deadline counts as open rather than dropping the
/// opportunity.
pub fn is_current(opportunity: &Opportunity, today: Date) -> bool {
	if opportunity.accepts_anytime {
		return true;
	}

	match deadline_date(opportunity) {
		Some(date) => date >= today,
		None => true,
	}
}

pub fn deadline_status(deadline: Option<&str>, today: Date) -> DeadlineStatus {
	let Some(raw) = deadline.map(str::trim).filter(|raw| !raw.is_empty()) else {
		return DeadlineStatus::Rolling;
	};
	let Some(date) = parse_deadline(raw) else {
		return DeadlineStatus::Unparsed;
	};
	let days = (date - today).whole_days();

	if days < 0 { DeadlineStatus::Closed } else { DeadlineStatus::Due { days } }
}

fn parse_year_first(raw: &str) -> Option<Date> {
	let captures = capture(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})$", raw)?;

	build_date(int(&captures, 1)?, int(&captures, 2)? as u8, int(&captures, 3)? as u8)
}

fn parse_month_first(raw: &str) -> Option<Date> {
	let captures = capture(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})$", raw)?;
	let first = int(&captures, 1)?;
	let second = int(&captures, 2)?;
	let year = int(&captures, 3)?;

	// Month/day order is ambiguous; month-first wins unless the leading
	// field cannot be a month.
	if first > 12 {
		build_date(year, second as u8, first as u8)
	} else {
		build_date(year, first as u8, second as u8)
	}
}

fn parse_month_name(raw: &str) -> Option<Date> {
	let captures = capture(r"^([A-Za-z]+)\.?\s+(\d{1,2}),?\s+(\d{4})$", raw)?;
	let month = month_from_name(captures.get(1)?.as_str())?;

	build_date(int(&captures, 3)?, month as u8, int(&captures, 2)? as u8)
}

fn parse_day_first_name(raw: &str) -> Option<Date> {
	let captures = capture(r"^(\d{1,2})\s+([A-Za-z]+)\.?\s+(\d{4})$", raw)?;
	let month = month_from_name(captures.get(2)?.as_str())?;

	build_date(int(&captures, 3)?, month as u8, int(&captures, 1)? as u8)
}

fn scan_month_name(raw: &str) -> Option<Date> {
	let pattern = r"(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})";
	let captures = capture(pattern, raw)?;
	let month = month_from_name(captures.get(1)?.as_str())?;

	build_date(int(&captures, 3)?, month as u8, int(&captures, 2)? as u8)
}

fn capture<'a>(pattern: &str, raw: &'a str) -> Option<regex::Captures<'a>> {
	Regex::new(pattern).ok()?.captures(raw)
}

fn int(captures: &regex::Captures<'_>, group: usize) -> Option<i32> {
	captures.get(group)?.as_str().parse().ok()
}

fn build_date(year: i32, month: u8, day: u8) -> Option<Date> {
	let month = Month::try_from(month).ok()?;

	Date::from_calendar_date(year, month, day).ok()
}

fn month_from_name(name: &str) -> Option<Month> {
	let lowered = name.to_ascii_lowercase();
	let month = match lowered.get(..3)? {
		"jan" => Month::January,
		"feb" => Month::February,
		"mar" => Month::March,
		"apr" => Month::April,
		"may" => Month::May,
		"jun" => Month::June,
		"jul" => Month::July,
		"aug" => Month::August,
		"sep" => Month::September,
		"oct" => Month::October,
		"nov" => Month::November,
		"dec" => Month::December,
		_ => return None,
	};

	Some(month)
}
