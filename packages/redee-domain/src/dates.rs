//! Rule-based appointment date extraction from listing text.
//!
//! Recognizes German and ISO calendar dates, optionally followed by a wall-clock time and a
//! time range end, e.g. `Besichtigung am 12.03. um 15:00 - 16:30 Uhr` or `2025-03-12 15:00`.
//! Times are read in a fixed local offset.

use regex::{Captures, Regex};
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::models::DateExtraction;

const TIME_SUFFIX: &str = concat!(
	r"(?:\s*(?P<lead>,|um|ab|at|T)?\s*",
	r"(?P<hour>\d{1,2})(?P<sep>[:.])(?P<minute>\d{2})(?P<trail>[.\d])?",
	r"(?:\s*(?:-|–|bis|to)\s*(?P<end_hour>\d{1,2})[:.](?P<end_minute>\d{2}))?",
	r"(?:\s*Uhr)?)?",
);
const DOTTED_DATE: &str =
	r"(?P<date>\b(?P<day>\d{1,2})\.(?P<month>\d{1,2})\.(?:(?P<year>\d{4}|\d{2})\b)?)";
const ISO_DATE: &str = r"(?P<date>\b(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2}))";

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Pattern(#[from] regex::Error),
	#[error("UTC offset of {minutes} minutes is out of range.")]
	Offset { minutes: i32 },
}

/// Compiled once and shared; holds no mutable state, so one instance can serve every
/// concurrent request.
#[derive(Debug, Clone)]
pub struct RuleExtractor {
	dotted: Regex,
	iso: Regex,
	offset: UtcOffset,
}
impl RuleExtractor {
	pub fn new(offset: UtcOffset) -> Result<Self> {
		Ok(Self {
			dotted: Regex::new(&format!("{DOTTED_DATE}{TIME_SUFFIX}"))?,
			iso: Regex::new(&format!("{ISO_DATE}{TIME_SUFFIX}"))?,
			offset,
		})
	}

	pub fn from_config(cfg: &redee_config::Extraction) -> Result<Self> {
		let minutes = cfg.utc_offset_minutes;
		let offset = UtcOffset::from_whole_seconds(minutes.saturating_mul(60))
			.map_err(|_| Error::Offset { minutes })?;

		Self::new(offset)
	}

	pub fn extract(&self, text: &str) -> Vec<DateExtraction> {
		self.extract_at(text, OffsetDateTime::now_utc())
	}

	/// Extracts dates in text order. `reference` resolves dates written without a year.
	pub fn extract_at(&self, text: &str, reference: OffsetDateTime) -> Vec<DateExtraction> {
		let today = reference.to_offset(self.offset).date();
		let mut found = Vec::new();

		for pattern in [&self.dotted, &self.iso] {
			self.scan(pattern, text, today, &mut found);
		}

		found.sort_by_key(|(position, _)| *position);

		found.into_iter().map(|(_, extraction)| extraction).collect()
	}

	// When the clock is really the next date of a list, only the date is kept and scanning
	// resumes right after it.
	fn scan(
		&self,
		pattern: &Regex,
		text: &str,
		today: Date,
		found: &mut Vec<(usize, DateExtraction)>,
	) {
		let mut at = 0;

		while let Some(caps) = pattern.captures_at(text, at) {
			let with_clock = !is_listed_date(&caps);
			let Some(span) = (if with_clock { caps.get(0) } else { caps.name("date") }) else {
				break;
			};

			if let Some(extraction) = self.resolve(&caps, today, with_clock, span.as_str()) {
				found.push((span.start(), extraction));
			}

			at = span.end();
		}
	}

	fn resolve(
		&self,
		caps: &Captures<'_>,
		today: Date,
		with_clock: bool,
		matched: &str,
	) -> Option<DateExtraction> {
		let day = number(caps, "day")? as u8;
		let month = Month::try_from(number(caps, "month")? as u8).ok()?;
		let date = match number(caps, "year") {
			Some(year) if year < 100 => Date::from_calendar_date(2_000 + year as i32, month, day),
			Some(year) => Date::from_calendar_date(year as i32, month, day),
			None => next_occurrence(today, month, day),
		}
		.ok()?;
		let start_time = with_clock
			.then(|| clock(caps, "hour", "minute"))
			.flatten()
			.unwrap_or(Time::MIDNIGHT);
		let start = PrimitiveDateTime::new(date, start_time).assume_offset(self.offset);
		let end_time = with_clock.then(|| clock(caps, "end_hour", "end_minute")).flatten();
		let end = end_time.map(|end_time| {
			let end = PrimitiveDateTime::new(date, end_time).assume_offset(self.offset);

			if end < start { end + Duration::DAY } else { end }
		});

		Some(DateExtraction { start, end, text: matched.trim().to_string() })
	}
}

// `HH.MM` followed by a dot or digit reads as `dd.mm.`, unless `um` or `ab` introduced it.
fn is_listed_date(caps: &Captures<'_>) -> bool {
	let dotted = caps.name("sep").is_some_and(|sep| sep.as_str() == ".");
	let introduced = caps.name("lead").is_some_and(|lead| matches!(lead.as_str(), "um" | "ab"));

	dotted && caps.name("trail").is_some() && !introduced
}

fn number(caps: &Captures<'_>, name: &str) -> Option<u32> {
	caps.name(name)?.as_str().parse().ok()
}

fn clock(caps: &Captures<'_>, hour: &str, minute: &str) -> Option<Time> {
	Time::from_hms(number(caps, hour)? as u8, number(caps, minute)? as u8, 0).ok()
}

// A yearless date means the next time that day comes around, today included.
fn next_occurrence(
	today: Date,
	month: Month,
	day: u8,
) -> Result<Date, time::error::ComponentRange> {
	let candidate = Date::from_calendar_date(today.year(), month, day)?;

	if candidate < today {
		return Date::from_calendar_date(today.year() + 1, month, day);
	}

	Ok(candidate)
}
