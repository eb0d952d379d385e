use crate::types::{NewsError, Result};
use crate::utils::text::contains_term;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Most specific first: cities, then states, then the country.
pub const KNOWN_LOCATIONS: &[&str] = &[
    "bangalore", "bengaluru", "mumbai", "chennai", "delhi", "hyderabad", "pune", "kolkata",
    "ahmedabad", "jaipur", "surat", "nagpur", "indore", "belagavi",
    "karnataka", "maharashtra", "tamil nadu", "kerala", "gujarat", "west bengal",
    "india",
];

pub const URGENT_WITHIN_DAYS: i64 = 7;

const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";
const MONTH_PREFIXES: [&str; 12] = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];

static RE_DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b").unwrap());
static RE_YEAR_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})[/-](\d{1,2})[/-](\d{1,2})\b").unwrap());
static RE_DAY_NAMED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({})\.?,?\s+(\d{{4}})\b", MONTHS)).unwrap()
});
static RE_NAMED_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b({})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b", MONTHS)).unwrap()
});
static RE_DEADLINE_NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:deadline|register\s+by|last\s+date)[:\s]+(\d{1,2})[/-](\d{1,2})[/-](\d{4})").unwrap()
});
static RE_DEADLINE_NAMED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:deadline|register\s+by|last\s+date)[:\s]+(\d{{1,2}})(?:st|nd|rd|th)?\s+({})\.?,?\s+(\d{{4}})",
        MONTHS
    ))
    .unwrap()
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSignals {
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_local_event: bool,
    pub is_urgent: bool,
}

/// Date, location and deadline hints in free text, relative to `now`.
pub fn detect(text: &str, now: DateTime<Utc>) -> Result<EventSignals> {
    let lowered = text.to_lowercase();

    let event_date = find_event_date(&lowered)?;
    let is_urgent = event_date
        .map(|date| (0..=URGENT_WITHIN_DAYS).contains(&date.signed_duration_since(now).num_days()))
        .unwrap_or(false);

    let location = KNOWN_LOCATIONS
        .iter()
        .find(|name| contains_term(&lowered, name))
        .map(|name| title_case(name));

    let deadline = find_deadline(&lowered)?;

    Ok(EventSignals {
        event_date,
        is_local_event: location.is_some(),
        location,
        deadline,
        is_urgent,
    })
}

fn find_event_date(text: &str) -> Result<Option<DateTime<Utc>>> {
    for caps in RE_DAY_MONTH_YEAR.captures_iter(text) {
        if let Some(date) = to_date(number(&caps, 3)?, number(&caps, 2)?, number(&caps, 1)?) {
            return Ok(Some(date));
        }
    }
    for caps in RE_YEAR_MONTH_DAY.captures_iter(text) {
        if let Some(date) = to_date(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?) {
            return Ok(Some(date));
        }
    }
    for caps in RE_DAY_NAMED.captures_iter(text) {
        if let Some(date) = to_date(number(&caps, 3)?, month_number(&caps, 2)?, number(&caps, 1)?) {
            return Ok(Some(date));
        }
    }
    for caps in RE_NAMED_DAY.captures_iter(text) {
        if let Some(date) = to_date(number(&caps, 3)?, month_number(&caps, 1)?, number(&caps, 2)?) {
            return Ok(Some(date));
        }
    }
    Ok(None)
}

fn find_deadline(text: &str) -> Result<Option<DateTime<Utc>>> {
    for caps in RE_DEADLINE_NUMERIC.captures_iter(text) {
        if let Some(date) = to_date(number(&caps, 3)?, number(&caps, 2)?, number(&caps, 1)?) {
            return Ok(Some(date));
        }
    }
    for caps in RE_DEADLINE_NAMED.captures_iter(text) {
        if let Some(date) = to_date(number(&caps, 3)?, month_number(&caps, 2)?, number(&caps, 1)?) {
            return Ok(Some(date));
        }
    }
    Ok(None)
}

fn number(caps: &Captures<'_>, group: usize) -> Result<u32> {
    let raw = caps
        .get(group)
        .ok_or_else(|| NewsError::processing(format!("missing date group {}", group)))?
        .as_str();
    raw.parse::<u32>()
        .map_err(|e| NewsError::processing(format!("bad date component '{}': {}", raw, e)))
}

fn month_number(caps: &Captures<'_>, group: usize) -> Result<u32> {
    let name = caps
        .get(group)
        .ok_or_else(|| NewsError::processing(format!("missing month group {}", group)))?
        .as_str()
        .to_lowercase();
    MONTH_PREFIXES
        .iter()
        .position(|m| name.starts_with(m))
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| NewsError::processing(format!("unknown month '{}'", name)))
}

/// Midnight UTC of the given day; `None` for impossible dates like 31/02.
fn to_date(year: u32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    let year = i32::try_from(year).ok()?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
