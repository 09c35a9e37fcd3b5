//! Polish labels and date formatting.
//!
//! The dashboard text is fixed Polish copy; dates follow the `pl-PL`
//! long form (weekday, day, genitive month, year).

use std::fmt::Display;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Weekday};

pub const STATUS_LOADING: &str = "Pobieranie danych...";
pub const STATUS_SUCCESS: &str = "Dane załadowane pomyślnie";
pub const STATUS_ERROR: &str = "Błąd pobierania danych";

pub const FREE_LABEL: &str = "Wolne";
pub const TAKEN_LABEL: &str = "Zajęte";
pub const AVAILABLE_SUFFIX: &str = "dostępne";
pub const BUY_TICKET: &str = "Kup bilet";

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "poniedziałek",
        Weekday::Tue => "wtorek",
        Weekday::Wed => "środa",
        Weekday::Thu => "czwartek",
        Weekday::Fri => "piątek",
        Weekday::Sat => "sobota",
        Weekday::Sun => "niedziela",
    }
}

/// Month name in the genitive case, as used after a day number.
fn month_name(month: u32) -> &'static str {
    match month {
        1 => "stycznia",
        2 => "lutego",
        3 => "marca",
        4 => "kwietnia",
        5 => "maja",
        6 => "czerwca",
        7 => "lipca",
        8 => "sierpnia",
        9 => "września",
        10 => "października",
        11 => "listopada",
        _ => "grudnia",
    }
}

/// Long date label, e.g. `niedziela, 28 września 2025`.
#[must_use]
pub fn format_event_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {} {}",
        weekday_name(date.weekday()),
        date.day(),
        month_name(date.month()),
        date.year()
    )
}

/// Date and time in `pl-PL` numeric form, e.g. `28.09.2025, 14:03:05`.
#[must_use]
pub fn format_timestamp<Tz>(t: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    t.format("%d.%m.%Y, %H:%M:%S").to_string()
}

/// Text line under an event card's bar, e.g. `30% dostępne`.
#[must_use]
pub fn availability_line(percent: u64) -> String {
    format!("{percent}% {AVAILABLE_SUFFIX}")
}

/// Cache freshness line shown in the footer.
#[must_use]
pub fn cache_info_line(last_updated: &str, minutes_until_refresh: i64) -> String {
    format!("Ostatnia aktualizacja: {last_updated} | Następna za: {minutes_until_refresh} min")
}
