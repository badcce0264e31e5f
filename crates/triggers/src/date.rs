use chrono::{Datelike, Local, NaiveDate};

/// Output layout for substituted date stamps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    #[default]
    Iso,
    /// `MM-DD-YYYY`
    MonthDayYear,
    /// `DD-MM-YYYY`
    DayMonthYear,
    /// `MM/DD/YYYY`
    MonthDayYearSlash,
    /// `DD/MM/YYYY`
    DayMonthYearSlash,
}

impl DateFormat {
    pub const ALL: [DateFormat; 5] = [
        DateFormat::Iso,
        DateFormat::MonthDayYear,
        DateFormat::DayMonthYear,
        DateFormat::MonthDayYearSlash,
        DateFormat::DayMonthYearSlash,
    ];

    /// Canonical configuration token for this format.
    pub fn token(self) -> &'static str {
        match self {
            DateFormat::Iso => "YYYY-MM-DD",
            DateFormat::MonthDayYear => "MM-DD-YYYY",
            DateFormat::DayMonthYear => "DD-MM-YYYY",
            DateFormat::MonthDayYearSlash => "MM/DD/YYYY",
            DateFormat::DayMonthYearSlash => "DD/MM/YYYY",
        }
    }

    /// Parses a configuration token. Returns `None` for unrecognised input;
    /// callers that load configuration fall back to [`DateFormat::Iso`].
    pub fn parse_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.token() == token.trim())
    }
}

/// Renders `date` in the requested layout with fixed-width, zero-padded
/// fields (4-digit year, 2-digit month and day).
pub fn format_date(date: NaiveDate, format: DateFormat) -> String {
    let (year, month, day) = (date.year(), date.month(), date.day());
    match format {
        DateFormat::Iso => format!("{year:04}-{month:02}-{day:02}"),
        DateFormat::MonthDayYear => format!("{month:02}-{day:02}-{year:04}"),
        DateFormat::DayMonthYear => format!("{day:02}-{month:02}-{year:04}"),
        DateFormat::MonthDayYearSlash => format!("{month:02}/{day:02}/{year:04}"),
        DateFormat::DayMonthYearSlash => format!("{day:02}/{month:02}/{year:04}"),
    }
}

/// Current local calendar date, for hosts that substitute in real time. The
/// rewriters themselves only ever receive a pre-formatted replacement string.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
