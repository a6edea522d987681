//! Calendar-month windows used to scope queries, aggregates and reports.

use time::{Date, Month, OffsetDateTime, UtcOffset};

/// A calendar month in a specific year, the window every monthly view and
/// report is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    /// The calendar year.
    pub year: i32,
    /// The calendar month.
    pub month: Month,
}

impl MonthWindow {
    /// The window containing `date`.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The window containing today in the given timezone.
    pub fn current(local_timezone: UtcOffset) -> Self {
        Self::of(OffsetDateTime::now_utc().to_offset(local_timezone).date())
    }

    /// Resolve optional month/year query parameters into a window.
    ///
    /// Missing or out-of-range values fall back to the current month, the
    /// same way the selection parameters are defined: month (1-12, optional,
    /// defaults to current) and year (optional, defaults to current).
    pub fn from_query(month: Option<u8>, year: Option<i32>, local_timezone: UtcOffset) -> Self {
        let current = Self::current(local_timezone);

        let month = month
            .and_then(|number| Month::try_from(number).ok())
            .unwrap_or(current.month);
        let year = year
            .filter(|year| (1..=9999).contains(year))
            .unwrap_or(current.year);

        Self { year, month }
    }

    /// The window for the month before this one.
    pub fn previous(self) -> Self {
        let year = if self.month == Month::January {
            self.year - 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.previous(),
        }
    }

    /// The `n` consecutive windows ending at this one (inclusive), in
    /// ascending chronological order.
    ///
    /// A pure function of the anchor and `n`, so the sequence can be
    /// regenerated at any time.
    pub fn trailing(self, n: usize) -> Vec<Self> {
        let mut windows = Vec::with_capacity(n);
        let mut window = self;

        for _ in 0..n {
            windows.push(window);
            window = window.previous();
        }

        windows.reverse();
        windows
    }

    /// The first day of the month.
    pub fn first_day(self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).unwrap()
    }

    /// The last day of the month.
    pub fn last_day(self) -> Date {
        Date::from_calendar_date(self.year, self.month, self.month.length(self.year)).unwrap()
    }

    /// Whether `date` falls within this window.
    pub fn contains(self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The month number (1-12) for use in query strings.
    pub fn month_number(self) -> u8 {
        u8::from(self.month)
    }

    /// A human-readable label such as "June 2025".
    pub fn label(self) -> String {
        format!("{} {}", self.month, self.year)
    }

    /// An abbreviated label such as "Jun 2025", used for chart axes.
    pub fn short_label(self) -> String {
        let name = self.month.to_string();
        format!("{} {}", &name[..3], self.year)
    }
}
