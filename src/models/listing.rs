use chrono::{DateTime, Duration, FixedOffset, Months, Utc};
use serde::Deserialize;

/// Raw listing query string. Every parameter is optional and empty strings
/// count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub search_term: Option<String>,
    pub used: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub active: Option<String>,
    pub date_range: Option<String>,
    pub limit: Option<String>,
    pub filter_options: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    All,
    Today,
    Week,
    Month,
}

impl DateRange {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "all" => Some(DateRange::All),
            "today" => Some(DateRange::Today),
            "week" => Some(DateRange::Week),
            "month" => Some(DateRange::Month),
            _ => None,
        }
    }

    /// Inclusive `[start, end]` bounds relative to `now`, or `None` for `All`.
    ///
    /// Both bounds are derived from the same captured instant and neither is
    /// computed from the other.
    pub fn bounds(self, now: DateTime<FixedOffset>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            DateRange::All => None,
            DateRange::Today => {
                let day = now.date_naive();
                let start = day.and_hms_milli_opt(0, 0, 0, 0)?;
                let end = day.and_hms_milli_opt(23, 59, 59, 999)?;
                let offset = *now.offset();
                Some((
                    start.and_local_timezone(offset).single()?.with_timezone(&Utc),
                    end.and_local_timezone(offset).single()?.with_timezone(&Utc),
                ))
            }
            DateRange::Week => Some((
                (now - Duration::days(7)).with_timezone(&Utc),
                now.with_timezone(&Utc),
            )),
            DateRange::Month => Some((
                now.checked_sub_months(Months::new(1))?.with_timezone(&Utc),
                now.with_timezone(&Utc),
            )),
        }
    }
}
