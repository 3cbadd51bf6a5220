//! Date ranges and validated news queries

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// Largest page size a caller may request
pub const MAX_LIMIT: usize = 100;

/// Inclusive calendar-date window. Both bounds absent means the default window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateRange {
    /// The default, unbounded window
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a range, rejecting `from > to`
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> QueryResult<Self> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(QueryError::InvalidRange { from, to });
            }
        }
        Ok(Self { from, to })
    }

    /// Parse `YYYY-MM-DD` bounds as sent by the presentation layer
    pub fn parse(from: Option<&str>, to: Option<&str>) -> QueryResult<Self> {
        Self::new(parse_date(from)?, parse_date(to)?)
    }

    pub fn from_date(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        self.to
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Number of calendar days covered, only when both bounds are present
    pub fn span_days(&self) -> Option<usize> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some((to - from).num_days() as usize + 1),
            _ => None,
        }
    }

    /// Every day in the range, oldest first. Empty unless both bounds are present.
    pub fn days(&self) -> Vec<NaiveDate> {
        match (self.from, self.span_days()) {
            (Some(from), Some(span)) => (0..span as i64)
                .map(|offset| from + Duration::days(offset))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Key fragment identifying this window (`from_to`, `from_`, `_to` or `default`)
    pub fn key_fragment(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!("{}_{}", from, to),
            (Some(from), None) => format!("{}_", from),
            (None, Some(to)) => format!("_{}", to),
            (None, None) => "default".to_string(),
        }
    }
}

fn parse_date(raw: Option<&str>) -> QueryResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| QueryError::invalid_date(s)),
    }
}

/// A validated request for one page of news
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    limit: usize,
    page: usize,
    range: DateRange,
    topic: Option<String>,
    force_refresh: bool,
}

impl NewsQuery {
    pub fn new(
        limit: usize,
        page: usize,
        range: DateRange,
        topic: Option<String>,
        force_refresh: bool,
    ) -> QueryResult<Self> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(QueryError::InvalidLimit {
                got: limit,
                max: MAX_LIMIT,
            });
        }
        if page == 0 {
            return Err(QueryError::InvalidPage);
        }

        let topic = topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            limit,
            page,
            range,
            topic,
            force_refresh,
        })
    }

    /// First page of the default window
    pub fn latest(limit: usize) -> QueryResult<Self> {
        Self::new(limit, 1, DateRange::unbounded(), None, false)
    }

    pub fn with_page(mut self, page: usize) -> QueryResult<Self> {
        if page == 0 {
            return Err(QueryError::InvalidPage);
        }
        self.page = page;
        Ok(self)
    }

    pub fn forced(mut self) -> Self {
        self.force_refresh = true;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn force_refresh(&self) -> bool {
        self.force_refresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        let err = DateRange::parse(Some("2024-01-10"), Some("2024-01-01")).unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidRange {
                from: date("2024-01-10"),
                to: date("2024-01-01"),
            }
        );
    }

    #[test]
    fn test_range_rejects_bad_format() {
        assert!(matches!(
            DateRange::parse(Some("01/02/2024"), None),
            Err(QueryError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_span_and_days() {
        let range = DateRange::parse(Some("2024-01-01"), Some("2024-01-10")).unwrap();
        assert_eq!(range.span_days(), Some(10));
        let days = range.days();
        assert_eq!(days.len(), 10);
        assert_eq!(days[0], date("2024-01-01"));
        assert_eq!(days[9], date("2024-01-10"));

        let single = DateRange::parse(Some("2024-02-29"), Some("2024-02-29")).unwrap();
        assert_eq!(single.span_days(), Some(1));

        let open = DateRange::parse(Some("2024-01-01"), None).unwrap();
        assert_eq!(open.span_days(), None);
        assert!(open.days().is_empty());
    }

    #[test]
    fn test_key_fragment() {
        assert_eq!(DateRange::unbounded().key_fragment(), "default");
        let range = DateRange::parse(Some("2024-01-01"), Some("2024-01-03")).unwrap();
        assert_eq!(range.key_fragment(), "2024-01-01_2024-01-03");
        let to_only = DateRange::parse(None, Some("2024-01-03")).unwrap();
        assert_eq!(to_only.key_fragment(), "_2024-01-03");
    }

    #[test]
    fn test_query_validation() {
        assert!(matches!(
            NewsQuery::new(0, 1, DateRange::unbounded(), None, false),
            Err(QueryError::InvalidLimit { got: 0, .. })
        ));
        assert!(matches!(
            NewsQuery::new(101, 1, DateRange::unbounded(), None, false),
            Err(QueryError::InvalidLimit { got: 101, .. })
        ));
        assert_eq!(
            NewsQuery::new(10, 0, DateRange::unbounded(), None, false),
            Err(QueryError::InvalidPage)
        );

        let query =
            NewsQuery::new(10, 2, DateRange::unbounded(), Some("  ".to_string()), true).unwrap();
        assert_eq!(query.topic(), None);
        assert!(query.force_refresh());
        assert_eq!(query.page(), 2);
    }
}
