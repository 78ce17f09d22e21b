//! Optional query filters shared by the list and total-cost queries.
//!
//! Every filter is an explicit tri-state: either unset (the predicate holds for
//! every row) or an exact value to compare against. The storage layer turns the
//! same values into SQL predicates; the `matches`/`overlaps` helpers here are the
//! in-memory form of those predicates.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Month, Subscription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue<T> {
    Unset,
    Equals(T),
}

impl<T> Default for FilterValue<T> {
    fn default() -> Self {
        FilterValue::Unset
    }
}

impl<T> From<Option<T>> for FilterValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FilterValue::Equals(v),
            None => FilterValue::Unset,
        }
    }
}

impl<T> FilterValue<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            FilterValue::Unset => None,
            FilterValue::Equals(v) => Some(v),
        }
    }

}

impl<T: PartialEq> FilterValue<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            FilterValue::Unset => true,
            FilterValue::Equals(expected) => expected == value,
        }
    }
}

impl FilterValue<String> {
    /// Query-string form: a missing or empty value means "no filter".
    pub fn from_query(raw: Option<String>) -> Self {
        raw.filter(|s| !s.is_empty()).into()
    }
}

impl FilterValue<Uuid> {
    pub fn parse_owner(raw: Option<&str>) -> AppResult<Self> {
        match raw {
            None | Some("") => Ok(FilterValue::Unset),
            Some(s) => Uuid::parse_str(s)
                .map(FilterValue::Equals)
                .map_err(|_| AppError::ValidationError("Invalid user ID format".to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub owner_id: FilterValue<Uuid>,
    pub service_name: FilterValue<String>,
}

impl SubscriptionFilter {
    pub fn new(owner_id: FilterValue<Uuid>, service_name: FilterValue<String>) -> Self {
        Self {
            owner_id,
            service_name,
        }
    }

    pub fn matches(&self, subscription: &Subscription) -> bool {
        self.owner_id.matches(&subscription.owner_id)
            && self.service_name.matches(&subscription.service_name)
    }
}

/// Month range a total-cost query is restricted to. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostWindow {
    start: Option<Month>,
    end: Option<Month>,
}

impl CostWindow {
    /// Bounds are taken as given; a start after the end is not an error, the
    /// overlap predicate decides which rows it admits.
    pub fn new(start: Option<Month>, end: Option<Month>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<Month> {
        self.start
    }

    pub fn end(&self) -> Option<Month> {
        self.end
    }

    /// A subscription overlaps unless it ended before the window starts or
    /// starts after the window ends. A missing `end_date` never ends.
    pub fn overlaps(&self, start_date: Month, end_date: Option<Month>) -> bool {
        let not_ended_before = match (self.start, end_date) {
            (None, _) | (_, None) => true,
            (Some(ws), Some(ed)) => ed >= ws,
        };
        let not_started_after = match self.end {
            None => true,
            Some(we) => start_date <= we,
        };
        not_ended_before && not_started_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> Month {
        Month::parse(s).unwrap()
    }

    #[test]
    fn test_filter_value_from_query() {
        assert_eq!(FilterValue::<String>::from_query(None), FilterValue::Unset);
        assert_eq!(FilterValue::from_query(Some(String::new())), FilterValue::Unset);
        assert_eq!(
            FilterValue::from_query(Some("Yoga".to_string())),
            FilterValue::Equals("Yoga".to_string())
        );
    }

    #[test]
    fn test_parse_owner() {
        assert_eq!(FilterValue::parse_owner(None).unwrap(), FilterValue::Unset);
        assert_eq!(FilterValue::parse_owner(Some("")).unwrap(), FilterValue::Unset);
        let id = Uuid::new_v4();
        assert_eq!(
            FilterValue::parse_owner(Some(&id.to_string())).unwrap(),
            FilterValue::Equals(id)
        );
        assert!(matches!(
            FilterValue::parse_owner(Some("not-a-uuid")),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unset_matches_everything() {
        let f: FilterValue<i32> = FilterValue::Unset;
        assert!(f.matches(&1));
        assert!(FilterValue::Equals(1).matches(&1));
        assert!(!FilterValue::Equals(1).matches(&2));
    }

    #[test]
    fn test_inverted_window_applies_both_bounds() {
        let w = CostWindow::new(Some(m("03-2025")), Some(m("01-2025")));
        // started by the window end and never ended
        assert!(w.overlaps(m("01-2025"), None));
        // ended before the window start
        assert!(!w.overlaps(m("01-2025"), Some(m("02-2025"))));
        // started after the window end
        assert!(!w.overlaps(m("02-2025"), None));
    }

    #[test]
    fn test_unbounded_window_matches_everything() {
        let w = CostWindow::unbounded();
        assert!(w.overlaps(m("01-2000"), Some(m("02-2000"))));
        assert!(w.overlaps(m("01-2999"), None));
    }

    #[test]
    fn test_open_ended_subscription_overlaps_any_later_window() {
        let w = CostWindow::new(Some(m("10-2026")), None);
        assert!(w.overlaps(m("01-2020"), None));
        assert!(!w.overlaps(m("01-2020"), Some(m("09-2026"))));
        assert!(w.overlaps(m("01-2020"), Some(m("10-2026"))));
    }

    #[test]
    fn test_yoga_scenario() {
        // A: open-ended from 07-2025, B: 01-2025 .. 03-2025
        let a = (m("07-2025"), None);
        let b = (m("01-2025"), Some(m("03-2025")));

        let summer = CostWindow::new(Some(m("06-2025")), Some(m("12-2025")));
        assert!(summer.overlaps(a.0, a.1));
        assert!(!summer.overlaps(b.0, b.1));

        let winter = CostWindow::new(Some(m("01-2025")), Some(m("02-2025")));
        assert!(!winter.overlaps(a.0, a.1));
        assert!(winter.overlaps(b.0, b.1));
    }

    #[test]
    fn test_only_window_end() {
        let w = CostWindow::new(None, Some(m("05-2025")));
        assert!(w.overlaps(m("05-2025"), None));
        assert!(!w.overlaps(m("06-2025"), None));
        assert!(w.overlaps(m("01-2020"), Some(m("02-2020"))));
    }
}
