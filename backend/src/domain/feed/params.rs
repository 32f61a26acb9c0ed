//! Validation of raw feed query parameters.
//!
//! Parameters are checked in a fixed order (`days`, `sort_by`, `limit`,
//! `offset`) and the first failure is reported.

use pagination::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT, PageRequest};
use serde_json::{Map, Value};

use super::{FeedWindow, SortKey};
use crate::domain::Error;

/// Unparsed feed parameters as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedParameters {
    pub days: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl RawFeedParameters {
    pub fn with_days(mut self, days: impl ToString) -> Self {
        self.days = Some(days.to_string());
        self
    }

    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    pub fn with_limit(mut self, limit: impl ToString) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub fn with_offset(mut self, offset: impl ToString) -> Self {
        self.offset = Some(offset.to_string());
        self
    }
}

/// Validated feed parameters with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedParameters {
    pub window: FeedWindow,
    pub sort_key: SortKey,
    pub page: PageRequest,
}

impl FeedParameters {
    /// Validate raw parameters, reporting the first invalid field as an
    /// `invalid_request` error whose details name it.
    ///
    /// # Examples
    /// ```
    /// use slumber::domain::feed::{FeedParameters, RawFeedParameters, SortKey};
    ///
    /// let params = FeedParameters::parse(&RawFeedParameters::default()).expect("defaults");
    /// assert_eq!(params.window.days(), 7);
    /// assert_eq!(params.sort_key, SortKey::Duration);
    /// assert_eq!(params.page.limit(), 20);
    ///
    /// let error = FeedParameters::parse(&RawFeedParameters::default().with_days(50))
    ///     .expect_err("out of range");
    /// assert_eq!(error.details().and_then(|d| d.get("field")), Some(&"days".into()));
    /// ```
    pub fn parse(raw: &RawFeedParameters) -> Result<Self, Error> {
        let window = parse_window(raw.days.as_deref())?;
        let sort_key = parse_sort_key(raw.sort_by.as_deref())?;
        let limit = parse_integer("limit", raw.limit.as_deref(), LIMIT_ALLOWED, DEFAULT_LIMIT)?;
        PageRequest::validate_limit(limit)
            .map_err(|_| out_of_range("limit", raw.limit.as_deref(), LIMIT_ALLOWED))?;
        let offset = parse_integer("offset", raw.offset.as_deref(), OFFSET_ALLOWED, 0)?;
        let page = PageRequest::new(limit, offset)
            .map_err(|_| out_of_range("offset", raw.offset.as_deref(), OFFSET_ALLOWED))?;

        Ok(Self {
            window,
            sort_key,
            page,
        })
    }
}

const DAYS_ALLOWED: &str = "1-30";
const LIMIT_ALLOWED: &str = "1-100";
const OFFSET_ALLOWED: &str = ">=0";

fn parse_window(raw: Option<&str>) -> Result<FeedWindow, Error> {
    let days = parse_integer(
        "days",
        raw,
        DAYS_ALLOWED,
        i64::from(FeedWindow::DEFAULT_DAYS),
    )?;
    FeedWindow::new(days).map_err(|_| out_of_range("days", raw, DAYS_ALLOWED))
}

fn parse_sort_key(raw: Option<&str>) -> Result<SortKey, Error> {
    let Some(value) = raw else {
        return Ok(SortKey::default());
    };
    value.parse().map_err(|_| {
        let allowed = SortKey::allowed_values();
        invalid_parameter(
            format!("sort_by must be one of {allowed}"),
            "sort_by",
            raw,
            &allowed,
            "unsupported_value",
        )
    })
}

fn parse_integer(
    field: &'static str,
    raw: Option<&str>,
    allowed: &str,
    default: i64,
) -> Result<i64, Error> {
    let Some(value) = raw else {
        return Ok(default);
    };
    value.parse().map_err(|_| {
        invalid_parameter(
            format!("{field} must be an integer"),
            field,
            raw,
            allowed,
            "invalid_integer",
        )
    })
}

fn out_of_range(field: &'static str, raw: Option<&str>, allowed: &str) -> Error {
    let message = match field {
        "days" => format!(
            "days must be between {} and {}",
            FeedWindow::MIN_DAYS,
            FeedWindow::MAX_DAYS
        ),
        "limit" => format!("limit must be between {MIN_LIMIT} and {MAX_LIMIT}"),
        _ => format!("{field} must be zero or greater"),
    };
    invalid_parameter(message, field, raw, allowed, "out_of_range")
}

fn invalid_parameter(
    message: String,
    field: &str,
    value: Option<&str>,
    allowed: &str,
    code: &str,
) -> Error {
    let mut details = Map::new();
    details.insert("field".to_owned(), Value::from(field));
    if let Some(value) = value {
        details.insert("value".to_owned(), Value::from(value));
    }
    details.insert("allowed".to_owned(), Value::from(allowed));
    details.insert("code".to_owned(), Value::from(code));
    Error::invalid_request(message).with_details(Value::Object(details))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ErrorCode;

    fn field_of(error: &Error) -> Option<&str> {
        error
            .details()
            .and_then(|details| details.get("field"))
            .and_then(Value::as_str)
    }

    #[rstest]
    fn applies_defaults() {
        let params = FeedParameters::parse(&RawFeedParameters::default()).expect("defaults");

        assert_eq!(params.window.days(), 7);
        assert_eq!(params.sort_key, SortKey::Duration);
        assert_eq!(params.page.limit(), 20);
        assert_eq!(params.page.offset(), 0);
    }

    #[rstest]
    fn days_out_of_range_names_field_and_allowed_range() {
        let error = FeedParameters::parse(&RawFeedParameters::default().with_days(50))
            .expect_err("days out of range");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({
                "field": "days",
                "value": "50",
                "allowed": "1-30",
                "code": "out_of_range",
            }))
        );
    }

    #[rstest]
    #[case(RawFeedParameters::default().with_days("abc"), "days", "invalid_integer")]
    #[case(RawFeedParameters::default().with_sort_by("quality"), "sort_by", "unsupported_value")]
    #[case(RawFeedParameters::default().with_limit(0), "limit", "out_of_range")]
    #[case(RawFeedParameters::default().with_limit(101), "limit", "out_of_range")]
    #[case(RawFeedParameters::default().with_limit("ten"), "limit", "invalid_integer")]
    #[case(RawFeedParameters::default().with_offset(-1), "offset", "out_of_range")]
    #[case(RawFeedParameters::default().with_offset("1.5"), "offset", "invalid_integer")]
    fn reports_the_offending_field(
        #[case] raw: RawFeedParameters,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let error = FeedParameters::parse(&raw).expect_err("invalid parameter");

        assert_eq!(field_of(&error), Some(field));
        assert_eq!(
            error.details().and_then(|d| d.get("code")).and_then(Value::as_str),
            Some(code)
        );
    }

    #[rstest]
    fn first_failure_wins() {
        let raw = RawFeedParameters::default()
            .with_days(0)
            .with_sort_by("nope")
            .with_limit(500)
            .with_offset(-3);
        let error = FeedParameters::parse(&raw).expect_err("invalid parameters");
        assert_eq!(field_of(&error), Some("days"));

        let error = FeedParameters::parse(&RawFeedParameters {
            days: None,
            ..raw.clone()
        })
        .expect_err("invalid parameters");
        assert_eq!(field_of(&error), Some("sort_by"));

        let error = FeedParameters::parse(&RawFeedParameters {
            days: None,
            sort_by: None,
            ..raw
        })
        .expect_err("invalid parameters");
        assert_eq!(field_of(&error), Some("limit"));
    }

    #[rstest]
    fn sort_by_error_lists_allowed_values() {
        let error = FeedParameters::parse(&RawFeedParameters::default().with_sort_by("quality"))
            .expect_err("unknown key");
        assert_eq!(
            error.details().and_then(|d| d.get("allowed")),
            Some(&json!("duration, bedtime, waketime, created_at"))
        );
    }
}
