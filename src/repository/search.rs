//! Search input and output value objects shared by every searchable backend.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 15;

/// Sort direction of a search.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Case-insensitive parse; anything other than `desc` is ascending.
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw, untyped search input as it arrives from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchInput {
    pub page: Value,
    pub per_page: Value,
    pub sort: Value,
    pub sort_dir: Value,
    pub filter: Value,
}

/// Normalized search request.
///
/// `page` and `per_page` are always positive; `sort_dir` is only reported when
/// a sort field is set.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams<F = String> {
    page: usize,
    per_page: usize,
    sort: Option<String>,
    sort_dir: SortDirection,
    filter: Option<F>,
}

impl<F> Default for SearchParams<F> {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            sort: None,
            sort_dir: SortDirection::Asc,
            filter: None,
        }
    }
}

impl<F> SearchParams<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page; zero falls back to the first page.
    pub fn page(mut self, page: usize) -> Self {
        self.page = positive_or(page, DEFAULT_PAGE);
        self
    }

    /// Sets the page size; zero falls back to the default size.
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = positive_or(per_page, DEFAULT_PER_PAGE);
        self
    }

    /// Sets the sort field; an empty name clears it.
    pub fn sort<S: Into<String>>(mut self, sort: S) -> Self {
        let sort = sort.into();
        self.sort = (!sort.is_empty()).then_some(sort);
        self
    }

    pub fn sort_dir(mut self, sort_dir: SortDirection) -> Self {
        self.sort_dir = sort_dir;
        self
    }

    pub fn filter(mut self, filter: F) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn get_page(&self) -> usize {
        self.page
    }

    pub fn get_per_page(&self) -> usize {
        self.per_page
    }

    pub fn get_sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    pub fn get_sort_dir(&self) -> Option<SortDirection> {
        self.sort.as_ref().map(|_| self.sort_dir)
    }

    pub fn get_filter(&self) -> Option<&F> {
        self.filter.as_ref()
    }
}

impl From<SearchInput> for SearchParams<String> {
    fn from(input: SearchInput) -> Self {
        let sort = stringify_scalar(&input.sort);
        let sort_dir = stringify_scalar(&input.sort_dir)
            .map(|value| SortDirection::parse_lenient(&value))
            .unwrap_or_default();

        Self {
            page: coerce_positive(&input.page, DEFAULT_PAGE),
            per_page: coerce_positive(&input.per_page, DEFAULT_PER_PAGE),
            sort,
            sort_dir,
            filter: stringify_scalar(&input.filter),
        }
    }
}

fn positive_or(value: usize, default: usize) -> usize {
    if value == 0 { default } else { value }
}

/// Positive integers (or numeric strings) pass, everything else is `default`.
fn coerce_positive(value: &Value, default: usize) -> usize {
    let parsed = match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|n| usize::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Scalars become their string form; null, empty strings and containers
/// become `None`.
fn stringify_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<E> {
    pub items: Vec<E>,
    pub total: usize,
    pub current_page: usize,
    pub per_page: usize,
    pub last_page: usize,
}

impl<E> SearchResult<E> {
    pub fn new(items: Vec<E>, total: usize, current_page: usize, per_page: usize) -> Self {
        let last_page = if per_page == 0 {
            1
        } else {
            total.div_ceil(per_page).max(1)
        };
        Self {
            items,
            total,
            current_page,
            per_page,
            last_page,
        }
    }

    /// Converts every item, keeping the paging metadata.
    pub fn map<T, M: FnMut(E) -> T>(self, f: M) -> SearchResult<T> {
        SearchResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            per_page: self.per_page,
            last_page: self.last_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(input: Value) -> SearchParams {
        serde_json::from_value::<SearchInput>(input).unwrap().into()
    }

    #[test]
    fn defaults() {
        let p = SearchParams::<String>::default();
        assert_eq!(p.get_page(), 1);
        assert_eq!(p.get_per_page(), 15);
        assert_eq!(p.get_sort(), None);
        assert_eq!(p.get_sort_dir(), None);
        assert_eq!(p.get_filter(), None);
        assert_eq!(p, params(json!({})));
    }

    #[test]
    fn page_coercion() {
        let cases = [
            (json!(null), 1),
            (json!(""), 1),
            (json!("fake"), 1),
            (json!(0), 1),
            (json!(-1), 1),
            (json!(5.5), 1),
            (json!(true), 1),
            (json!(false), 1),
            (json!({}), 1),
            (json!(1), 1),
            (json!(2), 2),
            (json!("3"), 3),
            (json!(4.0), 4),
        ];
        for (page, expected) in cases {
            assert_eq!(params(json!({ "page": page.clone() })).get_page(), expected, "{page}");
        }
    }

    #[test]
    fn per_page_coercion() {
        let cases = [
            (json!(null), 15),
            (json!(""), 15),
            (json!("fake"), 15),
            (json!(0), 15),
            (json!(-1), 15),
            (json!(5.5), 15),
            (json!(true), 15),
            (json!(false), 15),
            (json!({}), 15),
            (json!(1), 1),
            (json!(2), 2),
            (json!(10), 10),
        ];
        for (per_page, expected) in cases {
            assert_eq!(
                params(json!({ "per_page": per_page.clone() })).get_per_page(),
                expected,
                "{per_page}"
            );
        }
    }

    #[test]
    fn sort_and_filter_stringify_scalars() {
        let cases = [
            (json!(null), None),
            (json!(""), None),
            (json!(0), Some("0")),
            (json!(-1), Some("-1")),
            (json!(5.5), Some("5.5")),
            (json!(true), Some("true")),
            (json!(false), Some("false")),
            (json!({}), None),
            (json!("field"), Some("field")),
        ];
        for (value, expected) in cases {
            let p = params(json!({ "sort": value.clone(), "filter": value.clone() }));
            assert_eq!(p.get_sort(), expected, "{value}");
            assert_eq!(p.get_filter().map(String::as_str), expected, "{value}");
        }
    }

    #[test]
    fn sort_dir_normalization() {
        let cases = [
            (json!(null), SortDirection::Asc),
            (json!(""), SortDirection::Asc),
            (json!(0), SortDirection::Asc),
            (json!("fake"), SortDirection::Asc),
            (json!("asc"), SortDirection::Asc),
            (json!("ASC"), SortDirection::Asc),
            (json!("desc"), SortDirection::Desc),
            (json!("DESC"), SortDirection::Desc),
        ];
        for (sort_dir, expected) in cases {
            let p = params(json!({ "sort": "field", "sort_dir": sort_dir.clone() }));
            assert_eq!(p.get_sort_dir(), Some(expected), "{sort_dir}");
        }
    }

    #[test]
    fn sort_dir_hidden_without_sort() {
        let p = params(json!({ "sort_dir": "desc" }));
        assert_eq!(p.get_sort_dir(), None);
    }

    #[test]
    fn builder_applies_same_rules() {
        let p = SearchParams::<String>::new()
            .page(0)
            .per_page(0)
            .sort("")
            .sort_dir(SortDirection::Desc);
        assert_eq!(p.get_page(), 1);
        assert_eq!(p.get_per_page(), 15);
        assert_eq!(p.get_sort_dir(), None);

        let p = p.sort("name").filter("x".to_string());
        assert_eq!(p.get_sort_dir(), Some(SortDirection::Desc));
        assert_eq!(p.get_filter().map(String::as_str), Some("x"));
    }

    #[test]
    fn last_page_rounds_up() {
        let cases = [(0, 15, 1), (100, 20, 5), (101, 20, 6), (1, 1, 1)];
        for (total, per_page, expected) in cases {
            let result = SearchResult::<()>::new(vec![], total, 1, per_page);
            assert_eq!(result.last_page, expected);
            assert_eq!(result.total, total);
            assert_eq!(result.per_page, per_page);
            assert_eq!(result.current_page, 1);
        }
    }

    #[test]
    fn map_keeps_metadata() {
        let result = SearchResult::new(vec![1, 2], 12, 2, 2).map(|n| n * 10);
        assert_eq!(result.items, vec![10, 20]);
        assert_eq!(result.last_page, 6);
        assert_eq!(result.current_page, 2);
    }
}
