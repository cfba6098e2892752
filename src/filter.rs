//! Local filter engine.
//!
//! A [`Criteria`] is a conjunction of predicates built from the raw filter
//! values a page sends. Values that are unset, blank or `"all"` contribute no
//! predicate. Applying criteria borrows the baseline and returns the matching
//! records in their original order; the baseline itself is never touched, so
//! the same list can be re-filtered any number of times without a refetch.

use std::borrow::Cow;
use std::str::FromStr;

/// Records that take part in free-text search designate their searchable fields.
pub trait Searchable {
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

/// Returns the trimmed value if it should take part in filtering.
pub fn active(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value)
    }
}

pub fn parse_flag(value: Option<&str>) -> Option<bool> {
    match active(value)?.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "available" => Some(true),
        "false" | "no" | "0" | "unavailable" => Some(false),
        _ => None,
    }
}

pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + Send + Sync + 'a>;

pub struct Criteria<'a, T> {
    predicates: Vec<Predicate<'a, T>>,
}

impl<'a, T> Default for Criteria<'a, T> {
    fn default() -> Self {
        Self { predicates: Vec::new() }
    }
}

impl<'a, T: 'a> Criteria<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match against any of the record's search fields.
    pub fn search(self, query: Option<&str>) -> Self
    where
        T: Searchable,
    {
        let Some(query) = active(query) else {
            return self;
        };
        let needle = query.to_lowercase();
        self.push(move |item: &T| {
            item.search_fields()
                .iter()
                .any(|field| contains_ignore_case(field, &needle))
        })
    }

    /// Enum equality after parsing the filter value. A value that does not
    /// parse matches nothing.
    pub fn equals<V, F>(self, value: Option<&str>, key: F) -> Self
    where
        V: FromStr + PartialEq + Send + Sync + 'a,
        F: Fn(&T) -> V + Send + Sync + 'a,
    {
        let Some(value) = active(value) else {
            return self;
        };
        match value.parse::<V>() {
            Ok(wanted) => self.push(move |item: &T| key(item) == wanted),
            Err(_) => self.push(|_: &T| false),
        }
    }

    /// Boolean filter against a derived flag.
    pub fn flag<F>(self, value: Option<bool>, derived: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'a,
    {
        match value {
            Some(wanted) => self.push(move |item: &T| derived(item) == wanted),
            None => self,
        }
    }

    /// Arbitrary predicate, added only when `value` is active.
    pub fn when<F>(self, value: Option<&str>, predicate: F) -> Self
    where
        F: Fn(&T, &str) -> bool + Send + Sync + 'a,
    {
        let Some(value) = active(value) else {
            return self;
        };
        let value = value.to_string();
        self.push(move |item: &T| predicate(item, &value))
    }

    pub fn push<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'a,
    {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, item: &T) -> bool {
        self.predicates.iter().all(|p| p(item))
    }

    pub fn apply<'s>(&self, items: &'s [T]) -> Vec<&'s T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        city: &'static str,
        kind: Kind,
        on: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Kind {
        Red,
        Blue,
    }

    impl FromStr for Kind {
        type Err = ();
        fn from_str(s: &str) -> Result<Self, ()> {
            match s.to_ascii_lowercase().as_str() {
                "red" => Ok(Kind::Red),
                "blue" => Ok(Kind::Blue),
                _ => Err(()),
            }
        }
    }

    impl Searchable for Row {
        fn search_fields(&self) -> Vec<Cow<'_, str>> {
            vec![Cow::Borrowed(self.name), Cow::Borrowed(self.city)]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Alpha", city: "Denver", kind: Kind::Red, on: true },
            Row { name: "Bravo", city: "Austin", kind: Kind::Blue, on: false },
            Row { name: "Charlie", city: "Dallas", kind: Kind::Red, on: false },
            Row { name: "Delta", city: "Boston", kind: Kind::Blue, on: true },
        ]
    }

    fn is_ordered_subset(out: &[&Row], input: &[Row]) -> bool {
        let mut cursor = 0;
        for item in out {
            match input[cursor..].iter().position(|r| r == *item) {
                Some(pos) => cursor += pos + 1,
                None => return false,
            }
        }
        true
    }

    #[test]
    fn inactive_values() {
        assert_eq!(active(None), None);
        assert_eq!(active(Some("   ")), None);
        assert_eq!(active(Some("All")), None);
        assert_eq!(active(Some(" x ")), Some("x"));
    }

    #[test]
    fn no_active_filters_returns_input_unchanged() {
        let input = rows();
        let criteria = Criteria::new()
            .search(Some(""))
            .equals(Some("all"), |r: &Row| r.kind)
            .flag(parse_flag(None), |r: &Row| r.on);
        assert!(criteria.is_empty());
        let out: Vec<Row> = criteria.apply(&input).into_iter().cloned().collect();
        assert_eq!(out, input);
    }

    #[test]
    fn conjunction_is_an_ordered_subset() {
        let input = rows();
        let combos: Vec<(Option<&str>, Option<&str>, Option<&str>)> = vec![
            (Some("d"), None, None),
            (Some("d"), Some("red"), None),
            (None, Some("blue"), Some("true")),
            (Some("a"), Some("all"), Some("false")),
            (Some("zzz"), None, None),
        ];
        for (q, kind, on) in combos {
            let criteria = Criteria::new()
                .search(q)
                .equals(kind, |r: &Row| r.kind)
                .flag(parse_flag(on), |r: &Row| r.on);
            let out = criteria.apply(&input);
            assert!(is_ordered_subset(&out, &input));
            assert!(out.iter().all(|r| criteria.matches(r)));
        }
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let input = rows();
        let out = Criteria::new().search(Some("DALLAS")).apply(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Charlie");

        let out = Criteria::new().search(Some("a")).apply(&input);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn unparseable_enum_value_matches_nothing() {
        let input = rows();
        let out = Criteria::new().equals(Some("green"), |r: &Row| r.kind).apply(&input);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_source_yields_empty_output() {
        let input: Vec<Row> = Vec::new();
        let out = Criteria::new()
            .search(Some("alpha"))
            .equals(Some("red"), |r: &Row| r.kind)
            .apply(&input);
        assert!(out.is_empty());
    }

    #[test]
    fn criteria_are_reusable_and_do_not_mutate() {
        let input = rows();
        let before = input.clone();
        let reds = Criteria::new().equals(Some("red"), |r: &Row| r.kind);
        let first = reds.apply(&input).len();
        let second = reds.apply(&input).len();
        let blues = Criteria::new().equals(Some("blue"), |r: &Row| r.kind).apply(&input).len();
        assert_eq!(first, second);
        assert_eq!(first + blues, input.len());
        assert_eq!(input, before);
    }

    #[test]
    fn when_adds_custom_predicate() {
        let input = rows();
        let out = Criteria::new()
            .when(Some("BOS"), |r: &Row, v| contains_ignore_case(r.city, &v.to_lowercase()))
            .apply(&input);
        assert_eq!(out.iter().map(|r| r.name).collect::<Vec<_>>(), vec!["Delta"]);

        let out = Criteria::new()
            .when(Some("3"), |r: &Row, v| r.name.len() > v.parse::<usize>().unwrap_or(0) + 2)
            .apply(&input);
        assert_eq!(out.iter().map(|r| r.name).collect::<Vec<_>>(), vec!["Charlie"]);
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag(Some("true")), Some(true));
        assert_eq!(parse_flag(Some("Available")), Some(true));
        assert_eq!(parse_flag(Some("no")), Some(false));
        assert_eq!(parse_flag(Some("all")), None);
        assert_eq!(parse_flag(Some("maybe")), None);
    }
}
