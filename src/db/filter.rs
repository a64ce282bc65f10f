//! Ordered, AND-combined predicate lists.
//!
//! A [`FilterSet`] is built once per request and pushed into every query that
//! has to agree on the filtered universe (the `COUNT(*)` query and the page
//! query). Fragments are static SQL with `?` placeholders; every user-supplied
//! value travels as a bound parameter.

use sqlx::{QueryBuilder, Sqlite};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Int(i64),
    Text(String),
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::Int(v)
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::Text(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate {
    fragment: &'static str,
    binds: Vec<BindValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate with a single placeholder.
    pub fn and(&mut self, fragment: &'static str, value: impl Into<BindValue>) -> &mut Self {
        self.push(fragment, vec![value.into()])
    }

    /// Append a predicate only when a value is present.
    pub fn and_opt<V: Into<BindValue>>(
        &mut self,
        fragment: &'static str,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(v) = value {
            self.and(fragment, v);
        }
        self
    }

    /// Append a substring match. The same `%term%` pattern is bound to every
    /// placeholder in `fragment`, so one term can be matched against several
    /// columns joined with OR.
    pub fn and_contains(&mut self, fragment: &'static str, term: &str) -> &mut Self {
        let pattern = like_pattern(term);
        let binds = (0..placeholder_count(fragment))
            .map(|_| BindValue::Text(pattern.clone()))
            .collect();
        self.push(fragment, binds)
    }

    fn push(&mut self, fragment: &'static str, binds: Vec<BindValue>) -> &mut Self {
        debug_assert_eq!(
            placeholder_count(fragment),
            binds.len(),
            "placeholder/bind mismatch in `{fragment}`"
        );
        self.predicates.push(Predicate { fragment, binds });
        self
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.predicates.len()
    }

    /// All bound values in placeholder order.
    #[cfg(test)]
    pub(crate) fn binds(&self) -> impl Iterator<Item = &BindValue> {
        self.predicates.iter().flat_map(|p| p.binds.iter())
    }

    /// The rendered clause (with leading ` WHERE `), or an empty string.
    #[cfg(test)]
    pub(crate) fn where_sql(&self) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }
        let joined = self
            .predicates
            .iter()
            .map(|p| p.fragment)
            .collect::<Vec<_>>()
            .join(" AND ");
        format!(" WHERE {joined}")
    }

    /// Push ` WHERE a AND b ...` into `qb`, binding each value at its placeholder.
    pub fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Sqlite>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            let mut binds = predicate.binds.iter();
            let mut pieces = predicate.fragment.split('?').peekable();
            while let Some(piece) = pieces.next() {
                qb.push(piece);
                if pieces.peek().is_none() {
                    break;
                }
                match binds.next() {
                    Some(BindValue::Int(v)) => {
                        qb.push_bind(*v);
                    }
                    Some(BindValue::Text(v)) => {
                        qb.push_bind(v.clone());
                    }
                    None => break,
                }
            }
        }
    }
}

fn placeholder_count(fragment: &str) -> usize {
    fragment.matches('?').count()
}

/// Wrap `term` as a `LIKE ... ESCAPE '\'` substring pattern, escaping the
/// wildcard characters so they match literally.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME_OR_ID: &str = r"(s.first_name LIKE ? ESCAPE '\' OR s.last_name LIKE ? ESCAPE '\' OR s.student_id LIKE ? ESCAPE '\')";

    #[test]
    fn empty_set_renders_nothing() {
        let filters = FilterSet::new();
        assert!(filters.is_empty());
        assert_eq!(filters.where_sql(), "");

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM students s");
        filters.push_where(&mut qb);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM students s");
    }

    #[test]
    fn predicates_join_with_and_in_order() {
        let mut filters = FilterSet::new();
        filters
            .and("s.school_id = ?", 7_i64)
            .and_opt("s.grade = ?", Some(10_i64))
            .and_opt::<&str>("s.gender = ?", None)
            .and_opt("s.ethnicity = ?", Some("Asian"));

        assert_eq!(filters.len(), 3);
        assert_eq!(
            filters.where_sql(),
            " WHERE s.school_id = ? AND s.grade = ? AND s.ethnicity = ?"
        );
        assert_eq!(
            filters.binds().cloned().collect::<Vec<_>>(),
            vec![
                BindValue::Int(7),
                BindValue::Int(10),
                BindValue::Text("Asian".into())
            ]
        );
    }

    #[test]
    fn contains_binds_pattern_once_per_placeholder() {
        let mut filters = FilterSet::new();
        filters.and_contains(NAME_OR_ID, "gar");

        let binds: Vec<_> = filters.binds().cloned().collect();
        assert_eq!(binds.len(), 3);
        assert!(binds.iter().all(|b| *b == BindValue::Text("%gar%".into())));
    }

    #[test]
    fn push_where_emits_one_placeholder_per_bind() {
        let mut filters = FilterSet::new();
        filters.and("s.school_id = ?", 1_i64).and_contains(NAME_OR_ID, "x");

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM students s");
        filters.push_where(&mut qb);

        assert_eq!(
            qb.sql(),
            format!("SELECT COUNT(*) FROM students s{}", filters.where_sql())
        );
        assert_eq!(qb.sql().matches('?').count(), 4);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Lane"), "%Lane%");
        assert_eq!(like_pattern("100%"), r"%100\%%");
        assert_eq!(like_pattern("a_b"), r"%a\_b%");
        assert_eq!(like_pattern(r"c:\"), r"%c:\\%");
    }
}
