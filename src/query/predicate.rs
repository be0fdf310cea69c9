use crate::domain::criteria::{FilterCriteria, SortDirection, SortField};
use crate::domain::facility::FacilityRecord;
use rusqlite::types::Value;

/// Text columns a predicate can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Description,
    Town,
    County,
    Postcode,
}

impl TextField {
    fn column(self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Description => "description",
            TextField::Town => "town",
            TextField::County => "county",
            TextField::Postcode => "postcode",
        }
    }

    fn value<'a>(self, record: &'a FacilityRecord) -> Option<&'a str> {
        match self {
            TextField::Title => Some(&record.title),
            TextField::Description => Some(&record.description),
            TextField::Town => record.town.as_deref(),
            TextField::County => record.county.as_deref(),
            TextField::Postcode => record.postcode.as_deref(),
        }
    }
}

/// A composable filter over facility records.
///
/// The same tree renders to a parameterized SQL WHERE clause and
/// evaluates directly against a [`FacilityRecord`], so the count query,
/// the page query and any in-memory check all share one definition.
/// Text matching is ASCII-case-insensitive on both paths (SQLite `LIKE`
/// semantics); `LIKE` wildcards in user input are escaped so a needle is
/// always a literal substring.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Conjunction; empty means "match everything".
    All(Vec<Predicate>),
    /// Disjunction; must not be constructed empty.
    Any(Vec<Predicate>),
    ContainsCi(TextField, String),
    StartsWithCi(TextField, String),
    CategoryIs(i64),
}

impl Predicate {
    /// Renders the predicate as a SQL fragment plus its bind values.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.render(&mut sql, &mut params);
        (sql, params)
    }

    fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Predicate::All(children) if children.is_empty() => sql.push_str("1=1"),
            Predicate::All(children) => join_children(children, " AND ", sql, params),
            Predicate::Any(children) => join_children(children, " OR ", sql, params),
            Predicate::ContainsCi(field, needle) => {
                sql.push_str(field.column());
                sql.push_str(" LIKE ? ESCAPE '\\'");
                params.push(Value::Text(format!("%{}%", escape_like(needle))));
            }
            Predicate::StartsWithCi(field, prefix) => {
                sql.push_str(field.column());
                sql.push_str(" LIKE ? ESCAPE '\\'");
                params.push(Value::Text(format!("{}%", escape_like(prefix))));
            }
            Predicate::CategoryIs(id) => {
                sql.push_str("category = ?");
                params.push(Value::Integer(*id));
            }
        }
    }

    /// Evaluates the predicate against a record in memory. Agrees with
    /// the SQL rendering for ASCII data; NULL columns never match.
    pub fn matches(&self, record: &FacilityRecord) -> bool {
        match self {
            Predicate::All(children) => children.iter().all(|c| c.matches(record)),
            Predicate::Any(children) => children.iter().any(|c| c.matches(record)),
            Predicate::ContainsCi(field, needle) => field.value(record).map_or(false, |v| {
                v.to_ascii_lowercase()
                    .contains(&needle.to_ascii_lowercase())
            }),
            Predicate::StartsWithCi(field, prefix) => field.value(record).map_or(false, |v| {
                v.to_ascii_lowercase()
                    .starts_with(&prefix.to_ascii_lowercase())
            }),
            Predicate::CategoryIs(id) => record.category == *id,
        }
    }
}

fn join_children(children: &[Predicate], sep: &str, sql: &mut String, params: &mut Vec<Value>) {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            sql.push_str(sep);
        }
        sql.push('(');
        child.render(sql, params);
        sql.push(')');
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Verified ordering: column from the whitelist enum, direction keyword
/// from the enum, plus an id tie-break so page boundaries are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn order_by_clause(&self) -> String {
        format!(
            "{} {}, id ASC",
            self.field.column(),
            self.direction.keyword()
        )
    }
}

/// A faceted query derived from [`FilterCriteria`]: one predicate shared
/// by the count and page queries, and a verified sort spec.
#[derive(Debug, Clone)]
pub struct FacetedQuery {
    pub predicate: Predicate,
    pub sort: SortSpec,
}

impl FacetedQuery {
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let mut clauses = Vec::new();

        // The free-text term matches title OR description OR postcode;
        // every other facet narrows the result with AND.
        if !criteria.search_term.is_empty() {
            clauses.push(Predicate::Any(vec![
                Predicate::ContainsCi(TextField::Title, criteria.search_term.clone()),
                Predicate::ContainsCi(TextField::Description, criteria.search_term.clone()),
                Predicate::ContainsCi(TextField::Postcode, criteria.search_term.clone()),
            ]));
        }
        if let Some(category) = criteria.category {
            clauses.push(Predicate::CategoryIs(category));
        }
        if !criteria.town.is_empty() {
            clauses.push(Predicate::ContainsCi(TextField::Town, criteria.town.clone()));
        }
        if !criteria.county.is_empty() {
            clauses.push(Predicate::ContainsCi(
                TextField::County,
                criteria.county.clone(),
            ));
        }
        // The postcode facet is a prefix match, unlike the free-text term.
        if !criteria.postcode.is_empty() {
            clauses.push(Predicate::StartsWithCi(
                TextField::Postcode,
                criteria.postcode.clone(),
            ));
        }

        FacetedQuery {
            predicate: Predicate::All(clauses),
            sort: SortSpec {
                field: criteria.sort_field,
                direction: criteria.sort_direction,
            },
        }
    }
}
