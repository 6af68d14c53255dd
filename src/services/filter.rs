//! Filter expressions over task fields.
//!
//! ```text
//! expr      := and_expr ( "||" and_expr )*
//! and_expr  := primary ( "&&" primary )*
//! primary   := "(" expr ")" | condition
//! condition := field comparator value
//! ```
//!
//! Comparators are `=`, `!=`, `>`, `>=`, `<`, `<=`, `like` and `in` (comma
//! separated values). Values may be quoted with `"` or `'`. Dates accept RFC 3339,
//! `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` and `now`; values without an offset are
//! read in the request's filter time zone.
//!
//! Parsed expressions are rendered to SQL against the `tasks` table aliased as `t`.

use crate::errors::{ServiceError, ServiceResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use sqlx::{QueryBuilder, Sqlite};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Id,
    Title,
    Description,
    Done,
    DoneAt,
    DueDate,
    Priority,
    PercentDone,
    BucketId,
    Position,
    KanbanPosition,
    Created,
    Updated,
    /// Label ids attached through `label_tasks`.
    Labels,
    /// Usernames assigned through `task_assignees`.
    Assignees,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Int,
    Float,
    Bool,
    Text,
    Date,
}

const FIELDS: [(&str, TaskField); 15] = [
    ("id", TaskField::Id),
    ("title", TaskField::Title),
    ("description", TaskField::Description),
    ("done", TaskField::Done),
    ("done_at", TaskField::DoneAt),
    ("due_date", TaskField::DueDate),
    ("priority", TaskField::Priority),
    ("percent_done", TaskField::PercentDone),
    ("bucket_id", TaskField::BucketId),
    ("position", TaskField::Position),
    ("kanban_position", TaskField::KanbanPosition),
    ("created", TaskField::Created),
    ("updated", TaskField::Updated),
    ("labels", TaskField::Labels),
    ("assignees", TaskField::Assignees),
];

impl TaskField {
    pub fn from_name(name: &str) -> Option<Self> {
        FIELDS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, field)| *field)
    }

    pub fn name(self) -> &'static str {
        FIELDS
            .iter()
            .find(|(_, field)| *field == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }

    fn kind(self) -> FieldKind {
        match self {
            TaskField::Id | TaskField::Priority | TaskField::BucketId | TaskField::Labels => {
                FieldKind::Int
            }
            TaskField::PercentDone | TaskField::Position | TaskField::KanbanPosition => {
                FieldKind::Float
            }
            TaskField::Done => FieldKind::Bool,
            TaskField::Title | TaskField::Description | TaskField::Assignees => FieldKind::Text,
            TaskField::DoneAt | TaskField::DueDate | TaskField::Created | TaskField::Updated => {
                FieldKind::Date
            }
        }
    }

    fn nullable(self) -> bool {
        matches!(
            self,
            TaskField::Description | TaskField::DoneAt | TaskField::DueDate
        )
    }

    fn is_relation(self) -> bool {
        matches!(self, TaskField::Labels | TaskField::Assignees)
    }

    /// Fields that map to a plain column and can be used for ordering.
    pub fn column(self) -> Option<&'static str> {
        let column = match self {
            TaskField::Id => "t.id",
            TaskField::Title => "t.title",
            TaskField::Description => "t.description",
            TaskField::Done => "t.done",
            TaskField::DoneAt => "t.done_at",
            TaskField::DueDate => "t.due_date",
            TaskField::Priority => "t.priority",
            TaskField::PercentDone => "t.percent_done",
            TaskField::BucketId => "t.bucket_id",
            TaskField::Position => "t.position",
            TaskField::KanbanPosition => "t.kanban_position",
            TaskField::Created => "t.created",
            TaskField::Updated => "t.updated",
            TaskField::Labels | TaskField::Assignees => return None,
        };
        Some(column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equals,
    NotEquals,
    Greater,
    GreaterEquals,
    Less,
    LessEquals,
    Like,
    In,
}

impl Comparator {
    fn sql(self) -> &'static str {
        match self {
            Comparator::Equals => "=",
            Comparator::NotEquals => "!=",
            Comparator::Greater => ">",
            Comparator::GreaterEquals => ">=",
            Comparator::Less => "<",
            Comparator::LessEquals => "<=",
            Comparator::Like => "LIKE",
            Comparator::In => "IN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Date(DateTime<Utc>),
    List(Vec<FilterValue>),
}

/// One `field comparator value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: TaskField,
    pub comparator: Comparator,
    pub value: FilterValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Condition(Condition),
    All(Vec<FilterExpr>),
    Any(Vec<FilterExpr>),
}

impl FilterExpr {
    /// All predicates in the order they appear in the source text.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            FilterExpr::Condition(condition) => out.push(condition),
            FilterExpr::All(children) | FilterExpr::Any(children) => {
                for child in children {
                    child.collect_conditions(out);
                }
            }
        }
    }

    pub fn references(&self, field: TaskField) -> bool {
        self.conditions().iter().any(|c| c.field == field)
    }

    /// Ids every matching task must have for `field`, when the expression pins it.
    ///
    /// `bucket_id = 3 && done = false` pins `{3}`; `bucket_id = 3 || done = false`
    /// pins nothing because the second branch matches any bucket.
    pub fn required_ids(&self, field: TaskField) -> Option<BTreeSet<i64>> {
        match self {
            FilterExpr::Condition(c) if c.field == field => match (c.comparator, &c.value) {
                (Comparator::Equals, FilterValue::Int(id)) => Some(BTreeSet::from([*id])),
                (Comparator::In, FilterValue::List(values)) => Some(
                    values
                        .iter()
                        .filter_map(|v| match v {
                            FilterValue::Int(id) => Some(*id),
                            _ => None,
                        })
                        .collect(),
                ),
                _ => None,
            },
            FilterExpr::Condition(_) => None,
            FilterExpr::All(children) => children
                .iter()
                .filter_map(|child| child.required_ids(field))
                .reduce(|a, b| a.intersection(&b).copied().collect()),
            FilterExpr::Any(children) => children
                .iter()
                .map(|child| child.required_ids(field))
                .collect::<Option<Vec<_>>>()
                .map(|sets| sets.into_iter().flatten().collect()),
        }
    }

    /// Render as a SQL boolean expression. With `include_nulls`, predicates on
    /// nullable columns also match rows where the column is NULL.
    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Sqlite>, include_nulls: bool) {
        match self {
            FilterExpr::Condition(condition) => push_condition(qb, condition, include_nulls),
            FilterExpr::All(children) | FilterExpr::Any(children) => {
                let joiner = if matches!(self, FilterExpr::All(_)) {
                    " AND "
                } else {
                    " OR "
                };
                qb.push("(");
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        qb.push(joiner);
                    }
                    child.push_sql(qb, include_nulls);
                }
                qb.push(")");
            }
        }
    }
}

fn push_condition<'args>(qb: &mut QueryBuilder<'args, Sqlite>, c: &Condition, include_nulls: bool) {
    if c.field.is_relation() {
        let negate = c.comparator == Comparator::NotEquals;
        qb.push(if negate { "NOT EXISTS (" } else { "EXISTS (" });
        match c.field {
            TaskField::Labels => qb.push(
                "SELECT 1 FROM label_tasks lt WHERE lt.task_id = t.id AND lt.label_id",
            ),
            _ => qb.push(
                "SELECT 1 FROM task_assignees ta JOIN users u ON u.id = ta.user_id \
                 WHERE ta.task_id = t.id AND u.username",
            ),
        };
        if c.comparator == Comparator::In {
            qb.push(" IN (");
            push_list(qb, &c.value, false);
            qb.push(")");
        } else {
            qb.push(" = ");
            push_value(qb, &c.value, false);
        }
        qb.push(")");
        return;
    }

    let Some(column) = c.field.column() else {
        return;
    };
    let is_date = c.field.kind() == FieldKind::Date;
    let wrap_nulls = include_nulls && c.field.nullable();

    if wrap_nulls {
        qb.push("(");
    }
    if is_date {
        qb.push(format!("julianday({})", column));
    } else {
        qb.push(column);
    }
    match c.comparator {
        Comparator::Like => {
            qb.push(" LIKE ");
            let pattern = match &c.value {
                FilterValue::Text(text) => format!("%{}%", text),
                _ => String::from("%"),
            };
            qb.push_bind(pattern);
        }
        Comparator::In => {
            qb.push(" IN (");
            push_list(qb, &c.value, is_date);
            qb.push(")");
        }
        other => {
            qb.push(format!(" {} ", other.sql()));
            push_value(qb, &c.value, is_date);
        }
    }
    if wrap_nulls {
        qb.push(format!(" OR {} IS NULL)", column));
    }
}

fn push_list<'args>(qb: &mut QueryBuilder<'args, Sqlite>, value: &FilterValue, is_date: bool) {
    let items = match value {
        FilterValue::List(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(qb, item, is_date);
    }
}

fn push_value<'args>(qb: &mut QueryBuilder<'args, Sqlite>, value: &FilterValue, is_date: bool) {
    match value {
        FilterValue::Int(v) => {
            qb.push_bind(*v);
        }
        FilterValue::Float(v) => {
            qb.push_bind(*v);
        }
        FilterValue::Bool(v) => {
            qb.push_bind(*v);
        }
        FilterValue::Text(v) => {
            qb.push_bind(v.clone());
        }
        FilterValue::Date(v) if is_date => {
            qb.push("julianday(");
            qb.push_bind(*v);
            qb.push(")");
        }
        FilterValue::Date(v) => {
            qb.push_bind(*v);
        }
        FilterValue::List(_) => push_list(qb, value, is_date),
    }
}

fn syntax(msg: impl Into<String>) -> ServiceError {
    ServiceError::FilterSyntax(format!("invalid filter expression: {}", msg.into()))
}

/// Resolve an IANA zone name; empty means UTC.
pub fn parse_timezone(name: &str) -> ServiceResult<Tz> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(Tz::UTC);
    }
    name.parse::<Tz>()
        .map_err(|_| syntax(format!("unknown time zone `{}`", name)))
}

/// Parse a filter string. Blank input yields `None`.
pub fn parse_filter(input: &str, timezone: &str) -> ServiceResult<Option<FilterExpr>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let tz = parse_timezone(timezone)?;
    let mut parser = Parser { input, pos: 0, tz };
    let expr = parser.parse_or()?;
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(syntax(format!(
            "unexpected `{}` at position {}",
            parser.rest(),
            parser.pos
        )));
    }
    Ok(Some(expr))
}

/// Where an unquoted scalar value ends.
const VALUE_END: &[&str] = &["&&", "||", ")"];
/// Where an unquoted item of an `in` list ends.
const LIST_ITEM_END: &[&str] = &[",", "&&", "||", ")"];

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    tz: Tz,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> ServiceResult<FilterExpr> {
        let mut parts = vec![self.parse_and()?];
        while self.eat("||") {
            parts.push(self.parse_and()?);
        }
        Ok(collapse(parts, FilterExpr::Any))
    }

    fn parse_and(&mut self) -> ServiceResult<FilterExpr> {
        let mut parts = vec![self.parse_primary()?];
        while self.eat("&&") {
            parts.push(self.parse_primary()?);
        }
        Ok(collapse(parts, FilterExpr::All))
    }

    fn parse_primary(&mut self) -> ServiceResult<FilterExpr> {
        if self.eat("(") {
            let expr = self.parse_or()?;
            if !self.eat(")") {
                return Err(syntax("missing closing parenthesis"));
            }
            return Ok(expr);
        }
        self.parse_condition()
    }

    fn parse_condition(&mut self) -> ServiceResult<FilterExpr> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(syntax(format!("expected a field name at position {}", self.pos)));
        }
        let name = &rest[..len];
        self.pos += len;
        let field = TaskField::from_name(name)
            .ok_or_else(|| syntax(format!("unknown field `{}`", name)))?;
        let comparator = self.parse_comparator()?;
        check_comparator(field, comparator)?;

        let value = if comparator == Comparator::In {
            let mut items = Vec::new();
            loop {
                let raw = self.read_token(LIST_ITEM_END)?;
                items.push(self.scalar(field, &raw)?);
                if !self.eat(",") {
                    break;
                }
            }
            FilterValue::List(items)
        } else {
            let raw = self.read_value()?;
            self.scalar(field, &raw)?
        };

        Ok(FilterExpr::Condition(Condition {
            field,
            comparator,
            value,
        }))
    }

    fn parse_comparator(&mut self) -> ServiceResult<Comparator> {
        self.skip_ws();
        const SYMBOLS: [(&str, Comparator); 6] = [
            ("!=", Comparator::NotEquals),
            (">=", Comparator::GreaterEquals),
            ("<=", Comparator::LessEquals),
            ("=", Comparator::Equals),
            (">", Comparator::Greater),
            ("<", Comparator::Less),
        ];
        for (token, comparator) in SYMBOLS {
            if self.rest().starts_with(token) {
                self.pos += token.len();
                return Ok(comparator);
            }
        }
        let rest = self.rest();
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..len];
        let comparator = if word.eq_ignore_ascii_case("like") {
            Comparator::Like
        } else if word.eq_ignore_ascii_case("in") {
            Comparator::In
        } else {
            return Err(syntax(format!("invalid comparator `{}`", word)));
        };
        self.pos += len;
        Ok(comparator)
    }

    fn read_value(&mut self) -> ServiceResult<String> {
        self.read_token(VALUE_END)
    }

    /// A quoted string, or the unquoted text up to the first of `stops`.
    fn read_token(&mut self, stops: &[&str]) -> ServiceResult<String> {
        self.skip_ws();
        let rest = self.rest();
        if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
            let body = &rest[1..];
            let end = body
                .find(quote)
                .ok_or_else(|| syntax("unterminated quoted value"))?;
            self.pos += end + 2;
            return Ok(body[..end].to_string());
        }
        let end = stops
            .iter()
            .filter_map(|stop| rest.find(stop))
            .min()
            .unwrap_or(rest.len());
        let value = rest[..end].trim();
        if value.is_empty() {
            return Err(syntax(format!("missing value at position {}", self.pos)));
        }
        self.pos += end;
        Ok(value.to_string())
    }

    fn scalar(&self, field: TaskField, raw: &str) -> ServiceResult<FilterValue> {
        let invalid = || {
            syntax(format!(
                "invalid value `{}` for field `{}`",
                raw,
                field.name()
            ))
        };
        match field.kind() {
            FieldKind::Int => raw.parse().map(FilterValue::Int).map_err(|_| invalid()),
            FieldKind::Float => raw.parse().map(FilterValue::Float).map_err(|_| invalid()),
            FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(FilterValue::Bool(true)),
                "false" | "0" => Ok(FilterValue::Bool(false)),
                _ => Err(invalid()),
            },
            FieldKind::Text => Ok(FilterValue::Text(raw.to_string())),
            FieldKind::Date => parse_date(raw, self.tz)
                .map(FilterValue::Date)
                .ok_or_else(invalid),
        }
    }
}

fn check_comparator(field: TaskField, comparator: Comparator) -> ServiceResult<()> {
    let allowed = if field.is_relation() {
        matches!(
            comparator,
            Comparator::Equals | Comparator::NotEquals | Comparator::In
        )
    } else {
        match field.kind() {
            FieldKind::Bool => matches!(comparator, Comparator::Equals | Comparator::NotEquals),
            FieldKind::Text => matches!(
                comparator,
                Comparator::Equals | Comparator::NotEquals | Comparator::Like | Comparator::In
            ),
            FieldKind::Int | FieldKind::Float | FieldKind::Date => comparator != Comparator::Like,
        }
    };
    if allowed {
        Ok(())
    } else {
        Err(syntax(format!(
            "comparator `{}` is not supported for field `{}`",
            comparator.sql().to_lowercase(),
            field.name()
        )))
    }
}

fn collapse(mut parts: Vec<FilterExpr>, group: fn(Vec<FilterExpr>) -> FilterExpr) -> FilterExpr {
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        group(parts)
    }
}

fn parse_date(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if raw.eq_ignore_ascii_case("now") {
        return Some(Utc::now());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> FilterExpr {
        parse_filter(input, "").unwrap().unwrap()
    }

    #[test]
    fn blank_filter_is_none() {
        assert!(parse_filter("   ", "").unwrap().is_none());
    }

    #[test]
    fn single_condition() {
        let expr = parse("priority = 3");
        assert_eq!(
            expr,
            FilterExpr::Condition(Condition {
                field: TaskField::Priority,
                comparator: Comparator::Equals,
                value: FilterValue::Int(3),
            })
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("done = false || priority >= 2 && bucket_id = 4");
        match expr {
            FilterExpr::Any(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[1], FilterExpr::All(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn conditions_keep_source_order() {
        let expr = parse("(priority = 3) && bucket_id = 7");
        let fields: Vec<_> = expr.conditions().iter().map(|c| c.field).collect();
        assert_eq!(fields, vec![TaskField::Priority, TaskField::BucketId]);
        assert!(expr.references(TaskField::BucketId));
    }

    #[test]
    fn in_list_items_may_be_quoted() {
        let expr = parse(r#"(title in "a)b", 'c, d', e) && done = false"#);
        let conditions = expr.conditions();
        assert_eq!(
            conditions[0].value,
            FilterValue::List(vec![
                FilterValue::Text("a)b".into()),
                FilterValue::Text("c, d".into()),
                FilterValue::Text("e".into()),
            ])
        );
        assert_eq!(conditions[1].field, TaskField::Done);

        let err = parse_filter("title in a,", "").unwrap_err();
        assert!(matches!(err, ServiceError::FilterSyntax(_)));
    }

    #[test]
    fn in_takes_a_list() {
        let expr = parse("labels in 1, 2 ,3");
        let conditions = expr.conditions();
        assert_eq!(
            conditions[0].value,
            FilterValue::List(vec![
                FilterValue::Int(1),
                FilterValue::Int(2),
                FilterValue::Int(3)
            ])
        );
    }

    #[test]
    fn quoted_text_value() {
        let expr = parse("title like \"write docs\" && done = true");
        let conditions = expr.conditions();
        assert_eq!(conditions[0].value, FilterValue::Text("write docs".into()));
        assert_eq!(conditions[1].value, FilterValue::Bool(true));
    }

    #[test]
    fn naive_dates_use_the_filter_timezone() {
        let expr = parse_filter("due_date < 2024-03-01", "Europe/Berlin")
            .unwrap()
            .unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 2, 29, 23, 0, 0).unwrap();
        assert_eq!(expr.conditions()[0].value, FilterValue::Date(expected));
    }

    #[test]
    fn rejects_unknown_field() {
        let err = parse_filter("color = red", "").unwrap_err();
        assert!(matches!(err, ServiceError::FilterSyntax(msg) if msg.contains("unknown field `color`")));
    }

    #[test]
    fn rejects_bad_values_and_comparators() {
        assert!(parse_filter("priority = high", "").is_err());
        assert!(parse_filter("done > true", "").is_err());
        assert!(parse_filter("priority like 3", "").is_err());
        assert!(parse_filter("priority =", "").is_err());
        assert!(parse_filter("(priority = 3", "").is_err());
        assert!(parse_filter("priority = 3)", "").is_err());
        assert!(parse_filter("priority ~ 3", "").is_err());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert!(parse_filter("done = true", "Mars/Olympus").is_err());
    }

    #[test]
    fn required_ids_follow_boolean_structure() {
        let pinned = parse("bucket_id = 3 && done = false");
        assert_eq!(
            pinned.required_ids(TaskField::BucketId),
            Some(BTreeSet::from([3]))
        );

        let either = parse("bucket_id = 3 || bucket_id in 4, 5");
        assert_eq!(
            either.required_ids(TaskField::BucketId),
            Some(BTreeSet::from([3, 4, 5]))
        );

        let open = parse("bucket_id = 3 || done = false");
        assert_eq!(open.required_ids(TaskField::BucketId), None);

        let negated = parse("bucket_id != 3");
        assert_eq!(negated.required_ids(TaskField::BucketId), None);
    }

    #[test]
    fn renders_sql_with_binds() {
        let expr = parse("(priority = 3 || done = true) && due_date > 2024-01-01");
        let mut qb = QueryBuilder::<Sqlite>::new("");
        expr.push_sql(&mut qb, true);
        assert_eq!(
            qb.sql(),
            "((t.priority = ? OR t.done = ?) AND (julianday(t.due_date) > julianday(?) OR t.due_date IS NULL))"
        );
    }

    #[test]
    fn renders_relation_subqueries() {
        let expr = parse("labels != 2 && assignees in alice, bob");
        let mut qb = QueryBuilder::<Sqlite>::new("");
        expr.push_sql(&mut qb, false);
        let sql = qb.sql();
        assert!(sql.starts_with("(NOT EXISTS (SELECT 1 FROM label_tasks lt"));
        assert!(sql.contains("u.username IN (?, ?)"));
    }
}
