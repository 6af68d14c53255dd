//! Task filter composition.
//!
//! A read request carries a [`TaskFilterOptions`] built from the query string.
//! [`TaskFilterComposer`] finalizes it for one structural scope: it parses the raw
//! filter, injects the bucket constraint when the user did not give one, forces the
//! ordering the scope needs and clamps pagination. Storage only ever sees composed
//! options.

use super::filter::{FilterExpr, TaskField, parse_filter};
use crate::errors::{ServiceError, ServiceResult};
use sqlx::{QueryBuilder, Sqlite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortParam {
    pub field: TaskField,
    pub direction: SortDirection,
}

impl SortParam {
    pub fn asc(field: TaskField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }
}

/// Parse comma separated `sort_by` / `order_by` lists. Missing directions default to ascending.
pub fn parse_sort(sort_by: &str, order_by: &str) -> ServiceResult<Vec<SortParam>> {
    let directions: Vec<&str> = order_by
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    sort_by
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, name)| {
            let field = TaskField::from_name(name)
                .filter(|f| f.column().is_some())
                .ok_or_else(|| ServiceError::Validation(format!("cannot sort by `{}`", name)))?;
            let direction = match directions.get(i).map(|d| d.to_ascii_lowercase()) {
                None => SortDirection::Asc,
                Some(d) if d == "asc" => SortDirection::Asc,
                Some(d) if d == "desc" => SortDirection::Desc,
                Some(d) => {
                    return Err(ServiceError::Validation(format!(
                        "invalid sort order `{}`",
                        d
                    )));
                }
            };
            Ok(SortParam { field, direction })
        })
        .collect()
}

/// Per-request filter state: pagination, search, sort and the filter itself.
#[derive(Debug, Clone, Default)]
pub struct TaskFilterOptions {
    pub sort: Vec<SortParam>,
    pub page: i64,
    pub per_page: i64,
    pub search: String,
    /// Raw filter expression as the storage query will see it.
    pub filter: String,
    pub filter_timezone: String,
    pub filter_include_nulls: bool,
    /// `filter` after parsing; `None` when it is blank.
    pub parsed_filters: Option<FilterExpr>,
}

impl TaskFilterOptions {
    /// Rows to skip; saturates for pages far past the end.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }

    /// Append ` AND <filter> AND <search>`; expects a preceding `WHERE`.
    pub(crate) fn push_conditions<'args>(&self, qb: &mut QueryBuilder<'args, Sqlite>) {
        if let Some(expr) = &self.parsed_filters {
            qb.push(" AND ");
            expr.push_sql(qb, self.filter_include_nulls);
        }
        self.push_search(qb);
    }

    pub(crate) fn push_search<'args>(&self, qb: &mut QueryBuilder<'args, Sqlite>) {
        let search = self.search.trim();
        if search.is_empty() {
            return;
        }
        let pattern = format!("%{}%", search);
        qb.push(" AND (t.title LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR t.description LIKE ");
        qb.push_bind(pattern);
        if let Ok(id) = search.trim_start_matches('#').parse::<i64>() {
            qb.push(" OR t.id = ");
            qb.push_bind(id);
        }
        qb.push(")");
    }

    /// Append ` ORDER BY ...` with `t.id` as the final tiebreaker.
    pub(crate) fn push_order_by<'args>(&self, qb: &mut QueryBuilder<'args, Sqlite>) {
        let mut terms: Vec<String> = self
            .sort
            .iter()
            .filter_map(|param| {
                let direction = match param.direction {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                param
                    .field
                    .column()
                    .map(|column| format!("{} {}", column, direction))
            })
            .collect();
        if !self.sort.iter().any(|param| param.field == TaskField::Id) {
            terms.push("t.id ASC".to_string());
        }
        qb.push(" ORDER BY ");
        qb.push(terms.join(", "));
    }
}

/// `(<filter>) && <field> = <id>`, or just the predicate when there is no filter.
pub fn scoped_filter(filter: &str, field: TaskField, id: i64) -> String {
    let predicate = format!("{} = {}", field.name(), id);
    if filter.trim().is_empty() {
        predicate
    } else {
        format!("({}) && {}", filter, predicate)
    }
}

#[derive(Debug, Clone)]
pub struct TaskFilterComposer {
    max_per_page: i64,
}

impl TaskFilterComposer {
    pub fn new(max_per_page: i64) -> Self {
        Self {
            max_per_page: max_per_page.max(1),
        }
    }

    fn paginate(&self, opts: &mut TaskFilterOptions) {
        opts.page = opts.page.max(1);
        opts.per_page = if opts.per_page <= 0 {
            self.max_per_page
        } else {
            opts.per_page.min(self.max_per_page)
        };
    }

    /// Finalize options for the tasks of one bucket.
    ///
    /// A filter that already mentions `bucket_id` is kept as written; otherwise the
    /// bucket predicate is ANDed on. Sorting is always by Kanban position.
    pub fn compose_for_bucket(
        &self,
        opts: &TaskFilterOptions,
        bucket_id: i64,
    ) -> ServiceResult<TaskFilterOptions> {
        let mut composed = opts.clone();
        self.paginate(&mut composed);

        let parsed = parse_filter(&composed.filter, &composed.filter_timezone)?;
        let names_bucket = parsed
            .as_ref()
            .is_some_and(|expr| expr.references(TaskField::BucketId));

        if names_bucket {
            composed.parsed_filters = parsed;
        } else {
            composed.filter = scoped_filter(&composed.filter, TaskField::BucketId, bucket_id);
            composed.parsed_filters =
                parse_filter(&composed.filter, &composed.filter_timezone)?;
        }

        composed.sort = vec![
            SortParam::asc(TaskField::KanbanPosition),
            SortParam::asc(TaskField::Id),
        ];
        Ok(composed)
    }

    /// Finalize options for every bucket of a board.
    ///
    /// When the user filter pins `bucket_id` to specific values, buckets outside
    /// that set are dropped before composing, so no query is built for them.
    pub fn compose_for_board(
        &self,
        opts: &TaskFilterOptions,
        bucket_ids: &[i64],
    ) -> ServiceResult<Vec<(i64, TaskFilterOptions)>> {
        let parsed = parse_filter(&opts.filter, &opts.filter_timezone)?;
        let pinned = parsed
            .as_ref()
            .and_then(|expr| expr.required_ids(TaskField::BucketId));

        bucket_ids
            .iter()
            .copied()
            .filter(|id| pinned.as_ref().is_none_or(|allowed| allowed.contains(id)))
            .map(|id| Ok((id, self.compose_for_bucket(opts, id)?)))
            .collect()
    }

    /// Finalize options for a project's list view.
    ///
    /// The project itself is applied structurally by the storage query. Without an
    /// explicit sort the list is ordered by list position.
    pub fn compose_for_project(&self, opts: &TaskFilterOptions) -> ServiceResult<TaskFilterOptions> {
        let mut composed = opts.clone();
        self.paginate(&mut composed);
        composed.parsed_filters = parse_filter(&composed.filter, &composed.filter_timezone)?;
        if composed.sort.is_empty() {
            composed.sort = vec![SortParam::asc(TaskField::Position)];
        }
        Ok(composed)
    }
}
