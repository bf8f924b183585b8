//! Filtering, sorting, field selection and pagination for listing endpoints.
//!
//! Query strings are parsed against a [`Resource`] whitelist, so column names
//! from the request never reach SQL unchecked. Values are always bound.
//!
//! ```text
//! GET /api/v1/bootcamps?careers=Business&average_cost[lte]=10000&select=name,careers&sort=-name&page=2&limit=5
//! ```
//!
//! ```ignore
//! let query = AdvancedQuery::parse(&params, &BOOTCAMPS)?;
//! let (rows, pagination) = query.fetch::<Bootcamp>(db, BOOTCAMP_COLUMNS).await?;
//! ```

use std::collections::HashMap;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use devcamper_core::{AppError, Pagination};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::map_db_error;

pub const DEFAULT_LIMIT: i64 = 25;
pub const MAX_LIMIT: i64 = 100;

const RESERVED_PARAMS: [&str; 4] = ["select", "sort", "page", "limit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// Postgres enum, compared through its text form.
    Enum,
    Uuid,
    Integer,
    Float,
    Boolean,
    Timestamp,
    TextArray,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Top-level key the column appears under in the JSON response.
    pub json_key: &'static str,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            json_key: name,
        }
    }

    pub const fn nested(name: &'static str, kind: ColumnKind, json_key: &'static str) -> Self {
        Self {
            name,
            kind,
            json_key,
        }
    }
}

/// A table and the columns clients may filter, sort and select on.
#[derive(Debug)]
pub struct Resource {
    pub table: &'static str,
    pub columns: &'static [Column],
}

impl Resource {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "eq" => Some(Self::Eq),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Self::Eq => " = ",
            Self::Gt => " > ",
            Self::Gte => " >= ",
            Self::Lt => " < ",
            Self::Lte => " <= ",
            Self::In => " IN ",
        }
    }

    fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Text(String),
    Uuid(Uuid),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    fn parse(column: &Column, raw: &str) -> Result<Self, AppError> {
        let invalid = || {
            AppError::bad_request(anyhow!("Invalid value '{}' for field '{}'", raw, column.name))
        };

        Ok(match column.kind {
            ColumnKind::Text | ColumnKind::Enum | ColumnKind::TextArray => {
                Self::Text(raw.to_string())
            }
            ColumnKind::Uuid => Self::Uuid(Uuid::parse_str(raw).map_err(|_| invalid())?),
            ColumnKind::Integer => Self::Integer(raw.parse().map_err(|_| invalid())?),
            ColumnKind::Float => Self::Float(raw.parse().map_err(|_| invalid())?),
            ColumnKind::Boolean => Self::Boolean(raw.parse().map_err(|_| invalid())?),
            ColumnKind::Timestamp => Self::Timestamp(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| invalid())?
                    .with_timezone(&Utc),
            ),
        })
    }

    fn push_bind(self, qb: &mut QueryBuilder<'static, Postgres>) {
        match self {
            Self::Text(v) => qb.push_bind(v),
            Self::Uuid(v) => qb.push_bind(v),
            Self::Integer(v) => qb.push_bind(v),
            Self::Float(v) => qb.push_bind(v),
            Self::Boolean(v) => qb.push_bind(v),
            Self::Timestamp(v) => qb.push_bind(v),
        };
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Filter {
    column: &'static Column,
    op: FilterOp,
    values: Vec<Scalar>,
}

impl Filter {
    fn parse(column: &'static Column, op: FilterOp, raw: &str) -> Result<Self, AppError> {
        let unsupported = || {
            AppError::bad_request(anyhow!(
                "Operator not supported for field '{}'",
                column.name
            ))
        };

        if op.is_ordering()
            && matches!(
                column.kind,
                ColumnKind::Boolean | ColumnKind::Enum | ColumnKind::Uuid | ColumnKind::TextArray
            )
        {
            return Err(unsupported());
        }

        let values = if op == FilterOp::In {
            raw.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| Scalar::parse(column, v))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            vec![Scalar::parse(column, raw)?]
        };

        if values.is_empty() {
            return Err(AppError::bad_request(anyhow!(
                "No values given for field '{}'",
                column.name
            )));
        }

        Ok(Self { column, op, values })
    }

    fn push(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let name = self.column.name;

        if self.column.kind == ColumnKind::TextArray {
            let values: Vec<String> = self
                .values
                .iter()
                .cloned()
                .filter_map(Scalar::into_text)
                .collect();
            if self.op == FilterOp::In {
                qb.push(name).push(" && ").push_bind(values);
            } else {
                // Eq on an array column means membership.
                let value = values.into_iter().next().unwrap_or_default();
                qb.push_bind(value).push(" = ANY(").push(name).push(")");
            }
            return;
        }

        qb.push(name);
        if self.column.kind == ColumnKind::Enum {
            qb.push("::text");
        }
        qb.push(self.op.sql());

        if self.op == FilterOp::In {
            qb.push("(");
            for (i, value) in self.values.iter().cloned().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                value.push_bind(qb);
            }
            qb.push(")");
        } else if let Some(value) = self.values.first().cloned() {
            value.push_bind(qb);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SortKey {
    column: &'static str,
    descending: bool,
}

/// Parsed listing parameters for one [`Resource`].
#[derive(Debug, Clone)]
pub struct AdvancedQuery {
    resource: &'static Resource,
    filters: Vec<Filter>,
    sort: Vec<SortKey>,
    select: Option<Vec<&'static Column>>,
    pub page: i64,
    pub limit: i64,
}

impl AdvancedQuery {
    pub fn parse(
        params: &HashMap<String, String>,
        resource: &'static Resource,
    ) -> Result<Self, AppError> {
        let unknown = |field: &str| AppError::bad_request(anyhow!("Unknown field '{}'", field));

        let mut filters = Vec::new();
        // Sorted for a stable WHERE clause regardless of HashMap order.
        let mut keys: Vec<&String> = params
            .keys()
            .filter(|k| !RESERVED_PARAMS.contains(&k.as_str()))
            .collect();
        keys.sort();

        for key in keys {
            let (field, op) = match key.split_once('[') {
                Some((field, rest)) => {
                    let op = rest
                        .strip_suffix(']')
                        .and_then(FilterOp::parse)
                        .ok_or_else(|| {
                            AppError::bad_request(anyhow!("Unknown operator in '{}'", key))
                        })?;
                    (field, op)
                }
                None => (key.as_str(), FilterOp::Eq),
            };

            let column = resource.column(field).ok_or_else(|| unknown(field))?;
            filters.push(Filter::parse(column, op, &params[key])?);
        }

        let sort = match params.get("sort") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    let (name, descending) = match s.strip_prefix('-') {
                        Some(name) => (name, true),
                        None => (s, false),
                    };
                    resource
                        .column(name)
                        .map(|c| SortKey {
                            column: c.name,
                            descending,
                        })
                        .ok_or_else(|| unknown(name))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let select = params
            .get("select")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|name| resource.column(name).ok_or_else(|| unknown(name)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let page = parse_positive(params.get("page"), "page")?.unwrap_or(1).max(1);
        let limit = parse_positive(params.get("limit"), "limit")?
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);

        if (page - 1).checked_mul(limit).is_none() {
            return Err(AppError::bad_request(anyhow!("'page' is out of range")));
        }

        Ok(Self {
            resource,
            filters,
            sort,
            select,
            page,
            limit,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        for (i, filter) in self.filters.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            filter.push(qb);
        }
    }

    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.resource.table));
        self.push_filters(&mut qb);
        qb
    }

    pub fn select_query(&self, columns: &str) -> QueryBuilder<'static, Postgres> {
        let mut qb =
            QueryBuilder::new(format!("SELECT {} FROM {}", columns, self.resource.table));
        self.push_filters(&mut qb);

        qb.push(" ORDER BY ");
        if self.sort.is_empty() {
            qb.push("created_at DESC");
        } else {
            for (i, key) in self.sort.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(key.column)
                    .push(if key.descending { " DESC" } else { " ASC" });
            }
        }
        qb.push(", id ASC");

        qb.push(" LIMIT ").push_bind(self.limit);
        qb.push(" OFFSET ").push_bind(self.offset());
        qb
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        Pagination::for_page(self.page, self.limit, total)
    }

    /// Runs the count and page queries.
    pub async fn fetch<T>(
        &self,
        db: &PgPool,
        columns: &str,
    ) -> Result<(Vec<T>, Pagination), AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let total = self
            .count_query()
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        let rows = self
            .select_query(columns)
            .build_query_as::<T>()
            .fetch_all(db)
            .await
            .map_err(map_db_error)?;

        tracing::debug!(
            table = self.resource.table,
            total,
            returned = rows.len(),
            page = self.page,
            "Listing fetched"
        );

        Ok((rows, self.pagination(total)))
    }

    /// Drops keys that were not requested with `select`. `id` and the
    /// `always_keep` keys (populated relations) survive.
    pub fn project(&self, value: Value, always_keep: &[&str]) -> Value {
        let Some(select) = &self.select else {
            return value;
        };

        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .filter(|(key, _)| {
                        key == "id"
                            || always_keep.contains(&key.as_str())
                            || select.iter().any(|c| c.json_key == key)
                    })
                    .collect(),
            ),
            other => other,
        }
    }
}

fn parse_positive(raw: Option<&String>, name: &str) -> Result<Option<i64>, AppError> {
    raw.map(|v| {
        v.trim()
            .parse::<i64>()
            .map_err(|_| AppError::bad_request(anyhow!("'{}' must be a whole number", name)))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static WIDGETS: Resource = Resource {
        table: "widgets",
        columns: &[
            Column::new("id", ColumnKind::Uuid),
            Column::new("name", ColumnKind::Text),
            Column::new("price", ColumnKind::Float),
            Column::new("stock", ColumnKind::Integer),
            Column::new("active", ColumnKind::Boolean),
            Column::new("kind", ColumnKind::Enum),
            Column::new("tags", ColumnKind::TextArray),
            Column::nested("city", ColumnKind::Text, "location"),
            Column::new("created_at", ColumnKind::Timestamp),
        ],
    };

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse(pairs: &[(&str, &str)]) -> Result<AdvancedQuery, AppError> {
        AdvancedQuery::parse(&params(pairs), &WIDGETS)
    }

    #[test]
    fn test_defaults() {
        let q = parse(&[]).unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, DEFAULT_LIMIT);
        assert_eq!(q.offset(), 0);
        assert_eq!(
            q.select_query("*").sql(),
            "SELECT * FROM widgets ORDER BY created_at DESC, id ASC LIMIT $1 OFFSET $2"
        );
        assert_eq!(q.count_query().sql(), "SELECT COUNT(*) FROM widgets");
    }

    #[test]
    fn test_limit_is_clamped_and_page_offsets() {
        let q = parse(&[("limit", "500"), ("page", "3")]).unwrap();
        assert_eq!(q.limit, MAX_LIMIT);
        assert_eq!(q.offset(), 200);

        let q = parse(&[("limit", "0"), ("page", "-2")]).unwrap();
        assert_eq!(q.limit, 1);
        assert_eq!(q.page, 1);
    }

    #[test]
    fn test_page_beyond_addressable_offset_is_rejected() {
        let huge = i64::MAX.to_string();
        let err = parse(&[("page", huge.as_str()), ("limit", "100")]).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);

        let last = (i64::MAX / MAX_LIMIT + 1).to_string();
        let q = parse(&[("page", last.as_str()), ("limit", "100")]).unwrap();
        assert_eq!(q.offset(), (i64::MAX / MAX_LIMIT) * MAX_LIMIT);
        assert!(q.pagination(10).next.is_none());
    }

    #[test]
    fn test_non_numeric_page_is_rejected() {
        assert_eq!(parse(&[("page", "two")]).unwrap_err().status.as_u16(), 400);
    }

    #[test]
    fn test_comparison_filters() {
        let q = parse(&[("price[lte]", "10000"), ("stock[gt]", "2")]).unwrap();
        assert_eq!(
            q.count_query().sql(),
            "SELECT COUNT(*) FROM widgets WHERE price <= $1 AND stock > $2"
        );
    }

    #[test]
    fn test_in_filter_binds_each_value() {
        let q = parse(&[("name[in]", "a, b,c")]).unwrap();
        assert_eq!(
            q.count_query().sql(),
            "SELECT COUNT(*) FROM widgets WHERE name IN ($1, $2, $3)"
        );
    }

    #[test]
    fn test_enum_compares_as_text() {
        let q = parse(&[("kind", "publisher")]).unwrap();
        assert_eq!(
            q.count_query().sql(),
            "SELECT COUNT(*) FROM widgets WHERE kind::text = $1"
        );
    }

    #[test]
    fn test_array_membership() {
        let q = parse(&[("tags", "Business")]).unwrap();
        assert_eq!(
            q.count_query().sql(),
            "SELECT COUNT(*) FROM widgets WHERE $1 = ANY(tags)"
        );

        let q = parse(&[("tags[in]", "Business,UI/UX")]).unwrap();
        assert_eq!(
            q.count_query().sql(),
            "SELECT COUNT(*) FROM widgets WHERE tags && $1"
        );
    }

    #[test]
    fn test_sort_keys() {
        let q = parse(&[("sort", "-price,name")]).unwrap();
        assert_eq!(
            q.select_query("id").sql(),
            "SELECT id FROM widgets ORDER BY price DESC, name ASC, id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(parse(&[("password", "x")]).is_err());
        assert!(parse(&[("sort", "password")]).is_err());
        assert!(parse(&[("select", "name,password")]).is_err());
        assert!(parse(&[("price[regex]", "1")]).is_err());
    }

    #[test]
    fn test_bad_values_and_operators_are_rejected() {
        assert!(parse(&[("price[lt]", "cheap")]).is_err());
        assert!(parse(&[("active", "maybe")]).is_err());
        assert!(parse(&[("active[gt]", "true")]).is_err());
        assert!(parse(&[("tags[lt]", "x")]).is_err());
        assert!(parse(&[("created_at[gte]", "yesterday")]).is_err());
        assert!(parse(&[("created_at[gte]", "2024-01-01T00:00:00Z")]).is_ok());
    }

    #[test]
    fn test_project_keeps_selected_id_and_relations() {
        let q = parse(&[("select", "name,city")]).unwrap();
        let value = json!({
            "id": "1",
            "name": "a",
            "price": 3.0,
            "location": {"city": "Boston"},
            "courses": []
        });
        assert_eq!(
            q.project(value, &["courses"]),
            json!({"id": "1", "name": "a", "location": {"city": "Boston"}, "courses": []})
        );
    }

    #[test]
    fn test_project_without_select_is_identity() {
        let q = parse(&[]).unwrap();
        let value = json!({"id": "1", "price": 2});
        assert_eq!(q.project(value.clone(), &[]), value);
    }
}
