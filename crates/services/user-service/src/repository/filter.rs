//! Translation of validated query plans into SeaORM selects.
//!
//! Field names resolve to typed `Column`s; client values are coerced to the
//! column's type and bound as parameters. Nothing here formats SQL text.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{ColumnType, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
    Select, Value,
};

use common::{AppError, AppResult};
use domain::{
    Combinator, ConditionSet, ConditionValue, FilterCondition, Operator, QueryError, QueryPlan,
    Scalar, SortDirection,
};

use super::entities::user::{self, Entity as UserEntity};

const LIKE_ESCAPE: char = '\\';

/// Maps conditions on the users table to SeaORM expressions.
pub struct ConditionTranslator;

impl ConditionTranslator {
    /// Group of conditions joined by the set's combinator
    pub fn group(set: &ConditionSet) -> AppResult<Condition> {
        if set.is_empty() {
            return Ok(Condition::all());
        }

        let mut condition = match set.combinator() {
            Combinator::And => Condition::all(),
            Combinator::Or => Condition::any(),
        };

        for filter in set.conditions() {
            condition = condition.add(Self::expr(filter)?);
        }
        Ok(condition)
    }

    /// Single predicate
    pub fn expr(filter: &FilterCondition) -> AppResult<SimpleExpr> {
        let column = user::column_for(filter.field())
            .ok_or_else(|| QueryError::InvalidField(filter.field().to_string()))?;

        let expr = match (filter.operator(), filter.value()) {
            (Operator::Eq, ConditionValue::One(v)) => column.eq(bind(column, filter, v)?),
            (Operator::Neq, ConditionValue::One(v)) => column.ne(bind(column, filter, v)?),
            (Operator::Gt, ConditionValue::One(v)) => column.gt(bind(column, filter, v)?),
            (Operator::Gte, ConditionValue::One(v)) => column.gte(bind(column, filter, v)?),
            (Operator::Lt, ConditionValue::One(v)) => column.lt(bind(column, filter, v)?),
            (Operator::Lte, ConditionValue::One(v)) => column.lte(bind(column, filter, v)?),
            (Operator::Like, ConditionValue::One(Scalar::Text(_)))
                if !is_text(column) =>
            {
                return Err(shape_error(filter, "like needs a text column".to_string()))
            }
            (Operator::Like, ConditionValue::One(Scalar::Text(pattern))) => {
                column.like(LikeExpr::new(contains_pattern(pattern)).escape(LIKE_ESCAPE))
            }
            (Operator::In, ConditionValue::Many(values)) => {
                let bound = values
                    .iter()
                    .map(|v| bind(column, filter, v))
                    .collect::<AppResult<Vec<_>>>()?;
                column.is_in(bound)
            }
            (Operator::Between, ConditionValue::Pair(low, high)) => {
                column.between(bind(column, filter, low)?, bind(column, filter, high)?)
            }
            (Operator::IsNull, ConditionValue::None) => column.is_null(),
            (Operator::NotNull, ConditionValue::None) => column.is_not_null(),
            (operator, _) => {
                return Err(shape_error(filter, format!("unexpected value for {}", operator)))
            }
        };

        Ok(expr)
    }
}

/// Build the select for one page of `plan`.
pub fn select_for(plan: &QueryPlan) -> AppResult<Select<UserEntity>> {
    let mut select = UserEntity::find();

    if !plan.filter().is_empty() {
        select = select.filter(ConditionTranslator::group(plan.filter())?);
    }

    if let Some(cursor) = plan.cursor() {
        select = select.filter(ConditionTranslator::expr(cursor)?);
    }

    for sort in plan.order() {
        let column = user::column_for(sort.field())
            .ok_or_else(|| QueryError::InvalidField(sort.field().to_string()))?;
        let order = match sort.direction() {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        select = select.order_by(column, order);
    }

    Ok(select.offset(plan.offset()).limit(plan.limit()))
}

/// Coerce a client scalar to the column's storage type.
fn bind(column: user::Column, filter: &FilterCondition, scalar: &Scalar) -> AppResult<Value> {
    let value = match column.def().get_column_type() {
        ColumnType::BigInteger => as_int(scalar).map(Value::from),
        ColumnType::Integer => as_int(scalar)
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::from),
        ColumnType::Boolean => as_bool(scalar).map(Value::from),
        ColumnType::TimestampWithTimeZone => scalar
            .as_text()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| Value::from(dt.with_timezone(&Utc))),
        ColumnType::Date => scalar
            .as_text()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .map(Value::from),
        _ => as_string(scalar).map(Value::from),
    };

    value.ok_or_else(|| {
        shape_error(
            filter,
            format!("value {} does not match the column type", scalar.to_json()),
        )
    })
}

fn is_text(column: user::Column) -> bool {
    matches!(
        column.def().get_column_type(),
        ColumnType::String(_) | ColumnType::Text | ColumnType::Char(_)
    )
}

fn as_int(scalar: &Scalar) -> Option<i64> {
    match scalar {
        Scalar::Int(i) => Some(*i),
        Scalar::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(scalar: &Scalar) -> Option<bool> {
    match scalar {
        Scalar::Bool(b) => Some(*b),
        Scalar::Int(0) => Some(false),
        Scalar::Int(1) => Some(true),
        Scalar::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_string(scalar: &Scalar) -> Option<String> {
    match scalar {
        Scalar::Text(s) => Some(s.clone()),
        Scalar::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

/// `%value%` with the value's own wildcards escaped.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn shape_error(filter: &FilterCondition, reason: String) -> AppError {
    AppError::InvalidQuery(QueryError::InvalidValueShape {
        field: filter.field().to_string(),
        operator: filter.operator().as_str().to_string(),
        reason,
    })
}
