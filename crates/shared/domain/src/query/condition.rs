//! Filter condition model: scalars, operators and single predicates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::QueryError;

/// A bound value supplied by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Convert a JSON value; objects, arrays and null are not scalars.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Scalar::Int)
                .or_else(|| n.as_f64().map(Scalar::Float)),
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Int(i) => Value::from(*i),
            Scalar::Float(f) => Value::from(*f),
            Scalar::Text(s) => Value::String(s.clone()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// Number of values an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    Pair,
    Many,
}

/// The fixed operator grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
    IsNull,
    NotNull,
    Between,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::Like,
        Operator::IsNull,
        Operator::NotNull,
        Operator::Between,
    ];

    /// Parse an operator name or its symbol alias (`=`, `!=`, `>`, ...).
    pub fn parse(input: &str) -> Option<Self> {
        let op = match input.trim().to_ascii_lowercase().as_str() {
            "eq" | "=" => Operator::Eq,
            "neq" | "!=" | "<>" => Operator::Neq,
            "gt" | ">" => Operator::Gt,
            "gte" | ">=" => Operator::Gte,
            "lt" | "<" => Operator::Lt,
            "lte" | "<=" => Operator::Lte,
            "in" => Operator::In,
            "like" => Operator::Like,
            "isnull" => Operator::IsNull,
            "notnull" => Operator::NotNull,
            "between" => Operator::Between,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::Like => "like",
            Operator::IsNull => "isnull",
            Operator::NotNull => "notnull",
            Operator::Between => "between",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Operator::IsNull | Operator::NotNull => Arity::None,
            Operator::Between => Arity::Pair,
            Operator::In => Arity::Many,
            _ => Arity::One,
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::parse(s).ok_or_else(|| QueryError::InvalidOperator(s.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a condition, shaped by its operator's arity.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    None,
    One(Scalar),
    Pair(Scalar, Scalar),
    Many(Vec<Scalar>),
}

impl ConditionValue {
    /// JSON form accepted back by the builder.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            ConditionValue::None => None,
            ConditionValue::One(v) => Some(v.to_json()),
            ConditionValue::Pair(low, high) => Some(Value::Array(vec![low.to_json(), high.to_json()])),
            ConditionValue::Many(values) => {
                Some(Value::Array(values.iter().map(Scalar::to_json).collect()))
            }
        }
    }
}

/// One validated predicate: a whitelisted field, an operator and a bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    field: String,
    operator: Operator,
    value: ConditionValue,
}

impl FilterCondition {
    /// Only the builder and paginator construct conditions, after validation.
    pub(crate) fn new(field: impl Into<String>, operator: Operator, value: ConditionValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &ConditionValue {
        &self.value
    }
}
