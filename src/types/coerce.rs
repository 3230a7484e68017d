//! Native value coercion into column types.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

use super::Type;
use crate::ast::Value;
use crate::error::{DialectError, DialectResult};

/// rust_decimal keeps at most this many fractional digits.
const DECIMAL_MAX_SCALE: u32 = 28;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

impl Type {
    /// Convert `value` into the representation sent for a column of this type.
    ///
    /// Decimals are truncated toward zero to the declared scale. Values that do
    /// not fit raise [`DialectError::InvalidValue`].
    pub fn coerce(&self, value: Value) -> DialectResult<Value> {
        match (self, value) {
            (Type::Nullable(_), Value::Null) => Ok(Value::Null),
            (Type::Nullable(inner), value) | (Type::LowCardinality(inner), value) => {
                inner.coerce(value)
            }
            (ty, Value::Null) => Err(DialectError::invalid_value(format!(
                "NULL is not allowed for {}",
                ty
            ))),
            (Type::Decimal { precision, scale }, value) => {
                coerce_decimal(value, *precision, *scale).map(Value::Decimal)
            }
            (Type::Float32 | Type::Float64, value) => coerce_float(self, value),
            (Type::Bool, value) => coerce_bool(value),
            (Type::String | Type::BoundedString(_), Value::String(s)) => Ok(Value::String(s)),
            (Type::FixedString(n), Value::String(s)) => {
                if s.len() > *n as usize {
                    return Err(DialectError::invalid_value(format!(
                        "'{}' is longer than {} bytes",
                        s, n
                    )));
                }
                Ok(Value::String(s))
            }
            (Type::Uuid, Value::String(s)) => {
                if !is_uuid(&s) {
                    return Err(DialectError::invalid_value(format!("'{}' is not a UUID", s)));
                }
                Ok(Value::String(s))
            }
            (Type::IPv4, Value::String(s)) => Ipv4Addr::from_str(&s)
                .map(|_| Value::String(s.clone()))
                .map_err(|_| DialectError::invalid_value(format!("'{}' is not an IPv4 address", s))),
            (Type::IPv6, Value::String(s)) => Ipv6Addr::from_str(&s)
                .map(|_| Value::String(s.clone()))
                .map_err(|_| DialectError::invalid_value(format!("'{}' is not an IPv6 address", s))),
            (Type::Date | Type::Date32, value) => coerce_date(value),
            (Type::DateTime(_) | Type::DateTime64 { .. }, value) => coerce_datetime(value),
            (Type::Enum8(members) | Type::Enum16(members), value) => coerce_enum(self, members, value),
            (Type::Array(inner), Value::Array(items)) => items
                .into_iter()
                .map(|item| inner.coerce(item))
                .collect::<DialectResult<Vec<_>>>()
                .map(Value::Array),
            (Type::Tuple(types), Value::Tuple(items)) => coerce_tuple(self, types.iter(), items),
            (Type::NamedTuple(elements), Value::Tuple(items)) => {
                coerce_tuple(self, elements.iter().map(|(_, ty)| ty), items)
            }
            (Type::Map(key_ty, value_ty), Value::Map(entries)) => entries
                .into_iter()
                .map(|(k, v)| Ok((key_ty.coerce(k)?, value_ty.coerce(v)?)))
                .collect::<DialectResult<Vec<_>>>()
                .map(Value::Map),
            (ty, value) => match ty.integer_range() {
                Some(range) => coerce_integer(ty, range, value),
                None => Err(mismatch(ty, &value)),
            },
        }
    }

    /// Inclusive bounds of integer types, clamped to what `Value` can carry.
    fn integer_range(&self) -> Option<(i128, i128)> {
        Some(match self {
            Type::Int8 => (i8::MIN.into(), i8::MAX.into()),
            Type::Int16 => (i16::MIN.into(), i16::MAX.into()),
            Type::Int32 => (i32::MIN.into(), i32::MAX.into()),
            Type::Int64 | Type::Int128 | Type::Int256 => (i64::MIN.into(), i64::MAX.into()),
            Type::UInt8 => (0, u8::MAX.into()),
            Type::UInt16 => (0, u16::MAX.into()),
            Type::UInt32 => (0, u32::MAX.into()),
            Type::UInt64 | Type::UInt128 | Type::UInt256 => (0, u64::MAX.into()),
            _ => return None,
        })
    }
}

fn mismatch(ty: &Type, value: &Value) -> DialectError {
    DialectError::invalid_value(format!("cannot store a {} value in {}", value.kind(), ty))
}

fn coerce_tuple<'t>(
    ty: &Type,
    types: impl ExactSizeIterator<Item = &'t Type>,
    items: Vec<Value>,
) -> DialectResult<Value> {
    if types.len() != items.len() {
        return Err(DialectError::invalid_value(format!(
            "{} expects {} elements, got {}",
            ty,
            types.len(),
            items.len()
        )));
    }
    types
        .zip(items)
        .map(|(ty, item)| ty.coerce(item))
        .collect::<DialectResult<Vec<_>>>()
        .map(Value::Tuple)
}

fn coerce_integer(ty: &Type, (min, max): (i128, i128), value: Value) -> DialectResult<Value> {
    let n: i128 = match &value {
        Value::Int(i) => (*i).into(),
        Value::UInt(u) => (*u).into(),
        Value::Bool(b) => (*b).into(),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => *f as i128,
        Value::Decimal(d) if d.fract().is_zero() => d.trunc().to_string().parse().map_err(|_| mismatch(ty, &value))?,
        Value::String(s) => s.trim().parse().map_err(|_| mismatch(ty, &value))?,
        _ => return Err(mismatch(ty, &value)),
    };
    if n < min || n > max {
        return Err(DialectError::invalid_value(format!(
            "{} is out of range for {}",
            n, ty
        )));
    }
    Ok(match i64::try_from(n) {
        Ok(i) => Value::Int(i),
        Err(_) => Value::UInt(n as u64),
    })
}

fn coerce_float(ty: &Type, value: Value) -> DialectResult<Value> {
    match value {
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Int(i) => Ok(Value::Float(i as f64)),
        Value::UInt(u) => Ok(Value::Float(u as f64)),
        Value::Decimal(d) => d
            .to_string()
            .parse()
            .map(Value::Float)
            .map_err(|_| mismatch(ty, &Value::Decimal(d))),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Value::Float)
            .map_err(|_| mismatch(ty, &Value::String(s.clone()))),
        other => Err(mismatch(ty, &other)),
    }
}

fn coerce_bool(value: Value) -> DialectResult<Value> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(b)),
        Value::Int(0) | Value::UInt(0) => Ok(Value::Bool(false)),
        Value::Int(1) | Value::UInt(1) => Ok(Value::Bool(true)),
        other => Err(mismatch(&Type::Bool, &other)),
    }
}

/// Truncate toward zero to `scale` digits and check the integer digits fit.
fn coerce_decimal(value: Value, precision: u32, scale: u32) -> DialectResult<Decimal> {
    let ty = Type::Decimal { precision, scale };
    let decimal = match value {
        Value::Decimal(d) => d,
        Value::Int(i) => Decimal::from(i),
        Value::UInt(u) => Decimal::from(u),
        // Shortest round-trip text keeps 123.13 from becoming 123.12999...
        Value::Float(f) if f.is_finite() => {
            Decimal::from_str(&f.to_string()).map_err(|_| mismatch(&ty, &Value::Float(f)))?
        }
        Value::String(s) => Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .map_err(|_| mismatch(&ty, &Value::String(s.clone())))?,
        other => return Err(mismatch(&ty, &other)),
    };

    let mut truncated = decimal.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    let integer_digits = integer_digits(&truncated);
    let allowed = precision.saturating_sub(scale);
    if integer_digits > allowed {
        return Err(DialectError::invalid_value(format!(
            "{} does not fit {}",
            decimal, ty
        )));
    }
    if scale <= DECIMAL_MAX_SCALE {
        truncated.rescale(scale);
    }
    Ok(truncated)
}

fn integer_digits(d: &Decimal) -> u32 {
    let text = d.abs().trunc().to_string();
    let integer = text.split('.').next().unwrap_or_default();
    integer.trim_start_matches('0').len() as u32
}

fn coerce_date(value: Value) -> DialectResult<Value> {
    match value {
        Value::Date(d) => Ok(Value::Date(d)),
        Value::DateTime(dt) => Ok(Value::Date(dt.date())),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| DialectError::invalid_value(format!("'{}' is not a date", s))),
        other => Err(mismatch(&Type::Date, &other)),
    }
}

fn coerce_datetime(value: Value) -> DialectResult<Value> {
    match value {
        Value::DateTime(dt) => Ok(Value::DateTime(dt)),
        Value::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .map(Value::DateTime)
            .ok_or_else(|| DialectError::invalid_value(format!("'{}' has no midnight", d))),
        Value::String(s) => NaiveDateTime::parse_from_str(s.trim(), DATETIME_FORMAT)
            .map(Value::DateTime)
            .map_err(|_| DialectError::invalid_value(format!("'{}' is not a datetime", s))),
        other => Err(mismatch(&Type::DateTime(None), &other)),
    }
}

/// Enum values travel as member names; integers are mapped back to names.
fn coerce_enum(ty: &Type, members: &[(String, i16)], value: Value) -> DialectResult<Value> {
    let found = match &value {
        Value::String(s) => members.iter().find(|(name, _)| name == s),
        Value::Int(i) => members.iter().find(|(_, v)| i64::from(*v) == *i),
        _ => None,
    };
    match found {
        Some((name, _)) => Ok(Value::String(name.clone())),
        None => Err(DialectError::invalid_value(format!(
            "{:?} is not a member of {}",
            value, ty
        ))),
    }
}

fn is_uuid(s: &str) -> bool {
    let groups: Vec<&str> = s.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}
