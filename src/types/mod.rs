//! Dialect type registry.
//!
//! [`Type`] is a closed algebra over the column types the server understands.
//! It renders to the server's type names ([`fmt::Display`]) and parses them
//! back ([`Type::parse`]); `Type::parse(&t.to_string()) == Ok(t)` holds for
//! every type that passes [`Type::validate`].

mod coerce;
mod parser;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, DialectResult};
use crate::transpiler::escape::quote_string;

pub(crate) use parser::quoted;

/// Largest precision accepted by `Decimal(p, s)`.
pub const MAX_DECIMAL_PRECISION: u32 = 38;

/// Largest sub-second precision accepted by `DateTime64(p)`.
pub const MAX_DATETIME64_PRECISION: u32 = 9;

/// A column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Int256,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    UInt256,
    Float32,
    Float64,
    Bool,
    String,
    /// `String(n)`; the length is advisory and values are not truncated
    BoundedString(u32),
    /// Fixed byte length string
    FixedString(u32),
    Uuid,
    Date,
    Date32,
    /// `DateTime` with optional timezone name
    DateTime(Option<String>),
    DateTime64 {
        precision: u32,
        timezone: Option<String>,
    },
    IPv4,
    IPv6,
    Decimal {
        precision: u32,
        scale: u32,
    },
    /// Ordered name => value members, values within `i8`
    Enum8(Vec<(String, i16)>),
    /// Ordered name => value members
    Enum16(Vec<(String, i16)>),
    Array(Box<Type>),
    Nullable(Box<Type>),
    LowCardinality(Box<Type>),
    Tuple(Vec<Type>),
    /// `Tuple(name T, ...)`
    NamedTuple(Vec<(String, Type)>),
    Map(Box<Type>, Box<Type>),
}

impl Type {
    pub fn array(inner: Type) -> Type {
        Type::Array(Box::new(inner))
    }

    pub fn nullable(inner: Type) -> Type {
        Type::Nullable(Box::new(inner))
    }

    pub fn low_cardinality(inner: Type) -> Type {
        Type::LowCardinality(Box::new(inner))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Box::new(key), Box::new(value))
    }

    /// `Decimal(precision, scale)`, validated.
    pub fn decimal(precision: u32, scale: u32) -> DialectResult<Type> {
        check_decimal(precision, scale)?;
        Ok(Type::Decimal { precision, scale })
    }

    pub fn fixed_string(length: u32) -> DialectResult<Type> {
        let ty = Type::FixedString(length);
        ty.validate()?;
        Ok(ty)
    }

    pub fn enum8<I, S>(members: I) -> DialectResult<Type>
    where
        I: IntoIterator<Item = (S, i16)>,
        S: Into<String>,
    {
        let ty = Type::Enum8(members.into_iter().map(|(n, v)| (n.into(), v)).collect());
        ty.validate()?;
        Ok(ty)
    }

    pub fn enum16<I, S>(members: I) -> DialectResult<Type>
    where
        I: IntoIterator<Item = (S, i16)>,
        S: Into<String>,
    {
        let ty = Type::Enum16(members.into_iter().map(|(n, v)| (n.into(), v)).collect());
        ty.validate()?;
        Ok(ty)
    }

    /// Parse a server type name such as `Array(Nullable(Decimal(10, 2)))`.
    pub fn parse(name: &str) -> DialectResult<Type> {
        parser::parse_type(name)
    }

    /// Server type name.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Nullable(_) => true,
            Type::LowCardinality(inner) => inner.is_nullable(),
            _ => false,
        }
    }

    /// Check the parameters of this type and every nested type.
    pub fn validate(&self) -> DialectResult<()> {
        match self {
            Type::FixedString(0) => Err(DialectError::invalid_type(
                "FixedString length must be positive",
            )),
            Type::DateTime64 { precision, .. } if *precision > MAX_DATETIME64_PRECISION => {
                Err(DialectError::invalid_type(format!(
                    "DateTime64 precision {} exceeds {}",
                    precision, MAX_DATETIME64_PRECISION
                )))
            }
            Type::Decimal { precision, scale } => check_decimal(*precision, *scale),
            Type::Enum8(members) => check_enum("Enum8", members, i8::MIN as i16, i8::MAX as i16),
            Type::Enum16(members) => check_enum("Enum16", members, i16::MIN, i16::MAX),
            Type::Array(inner) | Type::LowCardinality(inner) => inner.validate(),
            Type::Nullable(inner) => match **inner {
                Type::Nullable(_)
                | Type::Array(_)
                | Type::Tuple(_)
                | Type::NamedTuple(_)
                | Type::Map(_, _)
                | Type::LowCardinality(_) => Err(DialectError::invalid_type(format!(
                    "{} cannot be inside Nullable",
                    inner
                ))),
                _ => inner.validate(),
            },
            Type::Tuple(items) => {
                if items.is_empty() {
                    return Err(DialectError::invalid_type("Tuple needs at least one element"));
                }
                items.iter().try_for_each(Type::validate)
            }
            Type::NamedTuple(items) => check_named_tuple(items),
            Type::Map(key, value) => {
                key.validate()?;
                value.validate()
            }
            _ => Ok(()),
        }
    }
}

fn check_decimal(precision: u32, scale: u32) -> DialectResult<()> {
    if precision == 0 || precision > MAX_DECIMAL_PRECISION {
        return Err(DialectError::invalid_type(format!(
            "Decimal precision {} is outside 1..={}",
            precision, MAX_DECIMAL_PRECISION
        )));
    }
    if scale > precision {
        return Err(DialectError::invalid_type(format!(
            "Decimal scale {} exceeds precision {}",
            scale, precision
        )));
    }
    Ok(())
}

fn check_enum(kind: &str, members: &[(String, i16)], min: i16, max: i16) -> DialectResult<()> {
    if members.is_empty() {
        return Err(DialectError::invalid_type(format!("{} needs at least one member", kind)));
    }
    let mut names = HashSet::new();
    let mut values = HashSet::new();
    for (name, value) in members {
        if *value < min || *value > max {
            return Err(DialectError::invalid_type(format!(
                "{} value {} for '{}' is outside {}..={}",
                kind, value, name, min, max
            )));
        }
        if !names.insert(name.as_str()) {
            return Err(DialectError::invalid_type(format!(
                "{} member '{}' is declared twice",
                kind, name
            )));
        }
        if !values.insert(*value) {
            return Err(DialectError::invalid_type(format!(
                "{} value {} is declared twice",
                kind, value
            )));
        }
    }
    Ok(())
}

fn check_named_tuple(items: &[(String, Type)]) -> DialectResult<()> {
    if items.is_empty() {
        return Err(DialectError::invalid_type("Tuple needs at least one element"));
    }
    let mut names = HashSet::new();
    for (name, ty) in items {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DialectError::invalid_type(format!(
                "Tuple element name '{}' is not a plain identifier",
                name
            )));
        }
        if !names.insert(name.as_str()) {
            return Err(DialectError::invalid_type(format!(
                "Tuple element '{}' is declared twice",
                name
            )));
        }
        ty.validate()?;
    }
    Ok(())
}

fn write_members(f: &mut fmt::Formatter<'_>, members: &[(String, i16)]) -> fmt::Result {
    for (i, (name, value)) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{} = {}", quote_string(name), value)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int8 => f.write_str("Int8"),
            Type::Int16 => f.write_str("Int16"),
            Type::Int32 => f.write_str("Int32"),
            Type::Int64 => f.write_str("Int64"),
            Type::Int128 => f.write_str("Int128"),
            Type::Int256 => f.write_str("Int256"),
            Type::UInt8 => f.write_str("UInt8"),
            Type::UInt16 => f.write_str("UInt16"),
            Type::UInt32 => f.write_str("UInt32"),
            Type::UInt64 => f.write_str("UInt64"),
            Type::UInt128 => f.write_str("UInt128"),
            Type::UInt256 => f.write_str("UInt256"),
            Type::Float32 => f.write_str("Float32"),
            Type::Float64 => f.write_str("Float64"),
            Type::Bool => f.write_str("Bool"),
            Type::String => f.write_str("String"),
            Type::BoundedString(n) => write!(f, "String({})", n),
            Type::FixedString(n) => write!(f, "FixedString({})", n),
            Type::Uuid => f.write_str("UUID"),
            Type::Date => f.write_str("Date"),
            Type::Date32 => f.write_str("Date32"),
            Type::DateTime(None) => f.write_str("DateTime"),
            Type::DateTime(Some(tz)) => write!(f, "DateTime({})", quote_string(tz)),
            Type::DateTime64 {
                precision,
                timezone: None,
            } => write!(f, "DateTime64({})", precision),
            Type::DateTime64 {
                precision,
                timezone: Some(tz),
            } => write!(f, "DateTime64({}, {})", precision, quote_string(tz)),
            Type::IPv4 => f.write_str("IPv4"),
            Type::IPv6 => f.write_str("IPv6"),
            Type::Decimal { precision, scale } => write!(f, "Decimal({}, {})", precision, scale),
            Type::Enum8(members) => {
                f.write_str("Enum8(")?;
                write_members(f, members)?;
                f.write_str(")")
            }
            Type::Enum16(members) => {
                f.write_str("Enum16(")?;
                write_members(f, members)?;
                f.write_str(")")
            }
            Type::Array(inner) => write!(f, "Array({})", inner),
            Type::Nullable(inner) => write!(f, "Nullable({})", inner),
            Type::LowCardinality(inner) => write!(f, "LowCardinality({})", inner),
            Type::Tuple(items) => {
                f.write_str("Tuple(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Type::NamedTuple(items) => {
                f.write_str("Tuple(")?;
                for (i, (name, item)) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {}", name, item)?;
                }
                f.write_str(")")
            }
            Type::Map(key, value) => write!(f, "Map({}, {})", key, value),
        }
    }
}

impl FromStr for Type {
    type Err = DialectError;

    fn from_str(s: &str) -> DialectResult<Self> {
        Type::parse(s)
    }
}
