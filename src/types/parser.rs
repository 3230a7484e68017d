//! Type name parser using nom.
//!
//! ```text
//! Array(Nullable(Decimal(10, 2)))
//! Enum8('a' = 1, 'it\'s' = 2)
//! Tuple(id UInt64, tags Array(String))
//! ```
//!
//! A tuple names either all of its elements or none of them.

use std::str::FromStr;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{map, map_res, opt, recognize},
    error::{Error, ErrorKind},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, separated_pair},
};

use super::Type;
use crate::error::{DialectError, DialectResult};

/// Parse a complete type name.
pub fn parse_type(input: &str) -> DialectResult<Type> {
    let source = input.trim();
    match type_expr(source) {
        Ok((rest, ty)) if rest.trim().is_empty() => {
            ty.validate()?;
            Ok(ty)
        }
        Ok((rest, _)) => Err(DialectError::parse(
            source.len() - rest.len(),
            format!("Unexpected '{}' after type in '{}'", rest, source),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(DialectError::parse(
            source.len() - e.input.len(),
            format!("Unknown or malformed type '{}'", source),
        )),
        Err(nom::Err::Incomplete(_)) => Err(DialectError::parse(
            source.len(),
            format!("Incomplete type '{}'", source),
        )),
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0)(input)
}

fn number<T: FromStr>(input: &str) -> IResult<&str, T> {
    map_res(digit1, str::parse::<T>)(input)
}

fn signed<T: FromStr>(input: &str) -> IResult<&str, T> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<T>)(input)
}

/// `( inner )`
fn wrapped<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(
        pair(char('('), multispace0),
        inner,
        pair(multispace0, char(')')),
    )
}

/// Single-quoted string with backslash escapes.
pub(crate) fn quoted(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = char('\'')(input)?;
    let mut out = String::new();
    loop {
        let mut chars = rest.chars();
        match chars.next() {
            None => return Err(nom::Err::Error(Error::new(rest, ErrorKind::Char))),
            Some('\'') => return Ok((chars.as_str(), out)),
            Some('\\') => match chars.next() {
                Some(escaped) => {
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                }
                None => return Err(nom::Err::Error(Error::new(rest, ErrorKind::Escaped))),
            },
            Some(c) => out.push(c),
        }
        rest = chars.as_str();
    }
}

fn enum_member(input: &str) -> IResult<&str, (String, i16)> {
    separated_pair(
        quoted,
        delimited(multispace0, char('='), multispace0),
        signed::<i16>,
    )(input)
}

/// Tuple element, optionally preceded by an element name.
fn tuple_element(input: &str) -> IResult<&str, (Option<String>, Type)> {
    alt((
        map(separated_pair(identifier, multispace1, type_expr), |(name, ty)| {
            (Some(name.to_string()), ty)
        }),
        map(type_expr, |ty| (None::<String>, ty)),
    ))(input)
}

fn tuple_type(input: &str) -> IResult<&str, Type> {
    let (rest, elements) = wrapped(separated_list1(comma, tuple_element))(input)?;
    let named = elements.iter().filter(|(name, _)| name.is_some()).count();
    let ty = if named == 0 {
        Type::Tuple(elements.into_iter().map(|(_, ty)| ty).collect())
    } else if named == elements.len() {
        Type::NamedTuple(
            elements
                .into_iter()
                .filter_map(|(name, ty)| name.map(|name| (name, ty)))
                .collect(),
        )
    } else {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
    };
    Ok((rest, ty))
}

/// `Decimal32(s)` and friends: fixed precision, explicit scale.
fn decimal_alias(precision: u32, input: &str) -> IResult<&str, Type> {
    map(wrapped(number::<u32>), |scale| Type::Decimal { precision, scale })(input)
}

fn type_expr(input: &str) -> IResult<&str, Type> {
    let (input, _) = multispace0(input)?;
    let (rest, name) = identifier(input)?;
    match name {
        "Int8" => Ok((rest, Type::Int8)),
        "Int16" => Ok((rest, Type::Int16)),
        "Int32" => Ok((rest, Type::Int32)),
        "Int64" => Ok((rest, Type::Int64)),
        "Int128" => Ok((rest, Type::Int128)),
        "Int256" => Ok((rest, Type::Int256)),
        "UInt8" => Ok((rest, Type::UInt8)),
        "UInt16" => Ok((rest, Type::UInt16)),
        "UInt32" => Ok((rest, Type::UInt32)),
        "UInt64" => Ok((rest, Type::UInt64)),
        "UInt128" => Ok((rest, Type::UInt128)),
        "UInt256" => Ok((rest, Type::UInt256)),
        "Float32" => Ok((rest, Type::Float32)),
        "Float64" => Ok((rest, Type::Float64)),
        "Bool" | "Boolean" => Ok((rest, Type::Bool)),
        "String" => map(opt(wrapped(number::<u32>)), |length| match length {
            Some(n) => Type::BoundedString(n),
            None => Type::String,
        })(rest),
        "UUID" => Ok((rest, Type::Uuid)),
        "Date" => Ok((rest, Type::Date)),
        "Date32" => Ok((rest, Type::Date32)),
        "IPv4" => Ok((rest, Type::IPv4)),
        "IPv6" => Ok((rest, Type::IPv6)),
        "FixedString" => map(wrapped(number::<u32>), Type::FixedString)(rest),
        "DateTime" => map(opt(wrapped(quoted)), Type::DateTime)(rest),
        "DateTime64" => map(
            wrapped(pair(number::<u32>, opt(preceded(comma, quoted)))),
            |(precision, timezone)| Type::DateTime64 {
                precision,
                timezone,
            },
        )(rest),
        "Decimal" => map(
            wrapped(separated_pair(number::<u32>, comma, number::<u32>)),
            |(precision, scale)| Type::Decimal { precision, scale },
        )(rest),
        "Decimal32" => decimal_alias(9, rest),
        "Decimal64" => decimal_alias(18, rest),
        "Decimal128" => decimal_alias(38, rest),
        "Enum8" => map(wrapped(separated_list1(comma, enum_member)), Type::Enum8)(rest),
        "Enum16" => map(wrapped(separated_list1(comma, enum_member)), Type::Enum16)(rest),
        "Array" => map(wrapped(type_expr), Type::array)(rest),
        "Nullable" => map(wrapped(type_expr), Type::nullable)(rest),
        "LowCardinality" => map(wrapped(type_expr), Type::low_cardinality)(rest),
        "Tuple" => tuple_type(rest),
        "Map" => map(
            wrapped(separated_pair(type_expr, comma, type_expr)),
            |(key, value)| Type::map(key, value),
        )(rest),
        _ => Err(nom::Err::Error(Error::new(input, ErrorKind::Tag))),
    }
}
