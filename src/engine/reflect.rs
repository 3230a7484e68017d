//! Reading reflected engine clauses back into an [`Engine`].
//!
//! The server reports a table's engine as one string (`engine_full`):
//!
//! ```text
//! CnchMergeTree PARTITION BY toYYYYMM(date) ORDER BY (date, x) TTL date + toIntervalDay(1) SETTINGS index_granularity = 8192
//! ```
//!
//! [`EngineParams::parse`] splits it into raw per-clause strings at top-level
//! keywords. [`Engine::reflect`] turns those into structured slots.

use nom::{IResult, bytes::complete::take_while1, character::complete::multispace0};

use super::{Engine, KeyExprs};
use crate::ast::{Expr, Table, Value};
use crate::clauses::{Ttl, TtlAction};
use crate::error::{DialectError, DialectResult};
use crate::types::quoted;

/// Raw clause strings of a reflected engine, unresolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineParams {
    pub name: String,
    pub args: Option<String>,
    pub partition_by: Option<String>,
    pub order_by: Option<String>,
    pub primary_key: Option<String>,
    pub sample_by: Option<String>,
    pub ttl: Option<String>,
    pub settings: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    PartitionBy,
    OrderBy,
    PrimaryKey,
    SampleBy,
    Ttl,
    Settings,
}

const SECTIONS: [(&str, Section); 6] = [
    ("PARTITION BY", Section::PartitionBy),
    ("ORDER BY", Section::OrderBy),
    ("PRIMARY KEY", Section::PrimaryKey),
    ("SAMPLE BY", Section::SampleBy),
    ("TTL", Section::Ttl),
    ("SETTINGS", Section::Settings),
];

fn engine_name(input: &str) -> IResult<&str, &str> {
    let (input, _) = multispace0(input)?;
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

impl EngineParams {
    pub fn parse(engine_full: &str) -> DialectResult<Self> {
        let source = engine_full.trim();
        let (rest, name) = engine_name(source).map_err(|_| {
            DialectError::parse(0, format!("Expected an engine name in '{}'", source))
        })?;
        let mut params = EngineParams {
            name: name.to_string(),
            ..Default::default()
        };

        let offset = source.len() - rest.len();
        let sections = locate_sections(rest);
        let head_end = sections.first().map_or(rest.len(), |(_, start, _)| *start);
        let head = rest[..head_end].trim();
        if !head.is_empty() {
            params.args = Some(constructor_args(head).ok_or_else(|| {
                DialectError::parse(offset, format!("Malformed engine arguments '{}'", head))
            })?);
        }

        for (i, (section, _, body_start)) in sections.iter().enumerate() {
            let body_end = sections.get(i + 1).map_or(rest.len(), |(_, start, _)| *start);
            let body = rest[*body_start..body_end].trim().to_string();
            let slot = match section {
                Section::PartitionBy => &mut params.partition_by,
                Section::OrderBy => &mut params.order_by,
                Section::PrimaryKey => &mut params.primary_key,
                Section::SampleBy => &mut params.sample_by,
                Section::Ttl => &mut params.ttl,
                Section::Settings => &mut params.settings,
            };
            if slot.is_some() {
                return Err(DialectError::parse(
                    offset + body_start,
                    format!("Engine clause repeated in '{}'", source),
                ));
            }
            *slot = Some(body);
        }

        tracing::debug!(engine = %params.name, "parsed engine_full");
        Ok(params)
    }
}

/// `(a, b)` -> `a, b`; the parentheses must enclose the whole head.
fn constructor_args(head: &str) -> Option<String> {
    let inner = head.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.trim().to_string())
}

/// Top-level clause keywords: `(section, keyword start, body start)`.
fn locate_sections(body: &str) -> Vec<(Section, usize, usize)> {
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev_is_space = true;
    let mut skip_until = 0;

    for (i, c) in body.char_indices() {
        if i < skip_until {
            continue;
        }
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            prev_is_space = false;
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && prev_is_space {
            let hit = SECTIONS
                .iter()
                .find(|(keyword, _)| keyword_at(body, i, keyword));
            if let Some((keyword, section)) = hit {
                found.push((*section, i, i + keyword.len()));
                skip_until = i + keyword.len();
                prev_is_space = false;
                continue;
            }
        }
        prev_is_space = c.is_whitespace();
    }
    found
}

fn keyword_at(body: &str, at: usize, keyword: &str) -> bool {
    body[at..].starts_with(keyword)
        && body[at + keyword.len()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace)
}

/// Split on `sep` outside parentheses, brackets and quotes.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

/// Whether `text` is wrapped by one pair of parentheses, e.g. `(a, b)` but
/// not `(a) + (b)`.
fn is_parenthesized(text: &str) -> bool {
    if !text.starts_with('(') || !text.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i + 1 < text.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

fn unquote_identifier(text: &str) -> &str {
    for q in ['`', '"'] {
        if let Some(inner) = text.strip_prefix(q).and_then(|t| t.strip_suffix(q)) {
            return inner;
        }
    }
    text
}

/// A bare identifier naming one of the table's columns resolves to that
/// column; anything else stays raw.
fn reflect_expr(text: &str, table: &Table) -> Expr {
    let name = unquote_identifier(text);
    let bare = name.len() != text.len() || is_identifier(text);
    if bare && table.has_column(name) {
        return table.c(name);
    }
    if bare {
        tracing::warn!(table = %table.name, key = %text, "reflected key is not a known column");
    }
    Expr::Raw(text.to_string())
}

fn is_identifier(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn reflect_keys(text: &str, table: &Table) -> KeyExprs {
    let items = if is_parenthesized(text) {
        split_top_level(&text[1..text.len() - 1], ',')
    } else {
        vec![text]
    };
    KeyExprs(items.into_iter().map(|item| reflect_expr(item, table)).collect())
}

fn reflect_ttl_entry(text: &str, table: &Table) -> DialectResult<Ttl> {
    if let Some(expr) = text.strip_suffix(" DELETE") {
        return Ok(Ttl::delete(reflect_expr(expr.trim(), table)));
    }
    for (marker, to_disk) in [(" TO DISK ", true), (" TO VOLUME ", false)] {
        if let Some((expr, target)) = text.rsplit_once(marker) {
            let name = match quoted(target.trim()) {
                Ok(("", name)) => name,
                _ => {
                    return Err(DialectError::parse(
                        0,
                        format!("Malformed TTL target in '{}'", text),
                    ));
                }
            };
            let expr = reflect_expr(expr.trim(), table);
            let action = if to_disk {
                TtlAction::ToDisk(name)
            } else {
                TtlAction::ToVolume(name)
            };
            return Ok(Ttl {
                expr,
                action: Some(action),
            });
        }
    }
    Ok(Ttl::new(reflect_expr(text, table)))
}

fn reflect_setting_value(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(u) = text.parse::<u64>() {
        return Value::UInt(u);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::Float(f);
    }
    match quoted(text) {
        Ok(("", s)) => Value::String(s),
        _ => Value::String(text.to_string()),
    }
}

fn reflect_settings(text: &str) -> DialectResult<Vec<(String, Value)>> {
    split_top_level(text, ',')
        .into_iter()
        .map(|pair| {
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                DialectError::parse(0, format!("Malformed engine setting '{}'", pair))
            })?;
            Ok((name.trim().to_string(), reflect_setting_value(value.trim())))
        })
        .collect()
}

impl Engine {
    /// Resolve raw clause strings against `table`'s columns.
    pub fn reflect(params: &EngineParams, table: &Table) -> DialectResult<Engine> {
        let mut engine = Engine::new(params.name.clone());
        if let Some(args) = params.args.as_deref().filter(|a| !a.is_empty()) {
            engine.args = split_top_level(args, ',')
                .into_iter()
                .map(|arg| reflect_expr(arg, table))
                .collect();
        }
        engine.partition_by = params.partition_by.as_deref().map(|t| reflect_keys(t, table));
        engine.order_by = params.order_by.as_deref().map(|t| reflect_keys(t, table));
        engine.primary_key = params.primary_key.as_deref().map(|t| reflect_keys(t, table));
        engine.sample_by = params.sample_by.as_deref().map(|t| reflect_keys(t, table));
        if let Some(ttl) = params.ttl.as_deref() {
            engine.ttl = split_top_level(ttl, ',')
                .into_iter()
                .map(|entry| reflect_ttl_entry(entry, table))
                .collect::<DialectResult<Vec<_>>>()?;
        }
        if let Some(settings) = params.settings.as_deref() {
            engine.settings = reflect_settings(settings)?;
        }
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn table() -> Table {
        Table::new("test_reflect")
            .column("date", Type::Date)
            .column("x", Type::Int32)
            .column("y", Type::String)
    }

    #[test]
    fn test_split_engine_full() {
        let params = EngineParams::parse(
            "CnchMergeTree PARTITION BY x ORDER BY x PRIMARY KEY x SAMPLE BY x \
             SETTINGS index_granularity = 8192",
        )
        .unwrap();
        assert_eq!(params.name, "CnchMergeTree");
        assert_eq!(params.args, None);
        assert_eq!(params.partition_by.as_deref(), Some("x"));
        assert_eq!(params.order_by.as_deref(), Some("x"));
        assert_eq!(params.primary_key.as_deref(), Some("x"));
        assert_eq!(params.sample_by.as_deref(), Some("x"));
        assert_eq!(params.settings.as_deref(), Some("index_granularity = 8192"));
    }

    #[test]
    fn test_keywords_inside_parentheses_and_strings_are_ignored() {
        let params = EngineParams::parse(
            "CnchMergeTree() ORDER BY (x, arrayJoin(['ORDER BY'])) TTL date + INTERVAL 1 DAY",
        )
        .unwrap();
        assert_eq!(params.args.as_deref(), Some(""));
        assert_eq!(params.order_by.as_deref(), Some("(x, arrayJoin(['ORDER BY']))"));
        assert_eq!(params.ttl.as_deref(), Some("date + INTERVAL 1 DAY"));
    }

    #[test]
    fn test_reflect_resolves_columns() {
        let engine = Engine::from_engine_full(
            "CnchMergeTree PARTITION BY x ORDER BY x PRIMARY KEY x SAMPLE BY x",
            &table(),
        )
        .unwrap();
        let keys = engine.order_by.as_ref().unwrap();
        assert_eq!(keys.expressions(), &[Expr::qualified("test_reflect", "x")]);
        assert_eq!(engine.partition_by.as_ref().unwrap().columns(), vec!["x"]);
        assert_eq!(engine.primary_key.as_ref().unwrap().columns(), vec!["x"]);
        assert_eq!(engine.sample_by.as_ref().unwrap().columns(), vec!["x"]);
    }

    #[test]
    fn test_reflect_keeps_expressions_raw() {
        let engine = Engine::from_engine_full(
            "CnchMergeTree PARTITION BY toYYYYMM(toDate(x)) ORDER BY (x, y) SAMPLE BY intHash32(x)",
            &table(),
        )
        .unwrap();
        assert_eq!(
            engine.partition_by.unwrap().expressions(),
            &[Expr::Raw("toYYYYMM(toDate(x))".into())]
        );
        assert_eq!(engine.order_by.unwrap().columns(), vec!["x", "y"]);
        assert_eq!(
            engine.sample_by.unwrap().expressions(),
            &[Expr::Raw("intHash32(x)".into())]
        );
    }

    #[test]
    fn test_reflect_ttl_and_settings() {
        let engine = Engine::from_engine_full(
            "CnchMergeTree ORDER BY date \
             TTL date + toIntervalDay(1) DELETE, date + toIntervalDay(2) TO DISK 'hdd', date + toIntervalDay(3) TO VOLUME 'slow' \
             SETTINGS index_granularity = 8192, storage_policy = 'tiered'",
            &table(),
        )
        .unwrap();
        assert_eq!(engine.ttl.len(), 3);
        assert_eq!(engine.ttl[0].action, Some(TtlAction::Delete));
        assert_eq!(engine.ttl[0].expr, Expr::Raw("date + toIntervalDay(1)".into()));
        assert_eq!(engine.ttl[1].action, Some(TtlAction::ToDisk("hdd".into())));
        assert_eq!(engine.ttl[2].action, Some(TtlAction::ToVolume("slow".into())));
        assert_eq!(
            engine.settings,
            vec![
                ("index_granularity".to_string(), Value::Int(8192)),
                ("storage_policy".to_string(), Value::String("tiered".into())),
            ]
        );
    }

    #[test]
    fn test_reflected_engine_renders_again() {
        let engine = Engine::from_engine_full(
            "CnchMergeTree PARTITION BY date ORDER BY (date, x) SETTINGS index_granularity = 8192",
            &table(),
        )
        .unwrap();
        assert_eq!(
            engine.to_ddl_suffix().unwrap(),
            "ENGINE = CnchMergeTree() PARTITION BY date ORDER BY (date, x) \
             SETTINGS index_granularity=8192"
        );
    }

    #[test]
    fn test_engine_args() {
        let engine = Engine::from_engine_full("CnchReplacingMergeTree(x) ORDER BY y", &table()).unwrap();
        assert_eq!(engine.args, vec![Expr::qualified("test_reflect", "x")]);
    }

    #[test]
    fn test_repeated_clause_is_an_error() {
        assert!(EngineParams::parse("CnchMergeTree ORDER BY x ORDER BY y").is_err());
        assert!(EngineParams::parse("").is_err());
    }
}
