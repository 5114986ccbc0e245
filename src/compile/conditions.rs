//! Condition text shared by several compilers.

use std::collections::BTreeSet;

use super::{CompileError, CompileResult};
use crate::filter::{FullTextFilter, SpatialFilter, NO_FEATURE};
use crate::sql::dialect::helpers::wildcard_to_like;
use crate::sql::SqlDialect;

fn join_ids(ids: &BTreeSet<i64>) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `column = id` or `column IN (a, b)`; `None` for an empty set.
pub(crate) fn id_condition(column: &str, ids: &BTreeSet<i64>) -> Option<String> {
    match ids.len() {
        0 => None,
        1 => ids.first().map(|id| format!("{} = {}", column, id)),
        _ => Some(format!("{} IN ({})", column, join_ids(ids))),
    }
}

/// Feature foreign key condition; [`NO_FEATURE`] matches a NULL key.
pub(crate) fn feature_id_condition(column: &str, ids: &BTreeSet<i64>) -> Option<String> {
    let features: BTreeSet<i64> = ids.iter().copied().filter(|id| *id != NO_FEATURE).collect();

    let mut alternatives = Vec::new();
    if ids.contains(&NO_FEATURE) {
        alternatives.push(format!("{} IS NULL", column));
    }
    alternatives.extend(id_condition(column, &features));
    any_of(alternatives)
}

/// `expr IN ('a', 'b')` over string values; `None` for an empty set.
pub(crate) fn string_in_condition(
    expr: &str,
    values: &BTreeSet<String>,
    dialect: &dyn SqlDialect,
) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let quoted = values
        .iter()
        .map(|v| dialect.quote_string(v))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("{} IN ({})", expr, quoted))
}

/// Unique id match; `*` in a uid turns that alternative into `ILIKE`.
pub(crate) fn uid_condition(
    expr: &str,
    uids: &BTreeSet<String>,
    dialect: &dyn SqlDialect,
) -> Option<String> {
    let alternatives: Vec<String> = uids
        .iter()
        .map(|uid| match wildcard_to_like(uid) {
            Some(pattern) => format!("{} ILIKE {}", expr, dialect.quote_string(&pattern)),
            None => format!("{} = {}", expr, dialect.quote_string(uid)),
        })
        .collect();
    any_of(alternatives)
}

/// OR the alternatives together, parenthesized when there is more than one.
pub(crate) fn any_of(mut alternatives: Vec<String>) -> Option<String> {
    match alternatives.len() {
        0 => None,
        1 => alternatives.pop(),
        _ => Some(format!("({})", alternatives.join(" OR "))),
    }
}

/// Case-insensitive match of any keyword against each of `exprs`.
///
/// Keywords match literally: regex metacharacters are escaped.
pub(crate) fn full_text_condition(
    exprs: &[String],
    full_text: &FullTextFilter,
    dialect: &dyn SqlDialect,
) -> CompileResult<String> {
    let keywords: Vec<String> = full_text
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();
    if keywords.is_empty() {
        return Err(CompileError::InvalidFilter(
            "full text filter has no keywords".into(),
        ));
    }
    let pattern = format!("({})", keywords.join("|"));
    let matches = exprs
        .iter()
        .map(|expr| dialect.regex_match_ci(expr, &pattern))
        .collect();
    any_of(matches).ok_or_else(|| CompileError::InvalidFilter("nothing to search".into()))
}

pub(crate) fn spatial_condition(
    geometry_column: &str,
    location: &SpatialFilter,
    dialect: &dyn SqlDialect,
) -> CompileResult<String> {
    if location.wkt.trim().is_empty() {
        return Err(CompileError::InvalidFilter("spatial filter has no geometry".into()));
    }
    Ok(dialect.spatial_predicate(geometry_column, location.op, &location.wkt, location.srid))
}
