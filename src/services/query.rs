//! Query helpers shared by the content services.

use crate::error::{AppError, AppResult};
use crate::utils::{is_valid_slug, slugify};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, SqlErr,
};

/// Published filter actually applied to a listing. Anonymous and non-staff
/// callers only ever see published rows.
pub fn published_filter(is_staff: bool, requested: Option<bool>) -> Option<bool> {
    if is_staff {
        requested
    } else {
        Some(true)
    }
}

/// `%term%` with LIKE wildcards escaped, lower-cased for a case-insensitive
/// comparison against `LOWER(column)`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring match on any of `columns`.
pub fn search_condition<C>(columns: &[C], term: &str) -> Condition
where
    C: ColumnTrait,
{
    let pattern = like_pattern(term);
    columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(
            Expr::expr(Func::lower(Expr::col((col.entity_name(), *col))))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

/// Use the requested slug, or derive one from `source` when it is absent.
pub fn resolve_slug(requested: Option<&str>, source: &str) -> AppResult<String> {
    let slug = match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => slugify(source),
    };
    check_slug(&slug)?;
    Ok(slug)
}

pub fn check_slug(slug: &str) -> AppResult<()> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Slug may only contain lowercase letters, numbers and single hyphens".to_string(),
        ))
    }
}

pub async fn slug_exists<E, C>(conn: &C, column: E::Column, slug: &str) -> AppResult<bool>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    Ok(E::find().filter(column.eq(slug)).one(conn).await?.is_some())
}

/// A unique index violation raised at write time is the same client error
/// as the pre-write slug check.
pub fn map_unique_violation(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Validation(message.to_string()),
        _ => AppError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_choose_published_filter() {
        assert_eq!(published_filter(true, None), None);
        assert_eq!(published_filter(true, Some(false)), Some(false));
        assert_eq!(published_filter(false, Some(false)), Some(true));
        assert_eq!(published_filter(false, None), Some(true));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Youth"), "%youth%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[test]
    fn slug_defaults_to_title() {
        assert_eq!(
            resolve_slug(None, "Know Your Rights!").unwrap(),
            "know-your-rights"
        );
        assert_eq!(resolve_slug(Some("  "), "Guide").unwrap(), "guide");
        assert_eq!(resolve_slug(Some("custom-slug"), "Guide").unwrap(), "custom-slug");
    }

    #[test]
    fn malformed_slug_is_rejected() {
        assert!(matches!(
            resolve_slug(Some("Bad Slug"), "x"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(resolve_slug(None, "!!!"), Err(AppError::Validation(_))));
    }
}
