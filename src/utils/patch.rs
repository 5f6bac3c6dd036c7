//! Partial-update helpers.
//!
//! Update requests carry one `Option` per mutable field. Only `Some` values
//! are written onto the `ActiveModel`; everything else keeps its stored value.

use sea_orm::{ActiveValue, Value};

/// Overwrite a required column when the request supplied a value.
pub fn set_if_some<V>(field: &mut ActiveValue<V>, value: Option<V>)
where
    V: Into<Value>,
{
    if let Some(v) = value {
        *field = ActiveValue::Set(v);
    }
}

/// Overwrite a nullable column when the request supplied a value.
/// An empty string clears the column.
pub fn set_nullable_text(field: &mut ActiveValue<Option<String>>, value: Option<String>) {
    if let Some(v) = value {
        let v = v.trim().to_string();
        *field = ActiveValue::Set(if v.is_empty() { None } else { Some(v) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_keeps_existing_value() {
        let mut field = ActiveValue::Unchanged("kept".to_string());
        set_if_some(&mut field, None);
        assert_eq!(field, ActiveValue::Unchanged("kept".to_string()));
    }

    #[test]
    fn some_overwrites_value() {
        let mut field = ActiveValue::Unchanged(false);
        set_if_some(&mut field, Some(true));
        assert_eq!(field, ActiveValue::Set(true));
    }

    #[test]
    fn empty_text_clears_nullable_column() {
        let mut field = ActiveValue::Unchanged(Some("old".to_string()));
        set_nullable_text(&mut field, Some("   ".to_string()));
        assert_eq!(field, ActiveValue::Set(None));
    }

    #[test]
    fn nullable_text_is_trimmed() {
        let mut field: ActiveValue<Option<String>> = ActiveValue::NotSet;
        set_nullable_text(&mut field, Some(" https://example.org ".to_string()));
        assert_eq!(field, ActiveValue::Set(Some("https://example.org".to_string())));
    }
}
