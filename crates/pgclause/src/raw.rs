//! Raw SQL escape hatch.
//!
//! A WHERE or SET field that starts with [`RAW_SQL_PREFIX`] is emitted without any
//! schema validation. Use it only with trusted, caller-authored SQL.

/// Marker prefix for unvalidated SQL fragments.
pub const RAW_SQL_PREFIX: &str = "sql:>";

/// Return the fragment after the marker, or `None` if `field` is not raw.
pub fn strip_raw_prefix(field: &str) -> Option<&str> {
    field.trim_start().strip_prefix(RAW_SQL_PREFIX).map(str::trim)
}

/// Parse a WHERE escape hatch: `sql:>x = 1` -> `(x = 1)`.
pub fn parse_escape(field: &str) -> Option<String> {
    strip_raw_prefix(field).map(|fragment| format!("({fragment})"))
}

/// Prefix `sql` with the raw marker.
pub fn raw(sql: &str) -> String {
    format!("{RAW_SQL_PREFIX}{sql}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_is_parenthesized_verbatim() {
        assert_eq!(parse_escape("sql:>x = 1").as_deref(), Some("(x = 1)"));
        assert_eq!(
            parse_escape("sql:> a.b = ANY(c) ").as_deref(),
            Some("(a.b = ANY(c))")
        );
    }

    #[test]
    fn plain_fields_are_not_raw() {
        assert_eq!(parse_escape("actions.id"), None);
        assert_eq!(strip_raw_prefix("sql:x"), None);
    }

    #[test]
    fn raw_round_trips_through_strip() {
        assert_eq!(strip_raw_prefix(&raw("now() > x")), Some("now() > x"));
    }
}
