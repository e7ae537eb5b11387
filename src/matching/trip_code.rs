use crate::core::transaction::ReconciledRow;

/// Separator used when several carriers or trip codes share one field
pub const LIST_SEPARATOR: &str = ", ";

/// First comma-separated token of a joined trip-code field, trimmed
#[must_use]
pub fn first_trip_code(joined: &str) -> &str {
    joined.split(',').next().unwrap_or(joined).trim()
}

/// Keep only the first trip code on every non-ambiguous row.
///
/// Must run after every row has been reconciled: it keys off the final
/// method of each row. Ambiguous rows keep the full list; unmatched rows
/// stay unmatched.
pub fn normalize_trip_codes(rows: &mut [ReconciledRow]) {
    for annotation in rows.iter_mut().filter_map(|r| r.annotation.as_mut()) {
        if annotation.method.is_ambiguous() {
            continue;
        }
        let first = first_trip_code(&annotation.trip_code);
        if first.len() != annotation.trip_code.len() {
            annotation.trip_code = first.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::TransactionRow;
    use crate::core::types::{Annotation, MatchMethod};

    fn row(trip_code: &str, method: MatchMethod) -> ReconciledRow {
        ReconciledRow {
            transaction: TransactionRow::new(None, None::<String>),
            annotation: Some(Annotation {
                carrier: "Acme".to_string(),
                trip_code: trip_code.to_string(),
                method,
            }),
        }
    }

    #[test]
    fn test_first_trip_code() {
        assert_eq!(first_trip_code("T0, T1, T2"), "T0");
        assert_eq!(first_trip_code("  T0 ,T1"), "T0");
        assert_eq!(first_trip_code("T0"), "T0");
        assert_eq!(first_trip_code(""), "");
        assert_eq!(first_trip_code(", T1"), "");
    }

    #[test]
    fn test_truncates_non_ambiguous_rows() {
        let mut rows = vec![
            row("T0, T1", MatchMethod::OnOrBefore),
            row("T5, T6", MatchMethod::Exact),
        ];
        normalize_trip_codes(&mut rows);
        assert_eq!(rows[0].trip_code(), Some("T0"));
        assert_eq!(rows[1].trip_code(), Some("T5"));
    }

    #[test]
    fn test_ambiguous_rows_keep_full_list() {
        let mut rows = vec![row("T0, T1", MatchMethod::Ambiguous)];
        normalize_trip_codes(&mut rows);
        assert_eq!(rows[0].trip_code(), Some("T0, T1"));
    }

    #[test]
    fn test_idempotent_without_comma() {
        let mut rows = vec![row("12345", MatchMethod::NextDay)];
        normalize_trip_codes(&mut rows);
        let once = rows.clone();
        normalize_trip_codes(&mut rows);
        assert_eq!(rows, once);
        assert_eq!(rows[0].trip_code(), Some("12345"));
    }

    #[test]
    fn test_unmatched_rows_untouched() {
        let mut rows = vec![ReconciledRow {
            transaction: TransactionRow::new(None, None::<String>),
            annotation: None,
        }];
        normalize_trip_codes(&mut rows);
        assert!(rows[0].annotation.is_none());
    }
}
