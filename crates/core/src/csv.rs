//! Minimal CSV writer used by the export endpoints.

/// Escape a value for CSV: wrap in quotes if it contains comma, quote, or newline.
pub fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Build a CSV document from a header and rows of already-stringified cells.
///
/// Lines are separated by `\n`; the document ends with a trailing newline.
pub fn build_csv<R, C>(header: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = String>,
{
    let mut out = header
        .iter()
        .map(|h| csv_escape(h))
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');

    for row in rows {
        let line = row
            .into_iter()
            .map(|cell| csv_escape(&cell))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_are_untouched() {
        assert_eq!(csv_escape("Bygg AS"), "Bygg AS");
    }

    #[test]
    fn special_characters_are_quoted() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn builds_header_and_rows() {
        let rows = vec![
            vec!["2026-03-02".to_string(), "7.5".to_string()],
            vec!["2026-03-03".to_string(), "Riving, etasje 2".to_string()],
        ];
        let csv = build_csv(&["date", "hours"], rows);
        assert_eq!(
            csv,
            "date,hours\n2026-03-02,7.5\n2026-03-03,\"Riving, etasje 2\"\n"
        );
    }

    #[test]
    fn empty_rows_yield_header_only() {
        let csv = build_csv(&["a", "b"], Vec::<Vec<String>>::new());
        assert_eq!(csv, "a,b\n");
    }
}
