//! Tolerant column-table scanning
//!
//! Management utilities emit column-aligned tables bounded by dash rules,
//! followed by legends and summary sections. The scanner here locates the
//! header row by predicate, collects whitespace-delimited body rows, and
//! stops at the first rule, blank line, or legend line after the body.
//! Rows with fewer fields than the record type requires are dropped, never
//! fatal.

use tracing::debug;

/// A dash rule bounding a table section
pub fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '-')
}

/// Extract the body rows of the first table whose header satisfies
/// `is_header`, split on whitespace. Rows with fewer than `min_fields`
/// fields are skipped; remaining rows keep their original order.
pub fn table_rows<'a, F>(raw: &'a str, is_header: F, min_fields: usize) -> Vec<Vec<&'a str>>
where
    F: Fn(&str) -> bool,
{
    let mut rows = Vec::new();
    let mut in_table = false;
    let mut in_body = false;
    let mut skipped = 0usize;

    for line in raw.lines() {
        if !in_table {
            if is_header(line) {
                in_table = true;
            }
            continue;
        }

        let trimmed = line.trim();

        if is_separator(line) {
            // The rule under the header opens the body; the next one
            // closes it.
            if in_body {
                break;
            }
            in_body = true;
            continue;
        }

        if trimmed.is_empty() || trimmed.contains('=') {
            // Blank line or legend ends the table even without a closing
            // rule.
            if in_body {
                break;
            }
            continue;
        }

        if !in_body {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < min_fields {
            skipped += 1;
            continue;
        }
        rows.push(fields);
    }

    if skipped > 0 {
        debug!(skipped, min_fields, "dropped malformed table rows");
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Status = Success
Description = Show Drive Information Succeeded.

Drive Information :
=================

-------------------------------------------------
EID:Slt DID State DG       Size Intf Med Model
-------------------------------------------------
252:0    10 Onln   0   1.818 TB SATA HDD ST2000
252:1    11 Onln   0   1.818 TB SATA HDD ST2000
252:2    12 UGood  -   1.818 TB SATA HDD ST2000
-------------------------------------------------

EID=Enclosure Device ID|Slt=Slot No.|DID=Device ID
";

    #[test]
    fn test_is_separator() {
        assert!(is_separator("----------"));
        assert!(is_separator("  ---  "));
        assert!(!is_separator(""));
        assert!(!is_separator("252:0 10 Onln"));
        assert!(!is_separator("EID=Enclosure"));
    }

    #[test]
    fn test_extracts_body_rows_only() {
        let rows = table_rows(LISTING, |l| l.contains("EID:Slt"), 8);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "252:0");
        assert_eq!(rows[2][0], "252:2");
        // Legend and summary lines never become rows
        assert!(rows.iter().all(|r| !r[0].contains('=')));
    }

    #[test]
    fn test_malformed_rows_skipped_in_order() {
        let raw = "\
------------------------
EID:Slt DID State DG Size
------------------------
252:0 10 Onln 0 1.818
252:1 10
252:2 12 UGood - 1.818
garbage
252:3 13 Onln 0 1.818
------------------------
";
        let rows = table_rows(raw, |l| l.contains("EID:Slt"), 5);
        let slots: Vec<&str> = rows.iter().map(|r| r[0]).collect();
        assert_eq!(slots, vec!["252:0", "252:2", "252:3"]);
    }

    #[test]
    fn test_missing_header_yields_no_rows() {
        let rows = table_rows(LISTING, |l| l.contains("DG/VD"), 2);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_body_ends_at_blank_line_without_closing_rule() {
        let raw = "\
HEADER A B C
-------------
1 2 3
4 5 6

7 8 9
";
        let rows = table_rows(raw, |l| l.starts_with("HEADER"), 3);
        assert_eq!(rows.len(), 2);
    }
}
