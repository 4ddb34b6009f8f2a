//! Delimited name-list parsing.
//!
//! Column lists and active-column filters are configured as a single
//! comma-delimited string (`"userId,name"`). Entries are whitespace-trimmed
//! and may be double-quoted to carry a literal comma.

use crate::error::{RowSetError, RowSetResult};

/// Separator between names in a configured list.
pub const NAME_DELIMITER: u8 = b',';

/// Split a delimited name list into its entries.
///
/// A blank string yields an empty list. Empty entries are kept, so
/// `"a,,b"` has three names and still counts as three columns.
///
/// # Example
/// ```ignore
/// use rowset::parse_name_list;
///
/// let names = parse_name_list("userId, name").unwrap();
/// assert_eq!(names, vec!["userId", "name"]);
/// ```
pub fn parse_name_list(list: &str) -> RowSetResult<Vec<String>> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(NAME_DELIMITER)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(list.as_bytes());

    let mut records = reader.records();
    let record = match records.next() {
        Some(record) => record?,
        None => return Ok(Vec::new()),
    };

    if records.next().is_some() {
        return Err(RowSetError::InvalidNameList(
            "name list must be a single line".to_string(),
        ));
    }

    Ok(record.iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_list() {
        assert_eq!(parse_name_list("userId,name").unwrap(), vec!["userId", "name"]);
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(parse_name_list(" a ,  b,c ").unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(parse_name_list("UserID,eMail").unwrap(), vec!["UserID", "eMail"]);
    }

    #[test]
    fn test_quoted_name_with_comma() {
        let names = parse_name_list(r#""last, first",id"#).unwrap();
        assert_eq!(names, vec!["last, first", "id"]);
    }

    #[test]
    fn test_empty_entries_kept() {
        assert_eq!(parse_name_list("a,,b").unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_blank_is_empty() {
        assert!(parse_name_list("").unwrap().is_empty());
        assert!(parse_name_list("   ").unwrap().is_empty());
    }

    #[test]
    fn test_single_name() {
        assert_eq!(parse_name_list("only").unwrap(), vec!["only"]);
    }

    #[test]
    fn test_multiline_rejected() {
        let err = parse_name_list("a,b\nc").unwrap_err();
        assert!(matches!(err, RowSetError::InvalidNameList(_)));
    }
}
