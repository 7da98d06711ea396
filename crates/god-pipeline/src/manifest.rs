//! Image list parsing
//!
//! One row per image, comma separated, three columns; only the last column
//! (the identifier) is used. Blank lines are ignored.

use crate::error::ManifestError;
use god_archive::ImageIdentifier;
use std::path::Path;

/// Columns per row
pub const LIST_COLUMNS: usize = 3;

/// Read identifiers from a list file, in file order
///
/// # Errors
/// - [`ManifestError::Io`] if the file cannot be read
/// - see [`parse_image_list`]
pub fn read_image_list(path: &Path) -> Result<Vec<ImageIdentifier>, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_image_list(&text)
}

/// Parse identifiers from list text, in order
///
/// # Errors
/// - [`ManifestError::Malformed`] if a row does not have three columns
/// - [`ManifestError::Identifier`] if the last column is not an identifier
pub fn parse_image_list(text: &str) -> Result<Vec<ImageIdentifier>, ManifestError> {
    let mut identifiers = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split(',').collect();
        if columns.len() != LIST_COLUMNS {
            return Err(ManifestError::Malformed {
                line: line_no,
                expected: LIST_COLUMNS,
                found: columns.len(),
            });
        }
        let last = columns[LIST_COLUMNS - 1].trim().trim_matches('"');
        let id = ImageIdentifier::parse(last).map_err(|source| ManifestError::Identifier {
            line: line_no,
            source,
        })?;
        identifiers.push(id);
    }
    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn last_column_in_order() {
        let ids = parse_image_list("1,a,n01_1.JPEG\n\n2,b,n02_7.JPEG\r\n3,c,\"n01_2.JPEG\"\n").unwrap();
        let names: Vec<&str> = ids.iter().map(ImageIdentifier::as_str).collect();
        assert_eq!(names, vec!["n01_1.JPEG", "n02_7.JPEG", "n01_2.JPEG"]);
    }

    #[test]
    fn wrong_column_count() {
        let err = parse_image_list("1,a,n01_1.JPEG\n2,n02_7.JPEG\n").unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Malformed { line: 2, expected: 3, found: 2 }
        ));
    }

    #[test]
    fn empty_identifier() {
        let err = parse_image_list("1,a,\n").unwrap_err();
        assert!(matches!(err, ManifestError::Identifier { line: 1, .. }));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_image_list(&dir.path().join("absent.csv")),
            Err(ManifestError::Io { .. })
        ));
    }
}
