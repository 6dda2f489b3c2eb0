//! A1-style coordinate helpers.
//!
//! Rows and columns are **1-based** throughout the model (`A1` is row 1,
//! column 1). Source anchors that are 0-based convert at the extractor edge.

use std::fmt;

/// Convert a 1-based column number to its letters (1→A, 26→Z, 27→AA).
///
/// Column 0 has no letter form and yields an empty string.
pub fn column_letter(column: u32) -> String {
    let mut result = String::new();
    let mut num = column;

    while num > 0 {
        let remainder = (num - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        num = (num - 1) / 26;
    }

    result
}

/// Convert column letters to a 1-based column number (A→1, AA→27).
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut column: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A' + 1) as u32;
        column = column.checked_mul(26)?.checked_add(digit)?;
    }
    Some(column)
}

/// `coordinate(3, 2)` → `"B3"`.
pub fn coordinate(row: u32, column: u32) -> String {
    format!("{}{}", column_letter(column), row)
}

/// A single cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub column: u32,
}

impl CellRef {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Parse `A1` / `$A$1`. Rejects row 0 and trailing characters.
    pub fn parse(a1: &str) -> Option<Self> {
        let s = a1.trim();
        let bytes = s.as_bytes();
        let mut idx = 0;

        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }
        let col_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
            idx += 1;
        }
        let column = column_index(&s[col_start..idx])?;

        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }
        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == row_start || idx != bytes.len() {
            return None;
        }
        let row: u32 = s[row_start..idx].parse().ok()?;
        if row == 0 {
            return None;
        }

        Some(Self { row, column })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.column), self.row)
    }
}

/// An inclusive rectangular range, normalized so `start` is top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(start: CellRef, end: CellRef) -> Self {
        Self {
            start: CellRef::new(start.row.min(end.row), start.column.min(end.column)),
            end: CellRef::new(start.row.max(end.row), start.column.max(end.column)),
        }
    }

    /// Parse `A1:B2`, or a single `A1` as a one-cell range.
    pub fn parse(range: &str) -> Option<Self> {
        match range.trim().split_once(':') {
            Some((first, last)) => Some(Self::new(CellRef::parse(first)?, CellRef::parse(last)?)),
            None => {
                let cell = CellRef::parse(range)?;
                Some(Self::new(cell, cell))
            }
        }
    }

    pub fn contains(&self, row: u32, column: u32) -> bool {
        (self.start.row..=self.end.row).contains(&row)
            && (self.start.column..=self.end.column).contains(&column)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(2), "B");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(53), "BA");
        assert_eq!(column_letter(703), "AAA");
        assert_eq!(column_letter(16384), "XFD");
        assert_eq!(column_letter(0), "");
    }

    #[test]
    fn test_column_index_inverts_letter() {
        for column in [1, 26, 27, 52, 702, 703, 16384] {
            assert_eq!(column_index(&column_letter(column)), Some(column));
        }
        assert_eq!(column_index("xfd"), Some(16384));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn test_cell_ref_parse() {
        assert_eq!(CellRef::parse("A1"), Some(CellRef::new(1, 1)));
        assert_eq!(CellRef::parse("$C$10"), Some(CellRef::new(10, 3)));
        assert_eq!(CellRef::parse("AA100"), Some(CellRef::new(100, 27)));
        assert_eq!(CellRef::parse("A0"), None);
        assert_eq!(CellRef::parse("1A"), None);
        assert_eq!(CellRef::parse("A1B"), None);
        assert_eq!(CellRef::new(7, 28).to_string(), "AB7");
    }

    #[test]
    fn test_range_contains() {
        let range = CellRange::parse("B2:D4").unwrap();
        assert!(range.contains(2, 2));
        assert!(range.contains(4, 4));
        assert!(range.contains(3, 3));
        assert!(!range.contains(1, 2));
        assert!(!range.contains(2, 5));
        assert_eq!(range.to_string(), "B2:D4");
    }

    #[test]
    fn test_range_normalizes_corners() {
        let range = CellRange::parse("D4:B2").unwrap();
        assert_eq!(range.to_string(), "B2:D4");
        let single = CellRange::parse("C3").unwrap();
        assert!(single.contains(3, 3));
        assert_eq!(single.to_string(), "C3:C3");
        assert!(CellRange::parse("A1:").is_none());
    }
}
