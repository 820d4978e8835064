use crate::types::Edit;
use serde::Serialize;
use std::fmt;

/// Structural problem found in one extracted edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    MissingFile,
    InvalidOldRange,
    InvalidNewRange,
    EmptyEdit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditDefect {
    /// Position of the offending edit in the sequence (0-based)
    pub index: usize,
    pub file: String,
    pub kind: DefectKind,
}

impl fmt::Display for EditDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DefectKind::MissingFile => write!(f, "edit {}: missing filename", self.index + 1),
            DefectKind::InvalidOldRange => write!(f, "{}: old range invalid", self.file),
            DefectKind::InvalidNewRange => write!(f, "{}: new range invalid", self.file),
            DefectKind::EmptyEdit => write!(f, "{}: empty edit", self.file),
        }
    }
}

/// Check every edit, collecting all defects in sequence order.
///
/// Returns `Err` with a non-empty list when any edit is malformed; nothing is ever partially
/// accepted.
pub fn validate_edits(edits: &[Edit]) -> Result<(), Vec<EditDefect>> {
    let mut defects = Vec::new();
    for (index, edit) in edits.iter().enumerate() {
        let mut push = |kind| {
            defects.push(EditDefect {
                index,
                file: edit.file.clone(),
                kind,
            });
        };

        if edit.file.trim().is_empty() {
            push(DefectKind::MissingFile);
        }
        if edit.old_range.is_some_and(|r| !r.is_valid()) {
            push(DefectKind::InvalidOldRange);
        }
        if edit.new_range.is_some_and(|r| !r.is_valid()) {
            push(DefectKind::InvalidNewRange);
        }
        if edit.is_noop() {
            push(DefectKind::EmptyEdit);
        }
    }

    if defects.is_empty() {
        Ok(())
    } else {
        Err(defects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineRange;

    #[test]
    fn accepts_well_formed_edits() {
        let edits = vec![
            Edit::new("a.py", "foo", "bar"),
            Edit::new("b.py", "", "inserted"),
            Edit::new("c.py", "deleted", "")
                .with_ranges(LineRange::new(3, 3), LineRange::new(3, 3)),
        ];
        assert!(validate_edits(&edits).is_ok());
        assert!(validate_edits(&[]).is_ok());
    }

    #[test]
    fn reports_every_defect_in_order() {
        let edits = vec![
            Edit::new("ok.py", "a", "b"),
            Edit::new("", "a", "b"),
            Edit::new("noop.py", "", ""),
            Edit::new("ranges.py", "a", "b")
                .with_ranges(LineRange::new(9, 4), LineRange::new(7, 2)),
        ];
        let defects = validate_edits(&edits).unwrap_err();
        let kinds: Vec<_> = defects.iter().map(|d| (d.index, d.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (1, DefectKind::MissingFile),
                (2, DefectKind::EmptyEdit),
                (3, DefectKind::InvalidOldRange),
                (3, DefectKind::InvalidNewRange),
            ]
        );
        assert_eq!(defects[1].to_string(), "noop.py: empty edit");
        assert_eq!(defects[2].to_string(), "ranges.py: old range invalid");
        assert_eq!(defects[0].to_string(), "edit 2: missing filename");
    }
}
