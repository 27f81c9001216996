//! Position handling for ordered children (chapters, lessons, blocks).

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

/// Check that `requested` is a permutation of `existing`.
pub fn validate_reorder(existing: &[DbId], requested: &[DbId]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(requested.len());
    if let Some(dup) = requested.iter().find(|id| !seen.insert(**id)) {
        return Err(CoreError::Validation(format!(
            "Duplicate id {dup} in requested order"
        )));
    }

    let existing_set: HashSet<DbId> = existing.iter().copied().collect();
    if let Some(extra) = requested.iter().find(|id| !existing_set.contains(*id)) {
        return Err(CoreError::Validation(format!(
            "Id {extra} does not belong to this parent"
        )));
    }
    if let Some(missing) = existing.iter().find(|id| !seen.contains(*id)) {
        return Err(CoreError::Validation(format!(
            "Requested order is missing id {missing}"
        )));
    }
    Ok(())
}

/// `(id, position)` pairs for the given order, 0-based.
pub fn positions_for(ordered: &[DbId]) -> Vec<(DbId, i32)> {
    ordered
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn permutation_is_accepted() {
        assert!(validate_reorder(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(validate_reorder(&[], &[]).is_ok());
    }

    #[test]
    fn missing_extra_and_duplicate_rejected() {
        assert_matches!(
            validate_reorder(&[1, 2, 3], &[1, 2]),
            Err(CoreError::Validation(m)) if m.contains("missing")
        );
        assert_matches!(
            validate_reorder(&[1, 2], &[1, 2, 9]),
            Err(CoreError::Validation(m)) if m.contains('9')
        );
        assert_matches!(
            validate_reorder(&[1, 2], &[1, 1]),
            Err(CoreError::Validation(m)) if m.contains("Duplicate")
        );
    }

    #[test]
    fn positions_are_zero_based() {
        assert_eq!(positions_for(&[7, 4, 9]), vec![(7, 0), (4, 1), (9, 2)]);
    }
}
