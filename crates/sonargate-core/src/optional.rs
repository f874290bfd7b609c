//! Helpers for diffing and late-initializing optional desired fields.
//!
//! Desired specifications model "unset" as `None`. An unset field is a
//! don't-care for comparison purposes, and late initialization fills it
//! from observed state exactly once; it never corrects drift.

/// Returns `true` when `desired` is unset, or set and equal to the literal
/// observed value.
pub fn eq_if_set<T: PartialEq>(desired: &Option<T>, observed: &T) -> bool {
    match desired {
        Some(value) => value == observed,
        None => true,
    }
}

/// Assigns `observed` into `slot` only when the slot is unset.
pub fn assign_if_none<T>(slot: &mut Option<T>, observed: T) {
    if slot.is_none() {
        *slot = Some(observed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_field_always_matches() {
        assert!(eq_if_set(&None::<bool>, &true));
        assert!(eq_if_set(&None::<bool>, &false));
        assert!(eq_if_set(&None::<String>, &"anything".to_string()));
    }

    #[test]
    fn set_field_matches_only_equal_values() {
        assert!(eq_if_set(&Some(true), &true));
        assert!(!eq_if_set(&Some(true), &false));
        assert!(eq_if_set(&Some("80".to_string()), &"80".to_string()));
        assert!(!eq_if_set(&Some("80".to_string()), &"85".to_string()));
    }

    #[test]
    fn assign_fills_unset_slot() {
        let mut slot = None;
        assign_if_none(&mut slot, true);
        assert_eq!(slot, Some(true));
    }

    #[test]
    fn assign_never_overwrites_set_slot() {
        let mut slot = Some(false);
        assign_if_none(&mut slot, true);
        assert_eq!(slot, Some(false));
    }

    #[test]
    fn assign_is_idempotent() {
        let mut slot = None;
        assign_if_none(&mut slot, 7);
        assign_if_none(&mut slot, 9);
        assert_eq!(slot, Some(7));
    }
}
