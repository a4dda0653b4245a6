use munigraph_core::{CommuneInterval, IntervalId};
use proptest::prelude::*;

proptest! {
    #[test]
    fn identity_is_deterministic(name in "\\PC{0,24}", admission in 0i32..3000, abolition in 0i32..3000) {
        let a = IntervalId::new(&name, admission, abolition);
        let b = CommuneInterval::new(name.clone(), admission, abolition).id();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn identity_differs_when_any_component_differs(
        left in ("\\PC{0,12}", 0i32..3000, 0i32..3000),
        right in ("\\PC{0,12}", 0i32..3000, 0i32..3000),
    ) {
        let l = IntervalId::new(&left.0, left.1, left.2);
        let r = IntervalId::new(&right.0, right.1, right.2);
        prop_assert_eq!(l == r, left == right);
    }

    #[test]
    fn names_with_parentheses_stay_distinct(year in 1800i32..2100) {
        let tricky = IntervalId::new(&format!("A ({}-{})", year, year), year, year);
        let plain = IntervalId::new("A", year, year);
        prop_assert_ne!(tricky, plain);
    }
}
