//! Property-based tests for the built-in predicates and the tag parser.

#[cfg(test)]
mod property_tests {
    use crate::parser::parse_tag;
    use crate::registry::{Param, Registry};
    use crate::validators::*;
    use crate::value::ToValue;
    use proptest::prelude::*;

    // Alpha accepts exactly the ASCII letters.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_alpha_accepts_letters(s in "[A-Za-z]{1,40}") {
            prop_assert!(Alpha::default().is_satisfied(&s.to_value()));
        }

        #[test]
        fn prop_alpha_rejects_digits_and_symbols(
            prefix in "[A-Za-z]{0,10}",
            bad in "[0-9!@#$%^&*()_+=\\- ]",
            suffix in "[A-Za-z]{0,10}",
        ) {
            let s = format!("{prefix}{bad}{suffix}");
            prop_assert!(!Alpha::default().is_satisfied(&s.to_value()));
        }
    }

    // Min and Max compare against the bound for every integer width.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_min_matches_comparison(n in any::<i32>()) {
            let min = Min::new(5, "");
            prop_assert_eq!(min.is_satisfied(&n.to_value()), n >= 5);
        }

        #[test]
        fn prop_max_matches_comparison(n in any::<i16>(), bound in -1000isize..1000) {
            let max = Max::new(bound, "");
            prop_assert_eq!(max.is_satisfied(&n.to_value()), (n as isize) <= bound);
        }

        #[test]
        fn prop_range_is_min_and_max(
            n in -2000i32..2000,
            lo in -1000isize..1000,
            hi in -1000isize..1000,
        ) {
            let range = Range::new(lo, hi, "");
            let expected = Min::new(lo, "").is_satisfied(&n.to_value())
                && Max::new(hi, "").is_satisfied(&n.to_value());
            prop_assert_eq!(range.is_satisfied(&n.to_value()), expected);
        }
    }

    // Sizes count characters, not bytes.
    proptest! {
        #[test]
        fn prop_length_counts_chars(s in "[a-z\u{4e00}-\u{4e20}]{0,20}") {
            let n = s.chars().count() as isize;
            prop_assert!(Length::new(n, "").is_satisfied(&s.to_value()));
            prop_assert!(MinSize::new(n, "").is_satisfied(&s.to_value()));
            prop_assert!(!MaxSize::new(n - 1, "").is_satisfied(&s.to_value()));
        }
    }

    // Repeat fails exactly when an element occurs twice.
    proptest! {
        #[test]
        fn prop_repeat_detects_duplicates(items in prop::collection::vec(0u16..50, 0..20)) {
            let mut unique = items.clone();
            unique.sort_unstable();
            unique.dedup();
            prop_assert_eq!(
                Repeat::default().is_satisfied(&items.to_value()),
                unique.len() == items.len()
            );
        }
    }

    // A parsed integer parameter keeps its value and the key names field,
    // rule and label.
    proptest! {
        #[test]
        fn prop_parsed_bound_and_key(
            n in -10_000isize..10_000,
            field in "[A-Z][a-z]{0,8}",
            label in "[a-z\u{4e00}-\u{4e20}]{0,4}",
        ) {
            let registry = Registry::new();
            let rules = parse_tag(&format!("Required; Min( {n} )"), &field, &label, &registry).unwrap();
            let shown = if label.is_empty() { field.as_str() } else { label.as_str() };

            prop_assert_eq!(rules.len(), 2);
            prop_assert_eq!(rules[1].params(), &[Param::Int(n)]);
            prop_assert_eq!(rules[1].key(), format!("{field}.Min.{shown}"));
        }
    }
}
