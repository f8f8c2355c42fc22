//! Property-based tests for alias and amount validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::validation::{DebtorAlias, MAX_ALIAS_LEN, PositiveAmount, ValidationError};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Surrounding whitespace never changes the parsed alias.
    #[test]
    fn prop_alias_trimmed(name in "[A-Za-z0-9_.-]{1,50}", pad_left in " {0,3}", pad_right in "[ \t]{0,3}") {
        let padded = format!("{pad_left}{name}{pad_right}");
        let alias = DebtorAlias::parse(&padded).unwrap();
        prop_assert_eq!(alias.as_str(), name.as_str());
    }

    /// Any interior whitespace is rejected.
    #[test]
    fn prop_interior_whitespace_rejected(left in "[a-z]{1,20}", gap in "[ \t]{1,3}", right in "[a-z]{1,20}") {
        let raw = format!("{left}{gap}{right}");
        prop_assert_eq!(
            DebtorAlias::parse(&raw).unwrap_err(),
            ValidationError::AliasContainsWhitespace
        );
    }

    /// Aliases past the limit are rejected.
    #[test]
    fn prop_overlong_rejected(name in "[a-z]{51,80}") {
        prop_assert_eq!(
            DebtorAlias::parse(&name).unwrap_err(),
            ValidationError::AliasTooLong { max: MAX_ALIAS_LEN }
        );
    }

    /// Keys are equal exactly when the lowercased aliases are.
    #[test]
    fn prop_key_is_lowercase(name in "[A-Za-z]{1,30}") {
        let alias = DebtorAlias::parse(&name).unwrap();
        let lowered = DebtorAlias::parse(&name.to_lowercase()).unwrap();
        prop_assert_eq!(alias.key(), name.to_lowercase());
        prop_assert!(alias.matches(&lowered));
    }

    /// Amounts are accepted iff strictly positive.
    #[test]
    fn prop_amount_sign(cents in -1_000_000i64..1_000_000i64) {
        let value = Decimal::new(cents, 2);
        let parsed = PositiveAmount::new(value);
        if cents > 0 {
            prop_assert_eq!(parsed.unwrap().value(), value);
        } else {
            prop_assert_eq!(parsed.unwrap_err(), ValidationError::NonPositiveAmount);
        }
    }
}
