// SPDX-License-Identifier: Apache-2.0
#![allow(clippy::unwrap_used)]
use proptest::prelude::*;
use spider_expr::Expression;

const NO_PARAMS: &[String] = &[];

proptest! {
    #[test]
    fn addition_matches_i64_arithmetic(a in -1000i64..1000, b in -1000i64..1000) {
        let src = format!("{a}+{b}");
        let expr = Expression::parse(&src, &NO_PARAMS).unwrap();
        prop_assert!(expr.is_static());
        prop_assert_eq!(expr.value(), Some((a + b) as f64));
    }

    #[test]
    fn multiplication_matches_i64_arithmetic(a in -100i64..100, b in -100i64..100) {
        let src = format!("{a}*{b}");
        let expr = Expression::parse(&src, &NO_PARAMS).unwrap();
        prop_assert!(expr.is_static());
        prop_assert_eq!(expr.value(), Some((a * b) as f64));
    }

    #[test]
    fn parenthesization_does_not_change_a_sum_of_three(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
        let flat = Expression::parse(&format!("{a}+{b}+{c}"), &NO_PARAMS).unwrap();
        let grouped = Expression::parse(&format!("{a}+({b}+{c})"), &NO_PARAMS).unwrap();
        prop_assert_eq!(flat.value(), grouped.value());
    }
}
