use as2js_compiler::db::match_pattern;
use proptest::prelude::*;

fn word() -> impl Strategy<Value = String> {
    "[a-z0-9_.]{0,6}"
}

proptest! {
    #[test]
    fn every_split_of_a_name_matches(start in word(), middle in word(), end in word()) {
        let name = format!("{start}{middle}{end}");
        let patterns = [
            format!("{start}*"),
            format!("*{middle}*"),
            format!("{start}*{end}"),
            format!("*{end}"),
            "*".to_string(),
        ];
        for pattern in &patterns {
            let matched = match_pattern(&name, pattern);
            prop_assert!(matched, "{} does not match {}", pattern, name);
        }
    }

    #[test]
    fn without_a_star_only_the_same_name_matches(name in word(), pattern in word()) {
        prop_assert_eq!(match_pattern(&name, &pattern), name == pattern);
    }

    #[test]
    fn a_longer_literal_tail_never_matches(name in word(), tail in "[a-z]{1,3}") {
        let pattern = format!("*{name}{tail}");
        let matched = match_pattern(&name, &pattern);
        prop_assert!(!matched);
    }
}
