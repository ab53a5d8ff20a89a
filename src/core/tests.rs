#[cfg(test)]
mod tests_impl {
    use crate::core::export::to_csv;
    use crate::core::matcher::{MatchOptions, match_rules, match_rules_with_stats};
    use crate::core::test_helpers::{address_groups, rule_names, rules_table};

    const STRICT: MatchOptions = MatchOptions {
        strict_rule_skip: true,
    };

    #[test]
    fn test_cidr_source_contains_customer_host() {
        let rules = rules_table(&[("10.0.0.0/24", "8.8.8.8")]);
        let matched = match_rules(&rules, None, &["10.0.0.5/32"], &MatchOptions::default()).unwrap();
        assert_eq!(rule_names(&matched), vec!["rule-1"]);
    }

    #[test]
    fn test_match_through_second_group_member() {
        let rules = rules_table(&[("GroupA", "1.1.1.1")]);
        let groups = address_groups(&[("GroupA", "192.168.1.0/24, 10.1.1.1")]);
        let matched =
            match_rules(&rules, Some(&groups), &["10.1.1.1/32"], &MatchOptions::default())
                .unwrap();
        assert_eq!(rule_names(&matched), vec!["rule-1"]);
    }

    #[test]
    fn test_unparseable_rule_never_matches() {
        let rules = rules_table(&[("not-an-ip", "not-an-ip")]);
        for options in [MatchOptions::default(), STRICT] {
            let matched = match_rules(&rules, None, &["0.0.0.0/0", "::/0"], &options).unwrap();
            assert!(matched.is_empty());
        }
    }

    #[test]
    fn test_no_customer_subnets_yields_empty_result() {
        let rules = rules_table(&[("10.0.0.0/8", "any"), ("0.0.0.0/0", "0.0.0.0/0")]);
        let empty: [&str; 0] = [];
        let outcome =
            match_rules_with_stats(&rules, None, &empty, &MatchOptions::default()).unwrap();

        assert!(outcome.table.is_empty());
        assert_eq!(outcome.stats.rules_matched, 0);
        assert_eq!(outcome.table.columns, rules.columns);
        assert_eq!(
            String::from_utf8(to_csv(&outcome.table).unwrap()).unwrap(),
            "Name,Source,Destination,Action\n"
        );
    }

    #[test]
    fn test_unknown_group_is_treated_as_literal() {
        let groups = address_groups(&[("Known", "10.0.0.0/8")]);
        let rules = rules_table(&[("Unknown", "10.9.9.9"), ("Unknown", "172.16.0.1")]);

        let lenient =
            match_rules(&rules, Some(&groups), &["10.9.0.0/16"], &MatchOptions::default())
                .unwrap();
        assert_eq!(rule_names(&lenient), vec!["rule-1"]);

        let strict = match_rules(&rules, Some(&groups), &["10.9.0.0/16"], &STRICT).unwrap();
        assert!(strict.is_empty(), "strict mode skips rules with bad tokens");
    }

    #[test]
    fn test_nested_group_name_is_not_expanded() {
        let groups = address_groups(&[("Outer", "Inner"), ("Inner", "10.0.0.0/8")]);
        let rules = rules_table(&[("Outer", "")]);
        let matched =
            match_rules(&rules, Some(&groups), &["10.1.2.3"], &MatchOptions::default()).unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn test_destination_side_matches() {
        let rules = rules_table(&[("192.0.2.0/24", "198.51.100.0/24")]);
        let matched =
            match_rules(&rules, None, &["198.51.100.77"], &MatchOptions::default()).unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_customer_supernet_matches_rule_host() {
        let rules = rules_table(&[("10.20.30.40", "any")]);
        let matched = match_rules(&rules, None, &["10.0.0.0/8"], &MatchOptions::default()).unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_customer_host_bits_are_masked() {
        let rules = rules_table(&[("10.0.0.200", "any")]);
        let matched = match_rules(&rules, None, &["10.0.0.5/24"], &MatchOptions::default()).unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_rule_matching_many_subnets_appears_once() {
        let rules = rules_table(&[("10.0.0.0/8", "10.1.0.0/16")]);
        let matched = match_rules(
            &rules,
            None,
            &["10.1.1.1", "10.2.2.2", "10.0.0.0/8"],
            &MatchOptions::default(),
        )
        .unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_invalid_customer_lines_are_ignored() {
        let rules = rules_table(&[("10.0.0.0/24", "any")]);
        let outcome = match_rules_with_stats(
            &rules,
            None,
            &["customer-a", "", "  10.0.0.9  "],
            &MatchOptions::default(),
        )
        .unwrap();
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.stats.customer_subnets, 1);
        assert_eq!(outcome.stats.customer_subnets_rejected, 1);
    }

    #[test]
    fn test_ipv6_rules_match_ipv6_customers_only() {
        let rules = rules_table(&[("2001:db8::/32", "any"), ("10.0.0.0/8", "any")]);
        let matched =
            match_rules(&rules, None, &["2001:db8:abcd::1"], &MatchOptions::default()).unwrap();
        assert_eq!(rule_names(&matched), vec!["rule-1"]);
    }

    #[test]
    fn test_strict_mode_keeps_clean_rules() {
        let rules = rules_table(&[("10.0.0.0/24", "bad"), ("10.0.0.0/24", "8.8.8.8")]);
        let matched = match_rules(&rules, None, &["10.0.0.1"], &STRICT).unwrap();
        assert_eq!(rule_names(&matched), vec!["rule-2"]);
    }

    #[test]
    fn test_passthrough_columns_preserved() {
        let rules = rules_table(&[("10.0.0.0/24", "8.8.8.8")]);
        let matched = match_rules(&rules, None, &["10.0.0.1"], &MatchOptions::default()).unwrap();
        assert_eq!(matched.rows[0], rules.rows[0]);
        assert_eq!(matched.columns, rules.columns);
        assert_eq!(matched.name, rules.name);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let rules = rules_table(&[("GroupA", "1.1.1.1"), ("junk", "10.0.0.1")]);
        let groups = address_groups(&[("GroupA", "10.0.0.0/8")]);
        let rules_before = rules.clone();
        let groups_before = groups.clone();

        let _ = match_rules(&rules, Some(&groups), &["10.0.0.1"], &MatchOptions::default());

        assert_eq!(rules, rules_before);
        assert_eq!(groups, groups_before);
    }
}

#[cfg(test)]
mod proptests {
    use crate::core::matcher::{MatchOptions, match_rules};
    use crate::core::test_helpers::{address_groups, rule_names, rules_table};
    use proptest::prelude::*;

    /// Address-ish tokens: valid hosts and networks in a small space so that
    /// overlaps actually happen, plus junk and group names.
    fn token() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u8..4, 0u8..4).prop_map(|(a, b)| format!("10.{a}.{b}.1")),
            (0u8..4, prop_oneof![Just(8u8), Just(16), Just(24)])
                .prop_map(|(a, p)| format!("10.{a}.0.0/{p}")),
            Just("any".to_string()),
            Just("G1".to_string()),
            Just("G2".to_string()),
            Just(String::new()),
        ]
    }

    fn field() -> impl Strategy<Value = String> {
        prop::collection::vec(token(), 0..4).prop_map(|t| t.join(", "))
    }

    fn rules() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec((field(), field()), 0..12)
    }

    fn subnets() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(token(), 0..4)
    }

    fn run(rules: &[(String, String)], subnets: &[String], strict: bool) -> crate::core::table::Table {
        let pairs: Vec<(&str, &str)> = rules
            .iter()
            .map(|(s, d)| (s.as_str(), d.as_str()))
            .collect();
        let groups = address_groups(&[("G1", "10.1.0.0/16, G2"), ("G2", "10.2.2.1")]);
        match_rules(
            &rules_table(&pairs),
            Some(&groups),
            subnets,
            &MatchOptions {
                strict_rule_skip: strict,
            },
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn test_matching_is_idempotent(r in rules(), s in subnets(), strict in any::<bool>()) {
            prop_assert_eq!(run(&r, &s, strict), run(&r, &s, strict));
        }

        #[test]
        fn test_output_is_ordered_subsequence(r in rules(), s in subnets(), strict in any::<bool>()) {
            let matched = run(&r, &s, strict);
            let positions: Vec<usize> = rule_names(&matched)
                .iter()
                .map(|n| n.trim_start_matches("rule-").parse::<usize>().unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(matched.len() <= r.len());
        }

        #[test]
        fn test_strict_result_is_subset_of_lenient(r in rules(), s in subnets()) {
            let strict = run(&r, &s, true);
            let lenient = run(&r, &s, false);
            for row in &strict.rows {
                prop_assert!(lenient.rows.contains(row));
            }
        }

        #[test]
        fn test_no_subnets_no_matches(r in rules(), strict in any::<bool>()) {
            prop_assert!(run(&r, &[], strict).is_empty());
        }
    }
}
