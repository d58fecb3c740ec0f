//! Property tests for phrase rotation and day navigation.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use daily_phrase::phrases::{
    day_of_year, ExplanationCache, FixedClock, Lang, PhraseCatalog, PhraseResolver, PhraseStore,
};
use daily_phrase::screen::{NavigationCommand, PhraseNavigator};

mod common;

fn resolver(len: usize, today: NaiveDate) -> PhraseResolver {
    let records = (0..len).map(|i| common::record(&format!("P{i}"))).collect();
    let store = PhraseStore::new(PhraseCatalog::new(records).unwrap(), ExplanationCache::default());
    PhraseResolver::new(Arc::new(store), Arc::new(FixedClock::new(today)))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2100, 1u32..=366).prop_filter_map("ordinal past year end", |(year, ordinal)| {
        NaiveDate::from_yo_opt(year, ordinal)
    })
}

fn arb_command() -> impl Strategy<Value = NavigationCommand> {
    prop_oneof![
        Just(NavigationCommand::Previous),
        Just(NavigationCommand::Next),
        Just(NavigationCommand::Today),
    ]
}

proptest! {
    #[test]
    fn day_of_year_is_in_range(date in arb_date()) {
        let day = day_of_year(date);
        prop_assert!((1..=366).contains(&day));
        prop_assert_eq!(day, date.ordinal());
    }

    #[test]
    fn phrase_follows_day_of_year_modulo(len in 1usize..20, date in arb_date()) {
        let resolver = resolver(len, date);
        let expected = format!("P{}", day_of_year(date) as usize % len);
        prop_assert_eq!(resolver.resolve_phrase(date).unwrap().phrase, expected);
    }

    #[test]
    fn equal_residues_resolve_to_same_phrase(len in 1usize..20, a in arb_date(), b in arb_date()) {
        let resolver = resolver(len, a);
        if day_of_year(a) as usize % len == day_of_year(b) as usize % len {
            prop_assert_eq!(
                resolver.resolve_phrase(a).unwrap().phrase,
                resolver.resolve_phrase(b).unwrap().phrase
            );
        }
    }

    #[test]
    fn resolution_is_idempotent(len in 1usize..20, date in arb_date()) {
        let resolver = resolver(len, date);
        prop_assert_eq!(resolver.resolve_phrase(date).unwrap(), resolver.resolve_phrase(date).unwrap());
        prop_assert_eq!(resolver.resolve_for_offset(0).unwrap(), resolver.resolve_phrase(date).unwrap());
    }

    #[test]
    fn offset_never_goes_positive(
        today in arb_date(),
        commands in proptest::collection::vec(arb_command(), 0..60),
    ) {
        let mut nav = PhraseNavigator::new(resolver(7, today), Lang::En).unwrap();
        for command in commands {
            let before = nav.view();
            nav.navigate(command).unwrap();
            prop_assert!(nav.offset_days() <= 0);
            if command == NavigationCommand::Next && before.offset_days == 0 {
                prop_assert_eq!(nav.view(), before);
            }
        }
    }
}
