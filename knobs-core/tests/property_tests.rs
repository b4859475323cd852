//! Property tests for level parsing, gauge geometry and selection transitions

use knobs_core::gauge::SEGMENT_COUNT;
use knobs_core::{compute_indicator, parse_effect_level, parse_risk_level, Metric};
use knobs_core::{Selection, SelectionEvent};
use proptest::prelude::*;

fn event_strategy() -> impl Strategy<Value = SelectionEvent> {
    prop_oneof![
        "[a-d]".prop_map(SelectionEvent::SelectScenario),
        (0..Metric::ALL.len()).prop_map(|i| SelectionEvent::SelectMetric(Metric::ALL[i])),
        Just(SelectionEvent::EnterCompare),
        Just(SelectionEvent::ExitCompare),
        Just(SelectionEvent::ToggleCompare),
    ]
}

proptest! {
    #[test]
    fn effect_level_always_on_scale(text in ".*") {
        let level = parse_effect_level(Some(text.as_str()));
        prop_assert!((0..=4).contains(&level));
    }

    #[test]
    fn risk_level_always_on_scale(text in ".*") {
        let level = parse_risk_level(Some(text.as_str()));
        prop_assert!([0, -2, -3].contains(&level));
    }

    #[test]
    fn indicator_always_in_bounds(effect in -100i32..100, risk in -100i32..100) {
        let ind = compute_indicator(effect, risk);
        prop_assert!((-4..=4).contains(&ind.clamped_net));
        prop_assert!(ind.fill_percent >= 10.0 && ind.fill_percent <= 90.0);
        prop_assert!(ind.filled_segments >= 2 && ind.filled_segments <= SEGMENT_COUNT - 2);
        prop_assert_eq!(
            ind.indicator_percent,
            ind.filled_segments as f64 * 100.0 / SEGMENT_COUNT as f64
        );
    }

    #[test]
    fn indicator_monotonic_in_effect(effect in 0i32..4, risk in prop_oneof![Just(0), Just(-2), Just(-3)]) {
        let lower = compute_indicator(effect, risk);
        let higher = compute_indicator(effect + 1, risk);
        prop_assert!(higher.filled_segments >= lower.filled_segments);
    }

    #[test]
    fn fill_monotonic_in_net(
        e1 in 0i32..=4,
        r1 in prop_oneof![Just(0), Just(-2), Just(-3)],
        e2 in 0i32..=4,
        r2 in prop_oneof![Just(0), Just(-2), Just(-3)],
    ) {
        let (lo, hi) = if e1 + r1 <= e2 + r2 {
            (compute_indicator(e1, r1), compute_indicator(e2, r2))
        } else {
            (compute_indicator(e2, r2), compute_indicator(e1, r1))
        };
        prop_assert!(lo.fill_percent <= hi.fill_percent);
        prop_assert!(lo.filled_segments <= hi.filled_segments);
    }

    #[test]
    fn same_scenario_twice_toggles_off(id in "\\PC{1,16}") {
        let state = Selection::Idle
            .apply(SelectionEvent::SelectScenario(id.clone()))
            .apply(SelectionEvent::SelectScenario(id.clone()));
        prop_assert_eq!(state, Selection::Idle);

        let state = Selection::CompareA { a: id.clone() }
            .apply(SelectionEvent::SelectScenario(id));
        prop_assert_eq!(state, Selection::CompareIdle);
    }

    #[test]
    fn double_toggle_keeps_mode_and_clears(events in prop::collection::vec(event_strategy(), 0..20)) {
        let state = Selection::Idle.replay(events);
        let was_compare = state.is_compare();
        let toggled = state
            .apply(SelectionEvent::ToggleCompare)
            .apply(SelectionEvent::ToggleCompare);
        prop_assert_eq!(toggled.is_compare(), was_compare);
        let expected = if was_compare { Selection::CompareIdle } else { Selection::Idle };
        prop_assert_eq!(toggled, expected);
    }

    #[test]
    fn third_pick_evicts_oldest(x in "[a-z]{1,4}", y in "[a-z]{1,4}", z in "[a-z]{1,4}") {
        prop_assume!(x != y && y != z && x != z);
        let state = Selection::CompareAB { a: x, b: y.clone() }
            .apply(SelectionEvent::SelectScenario(z.clone()));
        prop_assert_eq!(state, Selection::CompareAB { a: y, b: z });
    }

    #[test]
    fn compare_slots_are_distinct(events in prop::collection::vec(event_strategy(), 0..30)) {
        let state = Selection::Idle.replay(events);
        if let Selection::CompareAB { a, b } = state {
            prop_assert_ne!(a, b);
        }
    }

    #[test]
    fn metric_ignored_while_comparing(events in prop::collection::vec(event_strategy(), 0..20), idx in 0..6usize) {
        let state = Selection::CompareIdle.replay(events);
        if !state.is_compare() {
            return Ok(());
        }
        let next = state.clone().apply(SelectionEvent::SelectMetric(Metric::ALL[idx]));
        prop_assert_eq!(next, state);
    }
}
