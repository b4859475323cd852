//! Scenario selection state machine
//!
//! A knob page has exactly one selection at a time: nothing, one scenario,
//! one metric, or (in compare mode) up to two scenarios in selection order.
//!
//! Global invariants enforced:
//! - Scenario, metric and compare selections are mutually exclusive
//! - Transitions are pure; the same state and event yield the same state
//! - Compare pairs keep selection order, and a third pick evicts the oldest
//! - Unknown ids resolve as no selection rather than failing

use crate::dataset::{KnobContent, Scenario};
use crate::metric::Metric;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Current selection of a knob page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Idle,
    ScenarioSelected {
        id: String,
    },
    MetricSelected {
        metric: Metric,
    },
    CompareIdle,
    CompareA {
        a: String,
    },
    #[serde(rename = "compare_ab")]
    CompareAB {
        a: String,
        b: String,
    },
}

/// A user interaction on a knob page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    SelectScenario(String),
    SelectMetric(Metric),
    EnterCompare,
    ExitCompare,
    ToggleCompare,
}

impl Selection {
    /// Apply one event, returning the next state
    pub fn apply(self, event: SelectionEvent) -> Selection {
        use Selection::*;
        use SelectionEvent::*;

        match (self, event) {
            (state, ToggleCompare) => {
                if state.is_compare() {
                    Idle
                } else {
                    CompareIdle
                }
            }
            (state, EnterCompare) if state.is_compare() => state,
            (_, EnterCompare) => CompareIdle,
            (state, ExitCompare) if state.is_compare() => Idle,
            (state, ExitCompare) => state,

            // Metric clicks are ignored while comparing
            (state, SelectMetric(_)) if state.is_compare() => state,
            (MetricSelected { metric: current }, SelectMetric(metric)) if current == metric => Idle,
            (_, SelectMetric(metric)) => MetricSelected { metric },

            (ScenarioSelected { id: current }, SelectScenario(id)) if current == id => Idle,
            (CompareIdle, SelectScenario(id)) => CompareA { a: id },
            (CompareA { a }, SelectScenario(id)) => {
                if a == id {
                    CompareIdle
                } else {
                    CompareAB { a, b: id }
                }
            }
            (CompareAB { a, b }, SelectScenario(id)) => {
                if id == a {
                    CompareA { a: b }
                } else if id == b {
                    CompareA { a }
                } else {
                    CompareAB { a: b, b: id }
                }
            }
            (_, SelectScenario(id)) => ScenarioSelected { id },
        }
    }

    /// Apply a sequence of events starting from this state
    pub fn replay<I>(self, events: I) -> Selection
    where
        I: IntoIterator<Item = SelectionEvent>,
    {
        events.into_iter().fold(self, Selection::apply)
    }

    fn step(&mut self, event: SelectionEvent) {
        *self = std::mem::take(self).apply(event);
    }

    pub fn select_scenario(&mut self, id: impl Into<String>) {
        self.step(SelectionEvent::SelectScenario(id.into()));
    }

    pub fn select_metric(&mut self, metric: Metric) {
        self.step(SelectionEvent::SelectMetric(metric));
    }

    pub fn enter_compare(&mut self) {
        self.step(SelectionEvent::EnterCompare);
    }

    pub fn exit_compare(&mut self) {
        self.step(SelectionEvent::ExitCompare);
    }

    pub fn toggle_compare(&mut self) {
        self.step(SelectionEvent::ToggleCompare);
    }

    pub fn is_compare(&self) -> bool {
        matches!(
            self,
            Selection::CompareIdle | Selection::CompareA { .. } | Selection::CompareAB { .. }
        )
    }

    /// The selected metric, if any
    pub fn metric(&self) -> Option<Metric> {
        match self {
            Selection::MetricSelected { metric } => Some(*metric),
            _ => None,
        }
    }

    /// Whether a scenario id is part of the current selection
    pub fn is_scenario_active(&self, id: &str) -> bool {
        match self {
            Selection::ScenarioSelected { id: current } | Selection::CompareA { a: current } => {
                current == id
            }
            Selection::CompareAB { a, b } => a == id || b == id,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Selection::Idle => "idle",
            Selection::ScenarioSelected { .. } => "scenario_selected",
            Selection::MetricSelected { .. } => "metric_selected",
            Selection::CompareIdle => "compare_idle",
            Selection::CompareA { .. } => "compare_a",
            Selection::CompareAB { .. } => "compare_ab",
        }
    }

    /// Look the selected ids up in a knob's content
    pub fn resolve<'a>(&self, content: &'a KnobContent) -> ResolvedSelection<'a> {
        let lookup = |id: &str| {
            let found = content.scenario(id);
            if found.is_none() {
                tracing::warn!(knob = %content.knob, id, "selected scenario not found");
            }
            found
        };

        match self {
            Selection::Idle => ResolvedSelection::None,
            Selection::MetricSelected { metric } => ResolvedSelection::Metric(*metric),
            Selection::ScenarioSelected { id } => lookup(id.as_str())
                .map(ResolvedSelection::Scenario)
                .unwrap_or(ResolvedSelection::None),
            Selection::CompareIdle => ResolvedSelection::Compare { a: None, b: None },
            Selection::CompareA { a } => ResolvedSelection::Compare {
                a: lookup(a.as_str()),
                b: None,
            },
            Selection::CompareAB { a, b } => match (lookup(a.as_str()), lookup(b.as_str())) {
                (None, b) => ResolvedSelection::Compare { a: b, b: None },
                (a, b) => ResolvedSelection::Compare { a, b },
            },
        }
    }
}

/// Selection with ids replaced by the scenarios they name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedSelection<'a> {
    None,
    Scenario(&'a Scenario),
    Metric(Metric),
    Compare {
        a: Option<&'a Scenario>,
        b: Option<&'a Scenario>,
    },
}

impl<'a> ResolvedSelection<'a> {
    /// Scenario driving the primary gauges
    pub fn primary(&self) -> Option<&'a Scenario> {
        match *self {
            ResolvedSelection::Scenario(s) => Some(s),
            ResolvedSelection::Compare { a, .. } => a,
            _ => None,
        }
    }

    /// Scenario driving the secondary gauges in compare mode
    pub fn secondary(&self) -> Option<&'a Scenario> {
        match *self {
            ResolvedSelection::Compare { b, .. } => b,
            _ => None,
        }
    }

    pub fn is_compare(&self) -> bool {
        matches!(self, ResolvedSelection::Compare { .. })
    }
}

impl FromStr for SelectionEvent {
    type Err = anyhow::Error;

    /// Parse an event token
    ///
    /// Tokens: `scenario:<id>`, `metric:<key>`, `compare`, `compare:on`,
    /// `compare:off`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("scenario", id)) if !id.is_empty() => {
                Ok(SelectionEvent::SelectScenario(id.to_string()))
            }
            Some(("metric", key)) => Ok(SelectionEvent::SelectMetric(key.parse()?)),
            Some(("compare", "on")) => Ok(SelectionEvent::EnterCompare),
            Some(("compare", "off")) => Ok(SelectionEvent::ExitCompare),
            None if s == "compare" => Ok(SelectionEvent::ToggleCompare),
            _ => anyhow::bail!(
                "invalid event '{}' (expected scenario:<id>, metric:<key>, compare, compare:on or compare:off)",
                s
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(id: &str) -> SelectionEvent {
        SelectionEvent::SelectScenario(id.to_string())
    }

    fn compare_ab(a: &str, b: &str) -> Selection {
        Selection::CompareAB {
            a: a.to_string(),
            b: b.to_string(),
        }
    }

    #[test]
    fn test_initial_state_is_idle() {
        assert_eq!(Selection::default(), Selection::Idle);
    }

    #[test]
    fn test_scenario_toggle_off() {
        let state = Selection::Idle.replay([scenario("x"), scenario("x")]);
        assert_eq!(state, Selection::Idle);
    }

    #[test]
    fn test_scenario_switch() {
        let state = Selection::Idle.replay([scenario("x"), scenario("y")]);
        assert_eq!(
            state,
            Selection::ScenarioSelected {
                id: "y".to_string()
            }
        );
    }

    #[test]
    fn test_metric_clears_scenario() {
        let state = Selection::Idle.replay([
            scenario("x"),
            SelectionEvent::SelectMetric(Metric::Quality),
        ]);
        assert_eq!(
            state,
            Selection::MetricSelected {
                metric: Metric::Quality
            }
        );
        assert!(!state.is_scenario_active("x"));
    }

    #[test]
    fn test_scenario_clears_metric() {
        let state = Selection::Idle.replay([
            SelectionEvent::SelectMetric(Metric::Access),
            scenario("x"),
        ]);
        assert_eq!(state.metric(), None);
        assert!(state.is_scenario_active("x"));
    }

    #[test]
    fn test_metric_toggle_off() {
        let state = Selection::Idle.replay([
            SelectionEvent::SelectMetric(Metric::Access),
            SelectionEvent::SelectMetric(Metric::Access),
        ]);
        assert_eq!(state, Selection::Idle);
    }

    #[test]
    fn test_enter_compare_clears_single_selection() {
        let mut state = Selection::ScenarioSelected {
            id: "x".to_string(),
        };
        state.enter_compare();
        assert_eq!(state, Selection::CompareIdle);

        let mut state = Selection::MetricSelected {
            metric: Metric::Quality,
        };
        state.enter_compare();
        assert_eq!(state, Selection::CompareIdle);
    }

    #[test]
    fn test_compare_deselect_single() {
        let state = Selection::CompareIdle.replay([scenario("x"), scenario("x")]);
        assert_eq!(state, Selection::CompareIdle);
    }

    #[test]
    fn test_compare_pair_in_selection_order() {
        let state = Selection::CompareIdle.replay([scenario("x"), scenario("y")]);
        assert_eq!(state, compare_ab("x", "y"));
    }

    #[test]
    fn test_compare_remove_first_keeps_second() {
        let state = compare_ab("x", "y").apply(scenario("x"));
        assert_eq!(
            state,
            Selection::CompareA {
                a: "y".to_string()
            }
        );
    }

    #[test]
    fn test_compare_remove_second_keeps_first() {
        let state = compare_ab("x", "y").apply(scenario("y"));
        assert_eq!(
            state,
            Selection::CompareA {
                a: "x".to_string()
            }
        );
    }

    #[test]
    fn test_compare_third_evicts_oldest() {
        let state = compare_ab("x", "y").apply(scenario("z"));
        assert_eq!(state, compare_ab("y", "z"));
    }

    #[test]
    fn test_eviction_follows_selection_order_not_position() {
        // Removing x and picking it again makes y the oldest member
        let state = Selection::CompareIdle.replay([
            scenario("x"),
            scenario("y"),
            scenario("x"),
            scenario("x"),
        ]);
        assert_eq!(state, compare_ab("y", "x"));
        assert_eq!(state.apply(scenario("z")), compare_ab("x", "z"));
    }

    #[test]
    fn test_exit_compare_from_any_compare_state() {
        for state in [
            Selection::CompareIdle,
            Selection::CompareA {
                a: "x".to_string(),
            },
            compare_ab("x", "y"),
        ] {
            assert_eq!(state.apply(SelectionEvent::ExitCompare), Selection::Idle);
        }
    }

    #[test]
    fn test_in_place_metric_and_exit() {
        let mut state = Selection::Idle;
        state.select_metric(Metric::Access);
        assert_eq!(state.metric(), Some(Metric::Access));
        state.select_metric(Metric::Access);
        assert_eq!(state, Selection::Idle);

        state.enter_compare();
        state.select_scenario("x");
        state.select_metric(Metric::Quality);
        assert_eq!(
            state,
            Selection::CompareA {
                a: "x".to_string()
            }
        );
        state.exit_compare();
        assert_eq!(state, Selection::Idle);
        state.exit_compare();
        assert_eq!(state, Selection::Idle);
    }

    #[test]
    fn test_compare_events_outside_compare() {
        let state = Selection::ScenarioSelected {
            id: "x".to_string(),
        };
        assert_eq!(state.clone().apply(SelectionEvent::ExitCompare), state);

        let inside = compare_ab("x", "y");
        assert_eq!(inside.clone().apply(SelectionEvent::EnterCompare), inside);
    }

    #[test]
    fn test_toggle_compare() {
        let mut state = Selection::Idle;
        state.toggle_compare();
        assert_eq!(state, Selection::CompareIdle);
        state.select_scenario("x");
        state.toggle_compare();
        assert_eq!(state, Selection::Idle);
    }

    #[test]
    fn test_metric_ignored_in_compare() {
        let state = compare_ab("x", "y");
        assert_eq!(
            state.clone().apply(SelectionEvent::SelectMetric(Metric::Access)),
            state
        );
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(
            "scenario:general_tax".parse::<SelectionEvent>().unwrap(),
            scenario("general_tax")
        );
        assert_eq!(
            "metric:health_status".parse::<SelectionEvent>().unwrap(),
            SelectionEvent::SelectMetric(Metric::HealthStatus)
        );
        assert_eq!(
            "compare".parse::<SelectionEvent>().unwrap(),
            SelectionEvent::ToggleCompare
        );
        assert_eq!(
            "compare:on".parse::<SelectionEvent>().unwrap(),
            SelectionEvent::EnterCompare
        );
        assert_eq!(
            "compare:off".parse::<SelectionEvent>().unwrap(),
            SelectionEvent::ExitCompare
        );
        assert!("scenario:".parse::<SelectionEvent>().is_err());
        assert!("metric:wellbeing".parse::<SelectionEvent>().is_err());
        assert!("click".parse::<SelectionEvent>().is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(compare_ab("x", "y")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "compare_ab", "a": "x", "b": "y"})
        );
    }
}
