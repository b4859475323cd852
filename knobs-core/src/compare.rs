//! Side-by-side scenario comparison
//!
//! Computes deterministic per-metric differences between two scenarios.
//!
//! Global invariants enforced:
//! - Keys are the ordered union of both scenarios (A's order, then B's new keys)
//! - A key missing from one scenario counts as level 0 for that scenario
//! - Only intended effects carry a divergence flag; risks are listed as-is

use crate::dataset::Scenario;
use crate::scale::{parse_effect_level, RiskSeverity};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Minimum effect level difference that marks a metric as divergent
pub const DEFAULT_DIVERGENCE_THRESHOLD: u32 = 2;

/// Effect comparison for one metric key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EffectRow {
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    pub level_a: i32,
    pub level_b: i32,
    pub diff: u32,
    pub divergent: bool,
}

/// Risk listing for one metric key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskRow {
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    pub severity_a: RiskSeverity,
    pub severity_b: RiskSeverity,
}

/// Complete comparison between two scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioComparison {
    pub a_id: String,
    pub b_id: String,
    pub a_name: String,
    pub b_name: String,
    pub threshold: u32,
    pub effects: Vec<EffectRow>,
    pub risks: Vec<RiskRow>,
}

impl ScenarioComparison {
    pub fn divergent_count(&self) -> usize {
        self.effects.iter().filter(|r| r.divergent).count()
    }

    /// Metric keys flagged as divergent, in row order
    pub fn divergent_metrics(&self) -> Vec<&str> {
        self.effects
            .iter()
            .filter(|r| r.divergent)
            .map(|r| r.metric.as_str())
            .collect()
    }
}

/// Compare two scenarios with the default divergence threshold
pub fn compare_scenarios(a: &Scenario, b: &Scenario) -> ScenarioComparison {
    compare_scenarios_with_threshold(a, b, DEFAULT_DIVERGENCE_THRESHOLD)
}

/// Compare two scenarios with a custom divergence threshold
pub fn compare_scenarios_with_threshold(
    a: &Scenario,
    b: &Scenario,
    threshold: u32,
) -> ScenarioComparison {
    let effects = union_keys(&a.intended_effects, &b.intended_effects)
        .into_iter()
        .map(|key| {
            let text_a = a.intended_effects.get(key);
            let text_b = b.intended_effects.get(key);
            let level_a = parse_effect_level(text_a.map(String::as_str));
            let level_b = parse_effect_level(text_b.map(String::as_str));
            let diff = level_a.abs_diff(level_b);
            EffectRow {
                metric: key.to_string(),
                a: text_a.cloned(),
                b: text_b.cloned(),
                level_a,
                level_b,
                diff,
                divergent: diff >= threshold,
            }
        })
        .collect();

    let risks = union_keys(&a.systemic_risks, &b.systemic_risks)
        .into_iter()
        .map(|key| {
            let text_a = a.systemic_risks.get(key);
            let text_b = b.systemic_risks.get(key);
            RiskRow {
                metric: key.to_string(),
                a: text_a.cloned(),
                b: text_b.cloned(),
                severity_a: RiskSeverity::classify(text_a.map(String::as_str)),
                severity_b: RiskSeverity::classify(text_b.map(String::as_str)),
            }
        })
        .collect();

    ScenarioComparison {
        a_id: a.id.clone(),
        b_id: b.id.clone(),
        a_name: a.name.clone(),
        b_name: b.name.clone(),
        threshold,
        effects,
        risks,
    }
}

/// Ordered union of two maps' keys: `a` in order, then keys only in `b`
fn union_keys<'m>(
    a: &'m IndexMap<String, String>,
    b: &'m IndexMap<String, String>,
) -> IndexSet<&'m str> {
    a.keys().chain(b.keys()).map(String::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(id: &str, effects: &[(&str, &str)], risks: &[(&str, &str)]) -> Scenario {
        Scenario {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            intended_effects: effects
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            systemic_risks: risks
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            literature_ids: Vec::new(),
            extra: IndexMap::new(),
        }
    }

    #[test]
    fn test_small_difference_not_divergent() {
        let a = scenario("a", &[("efficiency", "High gains")], &[]);
        let b = scenario("b", &[("efficiency", "Very High gains")], &[]);
        let cmp = compare_scenarios(&a, &b);
        assert_eq!(cmp.effects.len(), 1);
        assert_eq!(cmp.effects[0].diff, 1);
        assert!(!cmp.effects[0].divergent);
    }

    #[test]
    fn test_large_difference_divergent() {
        let a = scenario("a", &[("efficiency", "Medium gains")], &[]);
        let b = scenario("b", &[("efficiency", "Very High gains")], &[]);
        let cmp = compare_scenarios(&a, &b);
        assert_eq!(cmp.effects[0].diff, 3);
        assert!(cmp.effects[0].divergent);
        assert_eq!(cmp.divergent_metrics(), vec!["efficiency"]);
    }

    #[test]
    fn test_key_union_order() {
        let a = scenario("a", &[("x", "High"), ("y", "High")], &[]);
        let b = scenario("b", &[("y", "High"), ("z", "High")], &[]);
        let cmp = compare_scenarios(&a, &b);
        let keys: Vec<&str> = cmp.effects.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(keys, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_missing_key_counts_as_zero() {
        let a = scenario("a", &[("access", "High access")], &[]);
        let b = scenario("b", &[], &[]);
        let cmp = compare_scenarios(&a, &b);
        let row = &cmp.effects[0];
        assert_eq!(row.level_b, 0);
        assert!(row.b.is_none());
        assert_eq!(row.diff, 3);
        assert!(row.divergent);
    }

    #[test]
    fn test_risks_have_no_divergence() {
        let a = scenario("a", &[], &[("quality", "Critical Warning: x")]);
        let b = scenario("b", &[], &[("access", "Warning: y")]);
        let cmp = compare_scenarios(&a, &b);
        assert_eq!(cmp.risks.len(), 2);
        assert_eq!(cmp.risks[0].metric, "quality");
        assert_eq!(cmp.risks[0].severity_a, RiskSeverity::Critical);
        assert_eq!(cmp.risks[0].severity_b, RiskSeverity::None);
        assert_eq!(cmp.risks[1].metric, "access");
        assert_eq!(cmp.divergent_count(), 0);
    }

    #[test]
    fn test_custom_threshold() {
        let a = scenario("a", &[("efficiency", "High gains")], &[]);
        let b = scenario("b", &[("efficiency", "Very High gains")], &[]);
        let cmp = compare_scenarios_with_threshold(&a, &b, 1);
        assert!(cmp.effects[0].divergent);
        assert_eq!(cmp.threshold, 1);
    }

    #[test]
    fn test_symmetric_diff() {
        let a = scenario("a", &[("efficiency", "Medium")], &[]);
        let b = scenario("b", &[("efficiency", "Very High")], &[]);
        assert_eq!(
            compare_scenarios(&a, &b).effects[0].diff,
            compare_scenarios(&b, &a).effects[0].diff
        );
    }
}
