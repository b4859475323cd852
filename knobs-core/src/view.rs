//! Page view models
//!
//! Composes content, selection, gauges and comparison into the data a page
//! renders. Rendering itself lives in `report` and `html`.
//!
//! Global invariants enforced:
//! - Views are pure functions of content, literature, selection and config
//! - Gauges are listed in fixed metric order
//! - Output ordering follows content authoring order

use crate::compare::{compare_scenarios_with_threshold, ScenarioComparison};
use crate::config::ResolvedConfig;
use crate::dataset::{papers_for_knob, papers_for_scenario, KnobContent, LiteraturePaper, Scenario};
use crate::gauge::Gauge;
use crate::knob::{Knob, KnobColor};
use crate::metric::{Metric, MetricTier};
use crate::scale::{format_metric_name, strip_warning_prefix, RiskSeverity};
use crate::selection::{ResolvedSelection, Selection};
use serde::{Deserialize, Serialize};

/// Overview panel text shown when no metric is selected
const OVERVIEW_TITLE: &str = "The Control Knobs Framework";
const OVERVIEW_DESCRIPTION: &str = "Health systems can be understood through five policy \
control knobs that governments and institutions adjust to shape system performance. Based on \
the \u{201c}Getting Health Reform Right\u{201d} framework by Roberts, Hsiao, Berman, and Reich, \
each knob represents a major lever of health policy (financing, payment, organization, \
regulation, and persuasion & behavior) whose configuration drives measurable changes in \
intermediate performance and ultimate population health goals.";
const OVERVIEW_DISCLAIMER: &str = "The outcome ratings shown on each knob page are informed \
by empirical literature but are not deterministic predictions. The influence of any policy \
change is context-specific and both implementation- and path-dependent.";

/// Title and body of the description panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub title: String,
    pub description: String,
}

/// Gauges of one metric (B is present only when comparing two scenarios)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GaugeRow {
    pub metric: Metric,
    pub label: String,
    pub tier: MetricTier,
    pub selected: bool,
    pub gauge: Gauge,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge_b: Option<Gauge>,
}

/// One intended effect in the detail panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDetail {
    pub metric: String,
    pub text: String,
}

/// One systemic risk in the detail panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDetail {
    pub metric: String,
    pub text: String,
    pub severity: RiskSeverity,
}

/// Effects and risks of the single selected scenario
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScenarioDetails {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectDetail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub risks: Vec<RiskDetail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub literature: Vec<String>,
}

impl ScenarioDetails {
    fn build(scenario: &Scenario, literature: &[LiteraturePaper]) -> Self {
        ScenarioDetails {
            effects: scenario
                .intended_effects
                .iter()
                .map(|(key, text)| EffectDetail {
                    metric: format_metric_name(key),
                    text: text.clone(),
                })
                .collect(),
            risks: scenario
                .systemic_risks
                .iter()
                .map(|(key, text)| RiskDetail {
                    metric: format_metric_name(key),
                    text: strip_warning_prefix(text).to_string(),
                    severity: RiskSeverity::classify(Some(text)),
                })
                .collect(),
            literature: papers_for_scenario(literature, scenario)
                .into_iter()
                .map(|p| p.title.clone())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.risks.is_empty() && self.literature.is_empty()
    }
}

/// A scenario button in a section grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioCard {
    pub id: String,
    pub name: String,
    pub active: bool,
    /// Slot label in compare mode ("A" or "B")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

/// A section grid of scenario cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionView {
    pub title: String,
    pub columns: u8,
    pub scenarios: Vec<ScenarioCard>,
}

/// A literature reference rendered in the evidence section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EvidenceEntry {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub year: i32,
    pub journal: String,
    pub country: String,
    pub methodology: String,
    pub finding: String,
    pub url: String,
}

impl From<&LiteraturePaper> for EvidenceEntry {
    fn from(paper: &LiteraturePaper) -> Self {
        EvidenceEntry {
            id: paper.id.clone(),
            title: paper.title.clone(),
            authors: paper.authors.clone(),
            year: paper.year,
            journal: paper.journal.clone(),
            country: paper.country.clone(),
            methodology: paper.methodology.clone(),
            finding: paper.finding.clone(),
            url: paper.scholar_url(),
        }
    }
}

/// Everything a knob page shows for one selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KnobView {
    pub knob: Knob,
    pub label: String,
    pub color: KnobColor,
    pub selection: Selection,
    pub panel: Panel,
    pub gauges: Vec<GaugeRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ScenarioDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ScenarioComparison>,
    /// Names of the compared scenarios ("A", "B" slots)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub compare_labels: Vec<String>,
    pub sections: Vec<SectionView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<EvidenceEntry>,
}

impl KnobView {
    /// Build the view of a knob page for the given selection
    pub fn build(
        content: &KnobContent,
        literature: &[LiteraturePaper],
        selection: &Selection,
        config: &ResolvedConfig,
    ) -> Self {
        let knob = content.knob;
        let resolved = selection.resolve(content);
        let active_metric = selection.metric();

        let panel = match resolved {
            ResolvedSelection::Metric(metric) => Panel {
                title: metric.label().to_string(),
                description: metric.description().to_string(),
            },
            ResolvedSelection::Scenario(scenario) => Panel {
                title: scenario.name.clone(),
                description: scenario.description.clone(),
            },
            _ => Panel {
                title: knob.default_title().to_string(),
                description: content.description.clone(),
            },
        };

        let primary = resolved.primary();
        let secondary = resolved.secondary();
        let gauges = Metric::ALL
            .into_iter()
            .map(|metric| GaugeRow {
                metric,
                label: metric.label().to_string(),
                tier: metric.tier(),
                selected: active_metric == Some(metric),
                gauge: gauge_for(primary, metric),
                gauge_b: secondary.map(|s| gauge_for(Some(s), metric)),
            })
            .collect();

        let details = match resolved {
            ResolvedSelection::Scenario(scenario) => {
                let details = ScenarioDetails::build(scenario, literature);
                (!details.is_empty()).then_some(details)
            }
            _ => None,
        };

        let comparison = match (primary, secondary) {
            (Some(a), Some(b)) => Some(compare_scenarios_with_threshold(
                a,
                b,
                config.divergence_threshold,
            )),
            _ => None,
        };

        let compare_labels = if resolved.is_compare() {
            [primary, secondary]
                .into_iter()
                .flatten()
                .map(|s| s.name.clone())
                .collect()
        } else {
            Vec::new()
        };

        let sections = content
            .sections
            .iter()
            .map(|section| SectionView {
                title: section.title.clone(),
                columns: section.columns,
                scenarios: section
                    .scenarios
                    .iter()
                    .map(|scenario| ScenarioCard {
                        id: scenario.id.clone(),
                        name: scenario.name.clone(),
                        active: selection.is_scenario_active(&scenario.id),
                        slot: compare_slot(primary, secondary, scenario),
                        extra: section
                            .extra_fields
                            .iter()
                            .filter_map(|field| {
                                scenario
                                    .extra_field(field)
                                    .map(|v| format!("{}: {}", format_metric_name(field), v))
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let evidence = if config.show_literature {
            papers_for_knob(literature, knob)
                .into_iter()
                .map(EvidenceEntry::from)
                .collect()
        } else {
            Vec::new()
        };

        KnobView {
            knob,
            label: knob.label().to_string(),
            color: knob.color(),
            selection: selection.clone(),
            panel,
            gauges,
            details,
            comparison,
            compare_labels,
            sections,
            evidence,
        }
    }

    /// Gauge rows of one tier
    pub fn gauges_of(&self, tier: MetricTier) -> impl Iterator<Item = &GaugeRow> {
        self.gauges.iter().filter(move |g| g.tier == tier)
    }
}

fn gauge_for(scenario: Option<&Scenario>, metric: Metric) -> Gauge {
    match scenario {
        Some(s) => Gauge::from_texts(s.effect(metric), s.risk(metric)),
        None => Gauge::inactive(),
    }
}

fn compare_slot(
    primary: Option<&Scenario>,
    secondary: Option<&Scenario>,
    scenario: &Scenario,
) -> Option<String> {
    if secondary.is_none() {
        return None;
    }
    if primary.is_some_and(|p| p.id == scenario.id) {
        Some("A".to_string())
    } else if secondary.is_some_and(|s| s.id == scenario.id) {
        Some("B".to_string())
    } else {
        None
    }
}

/// A knob tile on the overview diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnobTile {
    pub knob: Knob,
    pub label: String,
    pub color: KnobColor,
    pub scenario_count: usize,
}

/// The landing page: the knob diagram and the metric panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OverviewView {
    pub knobs: Vec<KnobTile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_metric: Option<Metric>,
    pub panel: Panel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    pub gauges: Vec<GaugeRow>,
}

impl OverviewView {
    /// Build the overview
    ///
    /// Only metric selection applies on the overview; any other selection
    /// renders the default panel.
    pub fn build(contents: &[KnobContent], selection: &Selection, config: &ResolvedConfig) -> Self {
        let knobs = config
            .visible_knobs()
            .into_iter()
            .map(|knob| KnobTile {
                knob,
                label: knob.label().to_string(),
                color: knob.color(),
                scenario_count: contents
                    .iter()
                    .find(|c| c.knob == knob)
                    .map(|c| c.scenarios().count())
                    .unwrap_or(0),
            })
            .collect();

        let selected_metric = selection.metric();
        let (panel, disclaimer) = match selected_metric {
            Some(metric) => (
                Panel {
                    title: metric.label().to_string(),
                    description: metric.description().to_string(),
                },
                None,
            ),
            None => (
                Panel {
                    title: OVERVIEW_TITLE.to_string(),
                    description: OVERVIEW_DESCRIPTION.to_string(),
                },
                Some(OVERVIEW_DISCLAIMER.to_string()),
            ),
        };

        let gauges = Metric::ALL
            .into_iter()
            .map(|metric| GaugeRow {
                metric,
                label: metric.label().to_string(),
                tier: metric.tier(),
                selected: selected_metric == Some(metric),
                gauge: Gauge::inactive(),
                gauge_b: None,
            })
            .collect();

        OverviewView {
            knobs,
            selected_metric,
            panel,
            disclaimer,
            gauges,
        }
    }
}
