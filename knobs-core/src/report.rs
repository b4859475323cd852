//! Text and JSON rendering of page views
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs
//! - Inactive gauges never render a fill

use crate::compare::ScenarioComparison;
use crate::gauge::{Gauge, SEGMENT_COUNT};
use crate::metric::MetricTier;
use crate::scale::{format_metric_name, EffectLevel, RiskLevel};
use crate::view::{GaugeRow, KnobView, OverviewView};
use serde::Serialize;

const LABEL_WIDTH: usize = 24;
const TEXT_WIDTH: usize = 28;

/// Render a knob page as text output
pub fn render_text(view: &KnobView) -> String {
    let mut output = String::new();

    output.push_str(&format!("== {} ==\n", view.label));
    output.push_str(&format!("Selection: {}\n", view.selection.as_str()));
    if !view.compare_labels.is_empty() {
        let slots: Vec<String> = ["A", "B"]
            .iter()
            .zip(&view.compare_labels)
            .map(|(slot, name)| format!("{} = {}", slot, name))
            .collect();
        output.push_str(&format!("Comparing: {}\n", slots.join(", ")));
    }
    output.push('\n');
    output.push_str(&format!("{}\n{}\n", view.panel.title, view.panel.description));

    for tier in [MetricTier::Intermediate, MetricTier::Goal] {
        output.push('\n');
        output.push_str(&format!("{}\n", tier.title()));
        for row in view.gauges_of(tier) {
            output.push_str(&render_gauge_row(row));
        }
    }

    if let Some(ref details) = view.details {
        if !details.effects.is_empty() {
            output.push_str("\nIntended Effects\n");
            for effect in &details.effects {
                output.push_str(&format!("  {}: {}\n", effect.metric, effect.text));
            }
        }
        if !details.risks.is_empty() {
            output.push_str("\nSystemic Risks\n");
            for risk in &details.risks {
                output.push_str(&format!(
                    "  [{}] {}: {}\n",
                    risk.severity.as_str(),
                    risk.metric,
                    risk.text
                ));
            }
        }
        if !details.literature.is_empty() {
            output.push_str("\nSupporting Literature\n");
            for title in &details.literature {
                output.push_str(&format!("  - {}\n", title));
            }
        }
    }

    if let Some(ref comparison) = view.comparison {
        output.push('\n');
        output.push_str(&render_comparison_text(comparison));
    }

    for section in &view.sections {
        output.push('\n');
        output.push_str(&format!("{}\n", section.title));
        if section.scenarios.is_empty() {
            output.push_str("  (no scenarios)\n");
        }
        for card in &section.scenarios {
            let mark = if card.active { "x" } else { " " };
            let slot = card
                .slot
                .as_deref()
                .map(|s| format!(" ({})", s))
                .unwrap_or_default();
            output.push_str(&format!("  [{}] {}{}\n", mark, card.name, slot));
            for extra in &card.extra {
                output.push_str(&format!("      {}\n", extra));
            }
        }
    }

    if !view.evidence.is_empty() {
        output.push_str("\nEmpirical Evidence\n");
        for entry in &view.evidence {
            output.push_str(&format!(
                "  {} {} ({}). {}\n",
                entry.year, entry.authors, entry.country, entry.title
            ));
            if !entry.finding.is_empty() {
                output.push_str(&format!("       {}\n", entry.finding));
            }
        }
    }

    output
}

/// Render the comparison table of two scenarios
pub fn render_comparison_text(comparison: &ScenarioComparison) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Comparison: {} vs {}\n",
        comparison.a_name, comparison.b_name
    ));
    output.push_str(&format!(
        "  {:<width$} {:>3} {:>3} {:>4}\n",
        "METRIC",
        "A",
        "B",
        "DIFF",
        width = LABEL_WIDTH
    ));
    for row in &comparison.effects {
        output.push_str(&format!(
            "  {} {:>3} {:>3} {:>4}{}\n",
            truncate_or_pad(&format_metric_name(&row.metric), LABEL_WIDTH),
            row.level_a,
            row.level_b,
            row.diff,
            if row.divergent { "  *" } else { "" }
        ));
    }
    for row in &comparison.risks {
        output.push_str(&format!(
            "  {} risk: A {} / B {}\n",
            truncate_or_pad(&format_metric_name(&row.metric), LABEL_WIDTH),
            row.severity_a.as_str(),
            row.severity_b.as_str()
        ));
    }
    output.push_str(&format!(
        "Divergent metrics: {} (threshold {})\n",
        comparison.divergent_count(),
        comparison.threshold
    ));

    output
}

/// Render the overview page as text output
pub fn render_overview_text(view: &OverviewView) -> String {
    let mut output = String::new();

    output.push_str("Control Knobs\n");
    for tile in &view.knobs {
        output.push_str(&format!(
            "  {:<14} {:>2} scenarios\n",
            tile.label, tile.scenario_count
        ));
    }
    output.push('\n');
    output.push_str(&format!("{}\n{}\n", view.panel.title, view.panel.description));
    if let Some(ref disclaimer) = view.disclaimer {
        output.push_str(&format!("\nNote: {}\n", disclaimer));
    }

    for tier in [MetricTier::Intermediate, MetricTier::Goal] {
        output.push('\n');
        output.push_str(&format!("{}\n", tier.title()));
        for row in view.gauges.iter().filter(|g| g.tier == tier) {
            let marker = if row.selected { ">" } else { " " };
            output.push_str(&format!("{} {}\n", marker, row.label));
        }
    }

    output
}

/// Render a single gauge as a one-line summary
pub fn render_gauge_text(gauge: &Gauge) -> String {
    let ind = &gauge.indicator;
    format!(
        "{} net={:+} clamped={:+} fill={:.1}% segments={}/{} tone={} ({} effect, {} risk)\n",
        gauge_bar(gauge),
        ind.net,
        ind.clamped_net,
        ind.fill_percent,
        ind.filled_segments,
        SEGMENT_COUNT,
        gauge.tone.as_str(),
        EffectLevel::parse(gauge.effect.as_deref()).label(),
        RiskLevel::parse(gauge.risk.as_deref()).severity().as_str()
    )
}

/// Render any view as JSON output
pub fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn render_gauge_row(row: &GaugeRow) -> String {
    let marker = if row.selected { ">" } else { " " };
    let mut line = format!(
        "{} {} [{}]",
        marker,
        truncate_or_pad(&row.label, LABEL_WIDTH),
        gauge_bar(&row.gauge)
    );
    if let Some(ref b) = row.gauge_b {
        line.push_str(&format!(" [{}]", gauge_bar(b)));
    }
    if row.gauge.active {
        line.push_str(&format!(" {:+}", row.gauge.indicator.net));
        if let Some(ref effect) = row.gauge.effect {
            line.push_str(&format!("  {}", truncate_or_pad(effect, TEXT_WIDTH).trim_end()));
        }
        if row.gauge.has_warning() {
            line.push_str("  !");
        }
    }
    line.push('\n');
    line
}

/// Twenty-character bar: `#` filled, `.` empty, `-` when inactive
fn gauge_bar(gauge: &Gauge) -> String {
    if !gauge.active {
        return "-".repeat(SEGMENT_COUNT as usize);
    }
    gauge
        .segments()
        .map(|filled| if filled { '#' } else { '.' })
        .collect()
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolvedConfig;
    use crate::dataset::KnobContent;
    use crate::knob::Knob;
    use crate::selection::Selection;

    const DOC: &str = r#"{
        "description": "Who delivers care.",
        "delivery_structure_scenarios": [
            {
                "id": "public",
                "name": "Public Delivery",
                "description": "Government-run facilities.",
                "intended_effects": { "access": "High access" },
                "systemic_risks": { "efficiency": "Warning: Low productivity" }
            },
            {
                "id": "private",
                "name": "Private Delivery",
                "description": "Market providers.",
                "intended_effects": { "access": "Medium access", "efficiency": "Very High output" }
            }
        ],
        "facility_governance_scenarios": []
    }"#;

    fn view(selection: Selection) -> KnobView {
        let content = KnobContent::from_json(Knob::Organization, DOC).unwrap();
        KnobView::build(&content, &[], &selection, &ResolvedConfig::defaults().unwrap())
    }

    #[test]
    fn test_gauge_bar() {
        assert_eq!(gauge_bar(&Gauge::inactive()), "--------------------");
        assert_eq!(
            gauge_bar(&Gauge::from_texts(Some("High"), None)),
            "################...."
        );
        assert_eq!(
            gauge_bar(&Gauge::from_texts(None, Some("Critical Warning: x"))),
            "####................"
        );
    }

    #[test]
    fn test_truncate_or_pad() {
        assert_eq!(truncate_or_pad("abc", 5), "abc  ");
        assert_eq!(truncate_or_pad("abcdefgh", 6), "abc...");
        assert_eq!(truncate_or_pad("ééééééé", 6), "ééé...");
    }

    #[test]
    fn test_render_idle() {
        let text = render_text(&view(Selection::Idle));
        assert!(text.starts_with("== Organization ==\nSelection: idle\n"));
        assert!(text.contains("Health System Organization\nWho delivers care.\n"));
        assert!(text.contains("Intermediate Performance Measures\n"));
        assert!(text.contains("Performance Goals\n"));
        assert!(text.contains("[--------------------]"));
        assert!(!text.contains('#'));
        assert!(text.contains("  [ ] Public Delivery\n"));
        assert!(text.contains("(no scenarios)"));
    }

    #[test]
    fn test_render_scenario() {
        let text = render_text(&view(Selection::ScenarioSelected {
            id: "public".to_string(),
        }));
        assert!(text.contains("Public Delivery\nGovernment-run facilities.\n"));
        assert!(text.contains("[######..............] -2"));
        assert!(text.contains("[################....] +3  High access"));
        assert!(text.contains("  [warning] Efficiency: Low productivity\n"));
        assert!(text.contains("  [x] Public Delivery\n"));
    }

    #[test]
    fn test_render_compare() {
        let text = render_text(&view(Selection::CompareAB {
            a: "public".to_string(),
            b: "private".to_string(),
        }));
        assert!(text.contains("Comparing: A = Public Delivery, B = Private Delivery\n"));
        assert!(text.contains("Comparison: Public Delivery vs Private Delivery\n"));
        assert!(text.contains("Divergent metrics: 2 (threshold 2)\n"));
        assert!(text.contains("  [x] Public Delivery (A)\n"));
        assert!(text.contains("  [x] Private Delivery (B)\n"));
    }

    #[test]
    fn test_render_json_shape() {
        let json = render_json(&view(Selection::MetricSelected {
            metric: crate::metric::Metric::Access,
        }));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["knob"], "organization");
        assert_eq!(value["selection"]["state"], "metric_selected");
        assert_eq!(value["panel"]["title"], "Access");
        assert_eq!(value["gauges"].as_array().unwrap().len(), 6);
        assert!(value.get("comparison").is_none());
    }

    #[test]
    fn test_render_gauge_text() {
        let gauge = Gauge::from_texts(Some("Very High"), Some("Warning: x"));
        assert_eq!(
            render_gauge_text(&gauge),
            "##############...... net=+2 clamped=+2 fill=70.0% segments=14/20 tone=positive (very high effect, warning risk)\n"
        );
        assert_eq!(
            render_gauge_text(&Gauge::inactive()),
            "-------------------- net=+0 clamped=+0 fill=50.0% segments=10/20 tone=inactive (none effect, none risk)\n"
        );
    }
}
