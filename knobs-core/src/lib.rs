//! Knobs core library - health-policy control knob scenarios, gauges and comparisons

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Level parsing is total: unrecognized text maps to level 0, never an error
// - Gauge positions are bounded to the 20-segment bar
// - No global mutable state
// - No randomness, clocks, threads, or async
// - Content authoring order is preserved through every view
// - Identical input yields byte-for-byte identical output

pub mod compare;
pub mod config;
pub mod dataset;
pub mod gauge;
pub mod html;
pub mod knob;
pub mod metric;
pub mod report;
pub mod scale;
pub mod selection;
pub mod view;

pub use compare::{compare_scenarios, compare_scenarios_with_threshold, ScenarioComparison};
pub use config::ResolvedConfig;
pub use dataset::{Dataset, KnobContent, LiteraturePaper, Scenario};
pub use gauge::{compute_indicator, Gauge, Indicator};
pub use html::{render_html, render_overview_html};
pub use knob::Knob;
pub use metric::Metric;
pub use report::{render_json, render_overview_text, render_text};
pub use scale::{parse_effect_level, parse_risk_level};
pub use selection::{Selection, SelectionEvent};
pub use view::{KnobView, OverviewView};

use anyhow::Result;

/// Build the view of one knob page after replaying `events` from idle
pub fn knob_view(
    dataset: &Dataset,
    knob: Knob,
    events: &[SelectionEvent],
    config: &ResolvedConfig,
) -> Result<KnobView> {
    let content = dataset
        .knob(knob)
        .ok_or_else(|| anyhow::anyhow!("no content loaded for knob: {}", knob))?;
    let selection = Selection::default().replay(events.iter().cloned());
    tracing::debug!(knob = %knob, state = selection.as_str(), "built selection");
    Ok(KnobView::build(
        content,
        &dataset.literature,
        &selection,
        config,
    ))
}

/// Build the overview page after replaying `events` from idle
pub fn overview_view(
    dataset: &Dataset,
    events: &[SelectionEvent],
    config: &ResolvedConfig,
) -> OverviewView {
    let selection = Selection::default().replay(events.iter().cloned());
    OverviewView::build(&dataset.knobs, &selection, config)
}
