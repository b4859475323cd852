//! HTML page generation
//!
//! Generates self-contained knob pages with embedded CSS. Pages are static
//! snapshots of one selection and work offline.

use crate::compare::ScenarioComparison;
use crate::gauge::Gauge;
use crate::metric::MetricTier;
use crate::scale::format_metric_name;
use crate::view::{
    EvidenceEntry, GaugeRow, KnobView, OverviewView, Panel, ScenarioDetails, SectionView,
};

/// Color of an unfilled gauge segment
const EMPTY_SEGMENT: &str = "#e2e8f0";

/// Render a knob page as an HTML document
pub fn render_html(view: &KnobView) -> String {
    let comparison = view
        .comparison
        .as_ref()
        .map(render_comparison)
        .unwrap_or_default();
    let details = view.details.as_ref().map(render_details).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Control Knobs - {label}</title>
    <style>{css}</style>
</head>
<body style="--accent: {accent}; --tint: {tint};">
    <div class="container">
        {header}
        <div class="layout">
            <div class="main">
                {panel}
                {details}
                {comparison}
                {sections}
            </div>
            <aside class="gauges">
                {gauges}
            </aside>
        </div>
        {evidence}
        {footer}
    </div>
</body>
</html>"#,
        label = html_escape(&view.label),
        css = inline_css(),
        accent = view.color.border_hex(),
        tint = view.color.tint_hex(),
        header = render_header(view),
        panel = render_panel(&view.panel),
        details = details,
        comparison = comparison,
        sections = view
            .sections
            .iter()
            .map(render_section)
            .collect::<Vec<_>>()
            .join("\n"),
        gauges = render_gauge_panel(&view.gauges),
        evidence = render_evidence(&view.evidence),
        footer = render_footer(),
    )
}

/// Render the overview page as an HTML document
pub fn render_overview_html(view: &OverviewView) -> String {
    let tiles: String = view
        .knobs
        .iter()
        .map(|tile| {
            format!(
                r#"<div class="knob-tile" style="border-color: {border}; background: {tint};">
    <h3>{label}</h3>
    <div class="meta">{count} scenarios</div>
</div>"#,
                border = tile.color.border_hex(),
                tint = tile.color.tint_hex(),
                label = html_escape(&tile.label),
                count = tile.scenario_count,
            )
        })
        .collect();
    let disclaimer = view
        .disclaimer
        .as_deref()
        .map(|d| format!(r#"<p class="disclaimer">{}</p>"#, html_escape(d)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Control Knobs</title>
    <style>{css}</style>
</head>
<body style="--accent: #2563eb; --tint: #eff6ff;">
    <div class="container">
        <header>
            <h1>Control Knobs</h1>
        </header>
        <div class="layout">
            <div class="main">
                <section class="section knob-grid">{tiles}</section>
                {panel}
                {disclaimer}
            </div>
            <aside class="gauges">
                {gauges}
            </aside>
        </div>
        {footer}
    </div>
</body>
</html>"#,
        css = inline_css(),
        tiles = tiles,
        panel = render_panel(&view.panel),
        disclaimer = disclaimer,
        gauges = render_gauge_panel(&view.gauges),
        footer = render_footer(),
    )
}

fn inline_css() -> &'static str {
    r#"
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    line-height: 1.6;
    color: #111827;
    background: #ffffff;
}

.container {
    max-width: 1200px;
    margin: 0 auto;
    padding: 2rem;
}

header {
    margin-bottom: 2rem;
    padding-bottom: 1rem;
    border-bottom: 2px solid var(--accent);
}

header h1 {
    font-size: 2rem;
    font-weight: 700;
}

header .meta {
    color: #6b7280;
    font-size: 0.875rem;
}

.layout {
    display: grid;
    grid-template-columns: 2fr 1fr;
    gap: 2rem;
}

.section {
    margin-bottom: 2rem;
}

.section h2 {
    font-size: 1.25rem;
    font-weight: 700;
    margin-bottom: 0.75rem;
}

.panel {
    background: var(--tint);
    border-left: 4px solid var(--accent);
    border-radius: 0.5rem;
    padding: 1rem;
}

.panel h2 {
    margin-bottom: 0.5rem;
}

.knob-grid {
    display: grid;
    grid-template-columns: repeat(5, 1fr);
    gap: 0.75rem;
}

.knob-tile {
    border: 2px solid;
    border-radius: 0.5rem;
    padding: 0.75rem;
    text-align: center;
}

.scenario-grid {
    display: grid;
    gap: 0.5rem;
}

.scenario {
    border: 2px solid #e5e7eb;
    border-radius: 0.5rem;
    padding: 0.5rem 0.75rem;
    font-size: 0.875rem;
}

.scenario.active {
    border-color: var(--accent);
    background: var(--tint);
}

.scenario .slot {
    float: right;
    font-weight: 700;
    color: var(--accent);
}

.scenario .extra {
    color: #6b7280;
    font-size: 0.75rem;
}

.gauge-tier h3 {
    font-size: 0.75rem;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: #2563eb;
    margin: 1rem 0 0.5rem;
}

.gauge-card {
    border: 2px solid #2563eb;
    border-radius: 0.5rem;
    padding: 0.5rem 0.75rem;
    margin-bottom: 0.5rem;
    background: #ffffff;
}

.gauge-card.active {
    background: #eff6ff;
}

.gauge-card.selected {
    border-color: #1e40af;
    background: #dbeafe;
}

.gauge-label {
    display: flex;
    font-size: 0.75rem;
    font-weight: 700;
    color: #2563eb;
    text-transform: uppercase;
}

.gauge-label .warning {
    margin-left: auto;
    color: #eab308;
}

.gauge-bar {
    position: relative;
    margin-top: 0.25rem;
}

.segments {
    display: flex;
    gap: 2px;
}

.segment {
    flex: 1;
    height: 0.75rem;
    border-radius: 1px;
}

.center-marker {
    position: absolute;
    top: 0;
    bottom: 0;
    left: 50%;
    width: 1px;
    background: #94a3b8;
}

.indicator {
    position: absolute;
    top: -4px;
    width: 3px;
    height: 20px;
    transform: translateX(-1.5px);
    border-radius: 1px;
}

table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.875rem;
}

th, td {
    text-align: left;
    padding: 0.25rem 0.5rem;
    border-bottom: 1px solid #e5e7eb;
}

tr.divergent {
    background: #fef3c7;
}

.severity-critical {
    color: #b91c1c;
    font-weight: 700;
}

.severity-warning {
    color: #d97706;
}

.evidence li {
    list-style: none;
    margin-bottom: 0.75rem;
}

.evidence .meta {
    color: #6b7280;
    font-size: 0.75rem;
}

.disclaimer {
    margin-top: 1rem;
    color: #6b7280;
    font-size: 0.875rem;
    font-style: italic;
}

footer {
    margin-top: 3rem;
    padding-top: 1rem;
    border-top: 1px solid #e5e7eb;
    color: #6b7280;
    font-size: 0.75rem;
    text-align: center;
}
"#
}

fn render_header(view: &KnobView) -> String {
    let comparing = if view.compare_labels.is_empty() {
        String::new()
    } else {
        format!(
            " • <span>Comparing: <strong>{}</strong></span>",
            html_escape(&view.compare_labels.join(" vs "))
        )
    };

    format!(
        r#"<header>
    <h1>{label}</h1>
    <div class="meta">
        <span>Selection: <code>{state}</code></span>{comparing}
    </div>
</header>"#,
        label = html_escape(&view.label),
        state = view.selection.as_str(),
        comparing = comparing,
    )
}

fn render_panel(panel: &Panel) -> String {
    format!(
        r#"<section class="section panel">
    <h2>{title}</h2>
    <p>{description}</p>
</section>"#,
        title = html_escape(&panel.title),
        description = html_escape(&panel.description),
    )
}

fn render_details(details: &ScenarioDetails) -> String {
    let effects: String = details
        .effects
        .iter()
        .map(|e| {
            format!(
                "<li><strong>{}</strong>: {}</li>",
                html_escape(&e.metric),
                html_escape(&e.text)
            )
        })
        .collect();
    let risks: String = details
        .risks
        .iter()
        .map(|r| {
            format!(
                r#"<li class="severity-{sev}"><strong>{metric}</strong>: {text}</li>"#,
                sev = r.severity.as_str(),
                metric = html_escape(&r.metric),
                text = html_escape(&r.text)
            )
        })
        .collect();
    let literature: String = details
        .literature
        .iter()
        .map(|t| format!("<li>{}</li>", html_escape(t)))
        .collect();

    let mut html = String::from(r#"<section class="section details">"#);
    if !effects.is_empty() {
        html.push_str(&format!("<h2>Intended Effects</h2><ul>{}</ul>", effects));
    }
    if !risks.is_empty() {
        html.push_str(&format!("<h2>Systemic Risks</h2><ul>{}</ul>", risks));
    }
    if !literature.is_empty() {
        html.push_str(&format!(
            "<h2>Supporting Literature</h2><ul>{}</ul>",
            literature
        ));
    }
    html.push_str("</section>");
    html
}

fn render_comparison(comparison: &ScenarioComparison) -> String {
    let rows: String = comparison
        .effects
        .iter()
        .map(|row| {
            format!(
                r#"<tr{class}><td>{metric}</td><td>{a}</td><td>{b}</td><td>{diff}</td></tr>"#,
                class = if row.divergent {
                    r#" class="divergent""#
                } else {
                    ""
                },
                metric = html_escape(&format_metric_name(&row.metric)),
                a = html_escape(row.a.as_deref().unwrap_or("-")),
                b = html_escape(row.b.as_deref().unwrap_or("-")),
                diff = row.diff,
            )
        })
        .collect();
    let risks: String = comparison
        .risks
        .iter()
        .map(|row| {
            format!(
                r#"<tr><td>{metric}</td><td class="severity-{sa}">{a}</td><td class="severity-{sb}">{b}</td><td></td></tr>"#,
                metric = html_escape(&format_metric_name(&row.metric)),
                sa = row.severity_a.as_str(),
                sb = row.severity_b.as_str(),
                a = html_escape(row.a.as_deref().unwrap_or("-")),
                b = html_escape(row.b.as_deref().unwrap_or("-")),
            )
        })
        .collect();

    format!(
        r#"<section class="section comparison">
    <h2>Comparison</h2>
    <p class="meta">{count} divergent metrics (threshold {threshold})</p>
    <table>
        <thead><tr><th>Metric</th><th>{a}</th><th>{b}</th><th>Diff</th></tr></thead>
        <tbody>{rows}{risks}</tbody>
    </table>
</section>"#,
        count = comparison.divergent_count(),
        threshold = comparison.threshold,
        a = html_escape(&comparison.a_name),
        b = html_escape(&comparison.b_name),
        rows = rows,
        risks = risks,
    )
}

fn render_section(section: &SectionView) -> String {
    let cards: String = section
        .scenarios
        .iter()
        .map(|card| {
            let slot = card
                .slot
                .as_deref()
                .map(|s| format!(r#"<span class="slot">{}</span>"#, s))
                .unwrap_or_default();
            let extra: String = card
                .extra
                .iter()
                .map(|e| format!(r#"<div class="extra">{}</div>"#, html_escape(e)))
                .collect();
            format!(
                r#"<div class="scenario{active}" data-id="{id}">{slot}{name}{extra}</div>"#,
                active = if card.active { " active" } else { "" },
                id = html_escape(&card.id),
                slot = slot,
                name = html_escape(&card.name),
                extra = extra,
            )
        })
        .collect();

    format!(
        r#"<section class="section">
    <h2>{title}</h2>
    <div class="scenario-grid" style="grid-template-columns: repeat({columns}, 1fr);">{cards}</div>
</section>"#,
        title = html_escape(&section.title),
        columns = section.columns.max(1),
        cards = cards,
    )
}

fn render_gauge_panel(rows: &[GaugeRow]) -> String {
    [MetricTier::Intermediate, MetricTier::Goal]
        .into_iter()
        .map(|tier| {
            let cards: String = rows
                .iter()
                .filter(|r| r.tier == tier)
                .map(render_gauge_card)
                .collect();
            format!(
                r#"<div class="gauge-tier"><h3>{}</h3>{}</div>"#,
                tier.title(),
                cards
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_gauge_card(row: &GaugeRow) -> String {
    let class = if row.selected {
        "gauge-card selected"
    } else if row.gauge.active {
        "gauge-card active"
    } else {
        "gauge-card"
    };
    let warning = if row.gauge.has_warning() || row.gauge_b.as_ref().is_some_and(Gauge::has_warning)
    {
        r#"<span class="warning" title="Systemic risk">&#9888;</span>"#
    } else {
        ""
    };
    let bar_b = row.gauge_b.as_ref().map(render_gauge_bar).unwrap_or_default();

    format!(
        r#"<div class="{class}" data-metric="{key}">
    <div class="gauge-label">{label}{warning}</div>
    {bar}{bar_b}
</div>"#,
        class = class,
        key = row.metric.key(),
        label = html_escape(&row.label),
        warning = warning,
        bar = render_gauge_bar(&row.gauge),
        bar_b = bar_b,
    )
}

/// Segmented bar with the center marker and, when active, the fill indicator
fn render_gauge_bar(gauge: &Gauge) -> String {
    let color = gauge.tone.color();
    let segments: String = gauge
        .segments()
        .map(|filled| {
            format!(
                r#"<div class="segment" style="background-color: {};"></div>"#,
                if filled { color } else { EMPTY_SEGMENT }
            )
        })
        .collect();
    let indicator = if gauge.active {
        format!(
            r#"<div class="indicator" style="left: {:.1}%; background-color: {};"></div>"#,
            gauge.indicator.indicator_percent, color
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class="gauge-bar"><div class="segments">{segments}</div><div class="center-marker"></div>{indicator}</div>"#,
        segments = segments,
        indicator = indicator,
    )
}

fn render_evidence(entries: &[EvidenceEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let items: String = entries
        .iter()
        .map(|e| {
            format!(
                r#"<li>
    <a href="{url}">{title}</a>
    <div class="meta">{authors} ({year}). {journal}. {country}. {methodology}</div>
    <p>{finding}</p>
</li>"#,
                url = html_escape(&e.url),
                title = html_escape(&e.title),
                authors = html_escape(&e.authors),
                year = e.year,
                journal = html_escape(&e.journal),
                country = html_escape(&e.country),
                methodology = html_escape(&e.methodology),
                finding = html_escape(&e.finding),
            )
        })
        .collect();

    format!(
        r#"<section class="section evidence">
    <h2>Empirical Evidence</h2>
    <ul>{}</ul>
</section>"#,
        items
    )
}

fn render_footer() -> String {
    r#"<footer>
    <p>Generated by knobs. Ratings are informed by empirical literature and are not deterministic predictions.</p>
</footer>"#
        .to_string()
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
