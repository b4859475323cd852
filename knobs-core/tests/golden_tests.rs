//! Golden file tests - verify output matches expected snapshots

use knobs_core::{compare_scenarios, compute_indicator, render_json, Dataset, Knob};
use std::fs;
use std::path::PathBuf;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join("data")
}

fn golden_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("golden")
        .join(name)
}

fn read_golden(name: &str) -> serde_json::Value {
    let path = golden_path(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read golden file {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Golden file {} is not valid JSON: {}", path.display(), e))
}

#[test]
fn test_golden_gauge_table() {
    let mut rows = Vec::new();
    for effect in 0..=4 {
        for risk in [0, -2, -3] {
            rows.push(serde_json::json!({
                "effect_level": effect,
                "risk_level": risk,
                "indicator": compute_indicator(effect, risk),
            }));
        }
    }

    let output: serde_json::Value =
        serde_json::from_str(&render_json(&rows)).expect("output is valid JSON");
    assert_eq!(
        output,
        read_golden("gauge_table.json"),
        "Gauge table does not match golden file"
    );
}

#[test]
fn test_golden_financing_compare() {
    let dataset = Dataset::load(&data_dir()).unwrap();
    let content = dataset.knob(Knob::Financing).unwrap();
    let a = content.scenario("general_tax").unwrap();
    let b = content.scenario("out_of_pocket").unwrap();

    let output: serde_json::Value =
        serde_json::from_str(&render_json(&compare_scenarios(a, b))).expect("output is valid JSON");
    assert_eq!(
        output,
        read_golden("financing_compare.json"),
        "Comparison does not match golden file"
    );
}

#[test]
fn test_golden_determinism() {
    let dataset1 = Dataset::load(&data_dir()).unwrap();
    let dataset2 = Dataset::load(&data_dir()).unwrap();
    let config = knobs_core::ResolvedConfig::defaults().unwrap();
    let events = [
        "compare".parse().unwrap(),
        "scenario:single_payer".parse().unwrap(),
        "scenario:multiple_funds".parse().unwrap(),
    ];

    let view1 = knobs_core::knob_view(&dataset1, Knob::Financing, &events, &config).unwrap();
    let view2 = knobs_core::knob_view(&dataset2, Knob::Financing, &events, &config).unwrap();

    assert_eq!(render_json(&view1), render_json(&view2));
    assert_eq!(knobs_core::render_text(&view1), knobs_core::render_text(&view2));
    assert_eq!(knobs_core::render_html(&view1), knobs_core::render_html(&view2));
}
