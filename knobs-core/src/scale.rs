//! Effect and risk scale parsing
//!
//! Scenario content describes effects and risks in free text whose leading
//! phrase encodes a level ("High ...", "Critical Warning: ..."). This module
//! turns that text into small integer scores.
//!
//! Global invariants enforced:
//! - Parsing is total: unrecognized or absent text is the neutral level 0
//! - Prefix tests run in a fixed priority order
//! - Identical input yields identical output

use serde::{Deserialize, Serialize};

/// Effect prefixes in match priority order.
///
/// "Medium-High" must be tested before both "Medium" and "High".
const EFFECT_PREFIXES: &[(&str, i32)] = &[
    ("Very High", 4),
    ("Medium-High", 2),
    ("Medium", 1),
    ("High", 3),
];

/// Risk prefixes in match priority order.
const RISK_PREFIXES: &[(&str, i32)] = &[("Critical Warning", -3), ("Warning", -2)];

const CRITICAL_DISPLAY_PREFIX: &str = "Critical Warning: ";
const WARNING_DISPLAY_PREFIX: &str = "Warning: ";

/// Parse an effect description into a level in 0..=4
///
/// Levels:
/// - "Very High" => 4
/// - "High" => 3
/// - "Medium-High" => 2
/// - "Medium" => 1
/// - anything else (including "Low") => 0
pub fn parse_effect_level(text: Option<&str>) -> i32 {
    match_prefix(text, EFFECT_PREFIXES)
}

/// Parse a risk description into a level in {0, -2, -3}
pub fn parse_risk_level(text: Option<&str>) -> i32 {
    match_prefix(text, RISK_PREFIXES)
}

fn match_prefix(text: Option<&str>, table: &[(&str, i32)]) -> i32 {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return 0;
    };
    table
        .iter()
        .find(|(prefix, _)| text.starts_with(prefix))
        .map(|(_, level)| *level)
        .unwrap_or(0)
}

/// Parsed effect level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct EffectLevel(i32);

impl EffectLevel {
    pub fn parse(text: Option<&str>) -> Self {
        EffectLevel(parse_effect_level(text))
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            4 => "very high",
            3 => "high",
            2 => "medium-high",
            1 => "medium",
            _ => "none",
        }
    }
}

/// Parsed risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RiskLevel(i32);

impl RiskLevel {
    pub fn parse(text: Option<&str>) -> Self {
        RiskLevel(parse_risk_level(text))
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn severity(&self) -> RiskSeverity {
        match self.0 {
            -3 => RiskSeverity::Critical,
            -2 => RiskSeverity::Warning,
            _ => RiskSeverity::None,
        }
    }
}

/// Display severity of a systemic risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    None,
    Warning,
    Critical,
}

impl RiskSeverity {
    pub fn classify(text: Option<&str>) -> Self {
        RiskLevel::parse(text).severity()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskSeverity::None => "none",
            RiskSeverity::Warning => "warning",
            RiskSeverity::Critical => "critical",
        }
    }
}

/// Turn a snake_case content key into a display name
///
/// `"health_status"` becomes `"Health Status"`.
pub fn format_metric_name(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

/// Strip the "Critical Warning: " or "Warning: " lead-in from risk text
pub fn strip_warning_prefix(text: &str) -> &str {
    text.strip_prefix(CRITICAL_DISPLAY_PREFIX)
        .or_else(|| text.strip_prefix(WARNING_DISPLAY_PREFIX))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_levels() {
        assert_eq!(parse_effect_level(Some("Very High efficiency gains")), 4);
        assert_eq!(parse_effect_level(Some("High quality")), 3);
        assert_eq!(parse_effect_level(Some("Medium-High access")), 2);
        assert_eq!(parse_effect_level(Some("Medium improvement")), 1);
    }

    #[test]
    fn test_medium_high_takes_precedence() {
        // Would be 1 if "Medium" were tested first, 3 if "High" matched anywhere
        assert_eq!(parse_effect_level(Some("Medium-High access")), 2);
    }

    #[test]
    fn test_effect_neutral_inputs() {
        assert_eq!(parse_effect_level(None), 0);
        assert_eq!(parse_effect_level(Some("")), 0);
        assert_eq!(parse_effect_level(Some("Low")), 0);
        assert_eq!(parse_effect_level(Some("Low-Medium effect")), 0);
        assert_eq!(parse_effect_level(Some("very high (lowercase)")), 0);
        assert_eq!(parse_effect_level(Some(" High with leading space")), 0);
    }

    #[test]
    fn test_risk_levels() {
        assert_eq!(parse_risk_level(Some("Critical Warning: X")), -3);
        assert_eq!(parse_risk_level(Some("Warning: X")), -2);
        assert_eq!(parse_risk_level(None), 0);
        assert_eq!(parse_risk_level(Some("")), 0);
        assert_eq!(parse_risk_level(Some("Minor concern")), 0);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let text = Some("Medium-High access");
        assert_eq!(parse_effect_level(text), parse_effect_level(text));
        assert_eq!(EffectLevel::parse(text), EffectLevel::parse(text));
    }

    #[test]
    fn test_level_wrappers() {
        assert_eq!(EffectLevel::parse(Some("Very High")).value(), 4);
        assert_eq!(EffectLevel::parse(Some("Very High")).label(), "very high");
        assert_eq!(EffectLevel::parse(None).label(), "none");
        assert_eq!(RiskLevel::parse(Some("Warning: y")).value(), -2);
        assert_eq!(
            RiskLevel::parse(Some("Critical Warning: y")).severity(),
            RiskSeverity::Critical
        );
        assert_eq!(RiskSeverity::classify(Some("unrelated")), RiskSeverity::None);
    }

    #[test]
    fn test_format_metric_name() {
        assert_eq!(format_metric_name("efficiency"), "Efficiency");
        assert_eq!(format_metric_name("health_status"), "Health Status");
        assert_eq!(
            format_metric_name("customer_satisfaction"),
            "Customer Satisfaction"
        );
        assert_eq!(format_metric_name("revenue_source"), "Revenue Source");
        assert_eq!(format_metric_name(""), "");
    }

    #[test]
    fn test_strip_warning_prefix() {
        assert_eq!(
            strip_warning_prefix("Critical Warning: Cost escalation"),
            "Cost escalation"
        );
        assert_eq!(strip_warning_prefix("Warning: Adverse selection"), "Adverse selection");
        assert_eq!(strip_warning_prefix("Warning without colon"), "Warning without colon");
        assert_eq!(strip_warning_prefix("Plain text"), "Plain text");
    }
}
