//! Gauge indicator model
//!
//! Combines an effect level and a risk level into a net score and maps it
//! onto a segmented bar.
//!
//! Global invariants enforced:
//! - net is clamped to [-4, 4] before mapping
//! - fill stays within [10%, 90%]; net 0 is the exact center segment
//! - the indicator snaps to segment boundaries
//! - activity is tracked independently of the net score

use crate::scale::{EffectLevel, RiskLevel};
use serde::{Deserialize, Serialize};

/// Number of segments in a gauge bar
pub const SEGMENT_COUNT: u32 = 20;

const MAX_NET: i32 = 4;
const CENTER_PERCENT: f64 = 50.0;
const SWING_PERCENT: f64 = 40.0;

/// Baseline colors per gauge tone
const INACTIVE_COLOR: &str = "#93c5fd";
const POSITIVE_COLOR: &str = "#2563eb";
const NEGATIVE_COLOR: &str = "#d97706";

/// Bar geometry derived from an effect/risk pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Indicator {
    pub net: i32,
    pub clamped_net: i32,
    pub fill_percent: f64,
    pub filled_segments: u32,
    pub indicator_percent: f64,
}

/// Compute the gauge indicator for an effect level and a risk level
///
/// Formula:
/// - net = effect + risk, clamped to [-4, 4]
/// - fill% = 50 + (net / 4) * 40
/// - filled = round(fill% / 100 * 20)
/// - indicator% = filled / 20 * 100
pub fn compute_indicator(effect_level: i32, risk_level: i32) -> Indicator {
    let net = effect_level.saturating_add(risk_level);
    let clamped_net = net.clamp(-MAX_NET, MAX_NET);
    let fill_percent = CENTER_PERCENT + (clamped_net as f64 / MAX_NET as f64) * SWING_PERCENT;
    let filled_segments = ((fill_percent / 100.0) * SEGMENT_COUNT as f64).round() as u32;
    let indicator_percent = filled_segments as f64 * 100.0 / SEGMENT_COUNT as f64;

    Indicator {
        net,
        clamped_net,
        fill_percent,
        filled_segments,
        indicator_percent,
    }
}

/// Color state of a gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeTone {
    Inactive,
    Positive,
    Negative,
}

impl GaugeTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            GaugeTone::Inactive => "inactive",
            GaugeTone::Positive => "positive",
            GaugeTone::Negative => "negative",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            GaugeTone::Inactive => INACTIVE_COLOR,
            GaugeTone::Positive => POSITIVE_COLOR,
            GaugeTone::Negative => NEGATIVE_COLOR,
        }
    }
}

/// A gauge for one metric under the current selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Gauge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
    pub effect_level: i32,
    pub risk_level: i32,
    pub active: bool,
    pub tone: GaugeTone,
    pub indicator: Indicator,
}

impl Gauge {
    /// Build a gauge from the raw effect and risk texts of a metric
    pub fn from_texts(effect: Option<&str>, risk: Option<&str>) -> Self {
        let effect = effect.filter(|t| !t.is_empty());
        let risk = risk.filter(|t| !t.is_empty());
        let effect_level = EffectLevel::parse(effect).value();
        let risk_level = RiskLevel::parse(risk).value();
        let indicator = compute_indicator(effect_level, risk_level);
        let active = effect.is_some() || risk.is_some();
        let tone = if !active {
            GaugeTone::Inactive
        } else if indicator.net >= 0 {
            GaugeTone::Positive
        } else {
            GaugeTone::Negative
        };

        Gauge {
            effect: effect.map(str::to_string),
            risk: risk.map(str::to_string),
            effect_level,
            risk_level,
            active,
            tone,
            indicator,
        }
    }

    /// A gauge with no selection behind it
    pub fn inactive() -> Self {
        Gauge::from_texts(None, None)
    }

    /// Whether the warning triangle is shown
    pub fn has_warning(&self) -> bool {
        self.risk.is_some()
    }

    /// Fill state of each segment, left to right
    pub fn segments(&self) -> impl Iterator<Item = bool> + '_ {
        (0..SEGMENT_COUNT).map(move |i| i < self.indicator.filled_segments)
    }
}
