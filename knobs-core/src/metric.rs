//! Performance metric catalog
//!
//! The six measures are fixed at compile time; scenario content refers to
//! them by key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Performance measure identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Efficiency,
    Quality,
    Access,
    HealthStatus,
    CustomerSatisfaction,
    RiskProtection,
}

/// Where a metric sits in the framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricTier {
    /// Intermediate performance measure
    Intermediate,
    /// Ultimate performance goal
    Goal,
}

impl MetricTier {
    pub fn title(&self) -> &'static str {
        match self {
            MetricTier::Intermediate => "Intermediate Performance Measures",
            MetricTier::Goal => "Performance Goals",
        }
    }
}

impl Metric {
    /// All metrics in display order (intermediate first, then goals)
    pub const ALL: [Metric; 6] = [
        Metric::Efficiency,
        Metric::Quality,
        Metric::Access,
        Metric::HealthStatus,
        Metric::CustomerSatisfaction,
        Metric::RiskProtection,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Metric::Efficiency => "efficiency",
            Metric::Quality => "quality",
            Metric::Access => "access",
            Metric::HealthStatus => "health_status",
            Metric::CustomerSatisfaction => "customer_satisfaction",
            Metric::RiskProtection => "risk_protection",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Efficiency => "Efficiency",
            Metric::Quality => "Quality",
            Metric::Access => "Access",
            Metric::HealthStatus => "Health Status",
            Metric::CustomerSatisfaction => "Customer Satisfaction",
            Metric::RiskProtection => "Risk Protection",
        }
    }

    pub fn tier(&self) -> MetricTier {
        match self {
            Metric::Efficiency | Metric::Quality | Metric::Access => MetricTier::Intermediate,
            Metric::HealthStatus | Metric::CustomerSatisfaction | Metric::RiskProtection => {
                MetricTier::Goal
            }
        }
    }

    /// What the metric measures and how it is observed at population level
    pub fn description(&self) -> &'static str {
        match self {
            Metric::Efficiency => {
                "How well the health system converts inputs (money, personnel, facilities) into \
                 outputs (services, coverage). Population measures include cost per unit of \
                 service, administrative overhead as a share of total health spending, hospital \
                 bed occupancy rates, average length of stay, and the ratio of health spending \
                 to health outcomes."
            }
            Metric::Quality => {
                "The degree to which health services meet established professional standards \
                 and improve outcomes. Population measures include clinical adherence to \
                 evidence-based protocols, surgical complication rates, hospital-acquired \
                 infection rates, diagnostic accuracy, and preventable adverse event rates."
            }
            Metric::Access => {
                "Whether individuals who need health services can obtain them without undue \
                 barrier. Population measures include geographic coverage (facilities per \
                 capita), financial access (proportion facing catastrophic payments to receive \
                 care), timeliness (average wait times), and service availability (essential \
                 medicine stock-out rates)."
            }
            Metric::HealthStatus => {
                "The overall health of a population as shaped by the health system and broader \
                 determinants. Population measures include life expectancy at birth, infant and \
                 under-5 mortality rates, maternal mortality ratio, disease-specific mortality \
                 and morbidity, and disability-adjusted life years (DALYs)."
            }
            Metric::CustomerSatisfaction => {
                "How the population perceives and experiences the health system. Population \
                 measures include patient satisfaction surveys, perceived responsiveness of the \
                 system, respect for dignity and autonomy, degree of choice among providers, and \
                 timeliness and communication quality."
            }
            Metric::RiskProtection => {
                "The degree to which the health system shields individuals from financial \
                 hardship due to illness. Population measures include rate of catastrophic \
                 health expenditure (spending >10\u{2013}25% of household income), medical \
                 impoverishment rate, out-of-pocket spending as a share of total health \
                 expenditure, and breadth and depth of insurance coverage."
            }
        }
    }

    /// Metrics of one tier, in display order
    pub fn of_tier(tier: MetricTier) -> impl Iterator<Item = Metric> {
        Metric::ALL.into_iter().filter(move |m| m.tier() == tier)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown metric: {}", s))
    }
}
