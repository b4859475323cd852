//! Control knob catalog
//!
//! Each knob owns a content document and a fixed list of scenario sections
//! that its page renders in order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five policy levers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Knob {
    Financing,
    Payment,
    Organization,
    Regulation,
    Behavior,
}

/// Accent color of a knob page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnobColor {
    Green,
    Purple,
    Teal,
    Rose,
    Orange,
}

impl KnobColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnobColor::Green => "green",
            KnobColor::Purple => "purple",
            KnobColor::Teal => "teal",
            KnobColor::Rose => "rose",
            KnobColor::Orange => "orange",
        }
    }

    /// Border color (600 shade)
    pub fn border_hex(&self) -> &'static str {
        match self {
            KnobColor::Green => "#16a34a",
            KnobColor::Purple => "#9333ea",
            KnobColor::Teal => "#0d9488",
            KnobColor::Rose => "#e11d48",
            KnobColor::Orange => "#ea580c",
        }
    }

    /// Background tint (50 shade)
    pub fn tint_hex(&self) -> &'static str {
        match self {
            KnobColor::Green => "#f0fdf4",
            KnobColor::Purple => "#faf5ff",
            KnobColor::Teal => "#f0fdfa",
            KnobColor::Rose => "#fff1f2",
            KnobColor::Orange => "#fff7ed",
        }
    }
}

/// Static description of a scenario section on a knob page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    /// Field of the knob document holding the scenario array
    pub field: &'static str,
    pub title: &'static str,
    /// Column count on wide layouts
    pub columns: u8,
    /// Scenario fields rendered under each scenario name
    pub extra_fields: &'static [&'static str],
}

const FINANCING_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        field: "revenue_generation_scenarios",
        title: "Financing: Revenue Generation",
        columns: 4,
        extra_fields: &[],
    },
    SectionSpec {
        field: "risk_pooling_scenarios",
        title: "Financing: Risk Pooling Scenarios",
        columns: 3,
        extra_fields: &["revenue_source"],
    },
];

const PAYMENT_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        field: "provider_payment_scenarios",
        title: "Payment: Provider Payment Methods",
        columns: 4,
        extra_fields: &[],
    },
    SectionSpec {
        field: "demand_side_scenarios",
        title: "Payment: Demand-side Cost Sharing",
        columns: 4,
        extra_fields: &[],
    },
];

const ORGANIZATION_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        field: "delivery_structure_scenarios",
        title: "Organization: Delivery Structure",
        columns: 4,
        extra_fields: &[],
    },
    SectionSpec {
        field: "facility_governance_scenarios",
        title: "Organization: Facility Governance",
        columns: 4,
        extra_fields: &[],
    },
];

const REGULATION_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        field: "quality_safety_scenarios",
        title: "Regulation: Quality & Safety",
        columns: 4,
        extra_fields: &[],
    },
    SectionSpec {
        field: "market_price_scenarios",
        title: "Regulation: Market & Price",
        columns: 4,
        extra_fields: &[],
    },
];

const BEHAVIOR_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        field: "provider_behavior_scenarios",
        title: "Behavior: Provider Behavior Change",
        columns: 4,
        extra_fields: &[],
    },
    SectionSpec {
        field: "patient_behavior_scenarios",
        title: "Behavior: Patient & Population",
        columns: 4,
        extra_fields: &[],
    },
];

impl Knob {
    /// All knobs in framework order
    pub const ALL: [Knob; 5] = [
        Knob::Financing,
        Knob::Payment,
        Knob::Organization,
        Knob::Regulation,
        Knob::Behavior,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Knob::Financing => "financing",
            Knob::Payment => "payment",
            Knob::Organization => "organization",
            Knob::Regulation => "regulation",
            Knob::Behavior => "behavior",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Knob::Financing => "Financing",
            Knob::Payment => "Payment",
            Knob::Organization => "Organization",
            Knob::Regulation => "Regulation",
            Knob::Behavior => "Behavior",
        }
    }

    pub fn color(&self) -> KnobColor {
        match self {
            Knob::Financing => KnobColor::Green,
            Knob::Payment => KnobColor::Purple,
            Knob::Organization => KnobColor::Teal,
            Knob::Regulation => KnobColor::Rose,
            Knob::Behavior => KnobColor::Orange,
        }
    }

    /// Panel title shown when nothing is selected
    pub fn default_title(&self) -> &'static str {
        match self {
            Knob::Financing => "Health System Financing",
            Knob::Payment => "Health System Payment",
            Knob::Organization => "Health System Organization",
            Knob::Regulation => "Health System Regulation",
            Knob::Behavior => "Persuasion & Behavior Change",
        }
    }

    /// File name of the knob's content document
    pub fn data_file(&self) -> String {
        format!("{}Data.json", self.key())
    }

    pub fn sections(&self) -> &'static [SectionSpec] {
        match self {
            Knob::Financing => FINANCING_SECTIONS,
            Knob::Payment => PAYMENT_SECTIONS,
            Knob::Organization => ORGANIZATION_SECTIONS,
            Knob::Regulation => REGULATION_SECTIONS,
            Knob::Behavior => BEHAVIOR_SECTIONS,
        }
    }
}

impl fmt::Display for Knob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Knob {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Knob::ALL
            .into_iter()
            .find(|k| k.key() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown knob: {} (expected one of: financing, payment, organization, regulation, behavior)",
                    s
                )
            })
    }
}
