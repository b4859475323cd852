//! Scenario and literature content
//!
//! Content is a directory of static JSON documents:
//! - `<knob>Data.json` per knob: `{ "description": ..., "<section>": [Scenario, ...] }`
//! - `literature.json`: an array of literature papers
//!
//! Global invariants enforced:
//! - Content is loaded once and never mutated
//! - Effect and risk maps keep their authoring order
//! - Scenario ids are unique within a knob
//! - Lookups with unknown ids return None, never fail

use crate::knob::{Knob, SectionSpec};
use crate::metric::Metric;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name of the literature document
pub const LITERATURE_FILE: &str = "literature.json";

/// Separator between knob names in a paper's `control_knob` field
const KNOB_SEPARATOR: &str = " / ";

/// A named policy configuration under a knob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub intended_effects: IndexMap<String, String>,
    #[serde(default)]
    pub systemic_risks: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literature_ids: Vec<String>,
    /// Cross-cutting fields such as `revenue_source`
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Scenario {
    pub fn effect(&self, metric: Metric) -> Option<&str> {
        self.intended_effects.get(metric.key()).map(String::as_str)
    }

    pub fn risk(&self, metric: Metric) -> Option<&str> {
        self.systemic_risks.get(metric.key()).map(String::as_str)
    }

    /// Display value of an extra field, or None when absent or empty
    ///
    /// Falsy values (null, false, 0, "") are treated as absent. Arrays are
    /// joined with commas.
    pub fn extra_field(&self, field: &str) -> Option<String> {
        display_value(self.extra.get(field)?)
    }
}

fn display_value(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// A titled group of scenarios on a knob page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioSection {
    pub field: String,
    pub title: String,
    pub columns: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_fields: Vec<String>,
    pub scenarios: Vec<Scenario>,
}

impl ScenarioSection {
    fn from_spec(spec: &SectionSpec, scenarios: Vec<Scenario>) -> Self {
        ScenarioSection {
            field: spec.field.to_string(),
            title: spec.title.to_string(),
            columns: spec.columns,
            extra_fields: spec.extra_fields.iter().map(|f| f.to_string()).collect(),
            scenarios,
        }
    }
}

/// Content of one knob page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KnobContent {
    pub knob: Knob,
    pub description: String,
    pub sections: Vec<ScenarioSection>,
}

impl KnobContent {
    /// Build knob content from a parsed knob document
    pub fn from_value(knob: Knob, doc: &serde_json::Value) -> Result<Self> {
        let obj = doc
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("{} document must be a JSON object", knob))?;

        let description = obj
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut sections = Vec::with_capacity(knob.sections().len());
        for spec in knob.sections() {
            let scenarios = match obj.get(spec.field) {
                Some(value) => Vec::<Scenario>::deserialize(value)
                    .with_context(|| format!("invalid scenarios in {}.{}", knob, spec.field))?,
                None => {
                    tracing::warn!(knob = %knob, field = spec.field, "scenario section missing");
                    Vec::new()
                }
            };
            sections.push(ScenarioSection::from_spec(spec, scenarios));
        }

        let content = KnobContent {
            knob,
            description,
            sections,
        };
        content.validate()?;
        Ok(content)
    }

    /// Parse knob content from a JSON string
    ///
    /// `serde_json` is built with `preserve_order`, so object keys reach the
    /// effect and risk maps in document order.
    pub fn from_json(knob: Knob, json: &str) -> Result<Self> {
        let doc: serde_json::Value = serde_json::from_str(json)
            .with_context(|| format!("failed to parse {} document", knob))?;
        Self::from_value(knob, &doc)
    }

    /// Load a knob document from a content directory
    pub fn load(dir: &Path, knob: Knob) -> Result<Self> {
        let path = dir.join(knob.data_file());
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read content file: {}", path.display()))?;
        Self::from_json(knob, &content)
            .with_context(|| format!("invalid content file: {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for scenario in self.scenarios() {
            if scenario.id.is_empty() {
                anyhow::bail!("{}: scenario '{}' has an empty id", self.knob, scenario.name);
            }
            if !seen.insert(scenario.id.as_str()) {
                anyhow::bail!("{}: duplicate scenario id '{}'", self.knob, scenario.id);
            }
        }
        Ok(())
    }

    /// All scenarios in section order
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.sections.iter().flat_map(|s| s.scenarios.iter())
    }

    /// Find a scenario by id across all sections
    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios().find(|s| s.id == id)
    }
}

/// A literature reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LiteraturePaper {
    pub id: String,
    pub control_knob: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub authors: String,
    pub year: i32,
    pub title: String,
    #[serde(default)]
    pub journal: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub methodology: String,
    #[serde(default)]
    pub finding: String,
    #[serde(default)]
    pub macro_takeaway: String,
}

impl LiteraturePaper {
    /// Whether the paper is tagged with the given knob
    pub fn matches_knob(&self, knob: Knob) -> bool {
        self.control_knob
            .split(KNOB_SEPARATOR)
            .any(|k| k.trim().eq_ignore_ascii_case(knob.key()))
    }

    /// Google Scholar search URL for the paper title
    pub fn scholar_url(&self) -> String {
        format!(
            "https://scholar.google.com/scholar?q={}",
            urlencoding::encode(&self.title)
        )
    }
}

/// Papers tagged with a knob, oldest first
pub fn papers_for_knob(literature: &[LiteraturePaper], knob: Knob) -> Vec<&LiteraturePaper> {
    let mut papers: Vec<&LiteraturePaper> =
        literature.iter().filter(|p| p.matches_knob(knob)).collect();
    papers.sort_by_key(|p| p.year);
    papers
}

/// Papers linked from a scenario, in the order the scenario lists them
pub fn papers_for_scenario<'a>(
    literature: &'a [LiteraturePaper],
    scenario: &Scenario,
) -> Vec<&'a LiteraturePaper> {
    scenario
        .literature_ids
        .iter()
        .filter_map(|id| literature.iter().find(|p| &p.id == id))
        .collect()
}

/// Parse a literature document
pub fn parse_literature(json: &str) -> Result<Vec<LiteraturePaper>> {
    serde_json::from_str(json).context("failed to parse literature document")
}

/// The complete content bundle
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub knobs: Vec<KnobContent>,
    pub literature: Vec<LiteraturePaper>,
    /// Directory the content was loaded from (None if built in memory)
    pub source_dir: Option<PathBuf>,
}

impl Dataset {
    /// Assemble a dataset from already-parsed parts
    pub fn from_parts(knobs: Vec<KnobContent>, literature: Vec<LiteraturePaper>) -> Self {
        Dataset {
            knobs,
            literature,
            source_dir: None,
        }
    }

    /// Load every knob document and the literature document from a directory
    ///
    /// A missing literature document yields an empty literature list. A
    /// missing or malformed knob document is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("content directory does not exist: {}", dir.display());
        }

        let knobs = Knob::ALL
            .into_iter()
            .map(|knob| KnobContent::load(dir, knob))
            .collect::<Result<Vec<_>>>()?;

        let literature_path = dir.join(LITERATURE_FILE);
        let literature = if literature_path.exists() {
            let content = std::fs::read_to_string(&literature_path).with_context(|| {
                format!("failed to read literature file: {}", literature_path.display())
            })?;
            parse_literature(&content)
                .with_context(|| format!("invalid literature file: {}", literature_path.display()))?
        } else {
            tracing::debug!(path = %literature_path.display(), "no literature document");
            Vec::new()
        };

        tracing::debug!(
            dir = %dir.display(),
            scenarios = knobs.iter().map(|k| k.scenarios().count()).sum::<usize>(),
            papers = literature.len(),
            "content loaded"
        );

        Ok(Dataset {
            knobs,
            literature,
            source_dir: Some(dir.to_path_buf()),
        })
    }

    pub fn knob(&self, knob: Knob) -> Option<&KnobContent> {
        self.knobs.iter().find(|k| k.knob == knob)
    }

    pub fn papers_for_knob(&self, knob: Knob) -> Vec<&LiteraturePaper> {
        papers_for_knob(&self.literature, knob)
    }
}
