use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fact type taxonomy (spec §3). Represented as a discriminated union validated on
/// ingress, per spec §9 ("tagged variants over string enums").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FactType {
  Kv,
  Relationship,
  Preference,
  Temporal,
  Identity,
  Location,
  Decision,
  State,
  Config,
}

impl FactType {
  pub const ALL: [FactType; 9] = [
    Self::Kv,
    Self::Relationship,
    Self::Preference,
    Self::Temporal,
    Self::Identity,
    Self::Location,
    Self::Decision,
    Self::State,
    Self::Config,
  ];

  /// Decay rate per day (spec §3). Half-lives, for calibration: identity 693d,
  /// decision 347d, relationship 231d, location 139d, preference/kv 69d, state 14d,
  /// temporal 7d. `Config` is not listed in spec's calibration table; it decays like `kv`.
  #[must_use]
  pub const fn default_decay_rate(self) -> f64 {
    match self {
      Self::Identity => 0.001,
      Self::Decision => 0.002,
      Self::Relationship => 0.003,
      Self::Location => 0.005,
      Self::Preference | Self::Kv | Self::Config => 0.010,
      Self::State => 0.050,
      Self::Temporal => 0.100,
    }
  }

  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Kv => "kv",
      Self::Relationship => "relationship",
      Self::Preference => "preference",
      Self::Temporal => "temporal",
      Self::Identity => "identity",
      Self::Location => "location",
      Self::Decision => "decision",
      Self::State => "state",
      Self::Config => "config",
    }
  }
}

impl fmt::Display for FactType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FactType {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "kv" => Ok(Self::Kv),
      "relationship" => Ok(Self::Relationship),
      "preference" => Ok(Self::Preference),
      "temporal" => Ok(Self::Temporal),
      "identity" => Ok(Self::Identity),
      "location" => Ok(Self::Location),
      "decision" => Ok(Self::Decision),
      "state" => Ok(Self::State),
      "config" => Ok(Self::Config),
      other => Err(anyhow::anyhow!("unknown fact type: {other}")),
    }
  }
}

/// How a fact was produced (spec §3 `extraction_method`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
  Rules,
  Llm,
  #[serde(rename = "llm-enrich")]
  LlmEnrich,
}

impl fmt::Display for ExtractionMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Rules => write!(f, "rules"),
      Self::Llm => write!(f, "llm"),
      Self::LlmEnrich => write!(f, "llm-enrich"),
    }
  }
}

/// `FactEdge.edge_type` — open-ended in spec ("e.g. relates_to"), but the impact
/// engine (spec §4.6) groups predicates into these semantic buckets, so we give the
/// edge itself the same taxonomy rather than a free string everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
  RelatesTo,
  HasStrategy,
  HasConfig,
  HasTool,
  HasLocation,
  DependsOn,
}

impl fmt::Display for EdgeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::RelatesTo => write!(f, "relates_to"),
      Self::HasStrategy => write!(f, "has_strategy"),
      Self::HasConfig => write!(f, "has_config"),
      Self::HasTool => write!(f, "has_tool"),
      Self::HasLocation => write!(f, "has_location"),
      Self::DependsOn => write!(f, "depends_on"),
    }
  }
}

impl FromStr for EdgeType {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "relates_to" => Ok(Self::RelatesTo),
      "has_strategy" => Ok(Self::HasStrategy),
      "has_config" => Ok(Self::HasConfig),
      "has_tool" => Ok(Self::HasTool),
      "has_location" => Ok(Self::HasLocation),
      "depends_on" => Ok(Self::DependsOn),
      other => Err(anyhow::anyhow!("unknown edge type: {other}")),
    }
  }
}

/// `FactEdge.source` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSource {
  Explicit,
  Inferred,
  Cooccurrence,
}

impl fmt::Display for EdgeSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Explicit => write!(f, "explicit"),
      Self::Inferred => write!(f, "inferred"),
      Self::Cooccurrence => write!(f, "cooccurrence"),
    }
  }
}
