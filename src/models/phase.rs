use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Pipeline segment a stage belongs to.
///
/// Phases are totally ordered by rank: `Lead < Production < PostProduction`.
/// Comparison always goes through [`Phase::rank`], never through the
/// serialized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lead,
    Production,
    PostProduction,
}

impl Phase {
    /// All phases in rank order.
    pub const ALL: [Phase; 3] = [Phase::Lead, Phase::Production, Phase::PostProduction];

    pub fn rank(self) -> u8 {
        match self {
            Phase::Lead => 0,
            Phase::Production => 1,
            Phase::PostProduction => 2,
        }
    }

    /// Human-readable label used by the CLI steppers.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Lead => "Lead",
            Phase::Production => "Production",
            Phase::PostProduction => "Post-Production",
        }
    }
}

impl Ord for Phase {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Phase {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Lead => write!(f, "LEAD"),
            Phase::Production => write!(f, "PRODUCTION"),
            Phase::PostProduction => write!(f, "POST_PRODUCTION"),
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "lead" => Ok(Phase::Lead),
            "production" => Ok(Phase::Production),
            "post_production" | "postproduction" => Ok(Phase::PostProduction),
            _ => anyhow::bail!("Invalid phase: {s}. Use: lead, production, post-production"),
        }
    }
}
