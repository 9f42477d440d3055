use serde::{Deserialize, Serialize};

use crate::models::{StageId, TemplateId};

/// A cached view that a mutation can affect and that can be refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QueryScope {
    /// The template list
    Templates,
    /// Detail view of one template
    Template(TemplateId),
    /// Stage list of one template
    Stages(TemplateId),
    /// Detail view of one stage
    Stage(StageId),
}

impl std::fmt::Display for QueryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryScope::Templates => write!(f, "templates"),
            QueryScope::Template(id) => write!(f, "template:{id}"),
            QueryScope::Stages(id) => write!(f, "stages:{id}"),
            QueryScope::Stage(id) => write!(f, "stage:{id}"),
        }
    }
}
