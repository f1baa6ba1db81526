use serde::Serialize;

use super::gateway::Gateway;
use super::ids::ProjectUid;

/// Root of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub uid: ProjectUid,
    pub name: String,
    pub description: Option<String>,
    pub gateways: Vec<Gateway>,
}

impl Project {
    pub fn gateway(&self, uid: &str) -> Option<&Gateway> {
        self.gateways.iter().find(|g| g.uid == uid)
    }
}
