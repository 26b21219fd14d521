// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::store::collections;

/// The kinds of organization a player can be affiliated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationKind {
    Club,
    Academy,
    Trainer,
    Agent,
}

impl OrganizationKind {
    /// Probe order when a document carries more than one affiliation id
    pub const ALL: [OrganizationKind; 4] = [
        OrganizationKind::Club,
        OrganizationKind::Academy,
        OrganizationKind::Trainer,
        OrganizationKind::Agent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrganizationKind::Club => "club",
            OrganizationKind::Academy => "academy",
            OrganizationKind::Trainer => "trainer",
            OrganizationKind::Agent => "agent",
        }
    }

    /// Canonical affiliation key on a player document
    pub fn id_field(self) -> &'static str {
        match self {
            OrganizationKind::Club => "club_id",
            OrganizationKind::Academy => "academy_id",
            OrganizationKind::Trainer => "trainer_id",
            OrganizationKind::Agent => "agent_id",
        }
    }

    /// Legacy camelCase affiliation key
    pub fn legacy_id_field(self) -> &'static str {
        match self {
            OrganizationKind::Club => "clubId",
            OrganizationKind::Academy => "academyId",
            OrganizationKind::Trainer => "trainerId",
            OrganizationKind::Agent => "agentId",
        }
    }

    /// Collections searched for the organization document, in order
    pub fn collections(self) -> [&'static str; 3] {
        match self {
            OrganizationKind::Club => [collections::CLUBS, "club", collections::USERS],
            OrganizationKind::Academy => [collections::ACADEMIES, "academy", collections::USERS],
            OrganizationKind::Trainer => [collections::TRAINERS, "trainer", collections::USERS],
            OrganizationKind::Agent => [collections::AGENTS, "agent", collections::USERS],
        }
    }

    /// Storage bucket holding images of players affiliated with this kind
    pub fn player_bucket(self) -> &'static str {
        match self {
            OrganizationKind::Club => "playerclub",
            OrganizationKind::Academy => "playeracademy",
            OrganizationKind::Trainer => "playertrainer",
            OrganizationKind::Agent => "playeragent",
        }
    }

    pub fn from_account_type(account_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == account_type.trim())
    }
}

impl std::fmt::Display for OrganizationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An organization as shown next to an affiliated player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: String,
    pub kind: OrganizationKind,
    pub name: Option<String>,
    pub image: Option<String>,
    pub is_deleted: bool,
    /// Collection the document was found in
    pub collection: String,
}
