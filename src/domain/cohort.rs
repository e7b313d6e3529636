//! Size-based peer cohorts.

use serde::{Deserialize, Serialize};

use super::id::InstitutionId;

/// An institution's size at one period, as used for peer selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePoint {
    pub institution_id: InstitutionId,
    pub size: f64,
}

impl SizePoint {
    pub fn new(institution_id: impl Into<InstitutionId>, size: f64) -> Self {
        Self {
            institution_id: institution_id.into(),
            size,
        }
    }
}

/// Peers selected for a target institution at one period.
///
/// Both sides are ordered closest-to-target first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerCohort {
    pub larger: Vec<InstitutionId>,
    pub smaller: Vec<InstitutionId>,
}

impl PeerCohort {
    /// Total number of peers on both sides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.larger.len() + self.smaller.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.larger.is_empty() && self.smaller.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &InstitutionId) -> bool {
        self.larger.contains(id) || self.smaller.contains(id)
    }

    /// Larger peers followed by smaller peers.
    pub fn members(&self) -> impl Iterator<Item = &InstitutionId> {
        self.larger.iter().chain(self.smaller.iter())
    }
}
