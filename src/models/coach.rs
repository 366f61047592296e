//! Coach entity.

use serde::{Deserialize, Serialize};

/// Unique identifier for a coach.
pub type CoachId = u64;

/// A coach. May be assigned to at most one team at a time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    pub id: CoachId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}
