//! CRM sales pipeline: the fixed, ordered stage table and interaction kinds.
//!
//! A prospect's `probability` is never set directly. It always comes from
//! [`ProspectStage::probability`] for the stage the prospect is in.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Pipeline stages in funnel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProspectStage {
    Prospect,
    Contact,
    Negotiation,
    Customer,
}

/// Serializable row of the stage table, returned by `GET /crm/stages`.
#[derive(Debug, Clone, Serialize)]
pub struct StageInfo {
    pub stage: ProspectStage,
    pub name: &'static str,
    pub probability: i64,
    pub color: &'static str,
    pub order: u8,
}

impl ProspectStage {
    /// All stages in funnel order.
    pub const ALL: [ProspectStage; 4] = [
        ProspectStage::Prospect,
        ProspectStage::Contact,
        ProspectStage::Negotiation,
        ProspectStage::Customer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProspectStage::Prospect => "prospect",
            ProspectStage::Contact => "contact",
            ProspectStage::Negotiation => "negotiation",
            ProspectStage::Customer => "customer",
        }
    }

    /// Parse a stored or user-supplied stage name.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid stage '{value}'. Must be one of: {}",
                    Self::ALL.map(|s| s.as_str()).join(", ")
                ))
            })
    }

    /// Win probability (percent) attached to the stage.
    pub fn probability(self) -> i64 {
        match self {
            ProspectStage::Prospect => 25,
            ProspectStage::Contact => 50,
            ProspectStage::Negotiation => 75,
            ProspectStage::Customer => 100,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProspectStage::Prospect => "Prospect",
            ProspectStage::Contact => "Contact",
            ProspectStage::Negotiation => "Negotiation",
            ProspectStage::Customer => "Customer",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ProspectStage::Prospect => "#6c757d",
            ProspectStage::Contact => "#0dcaf0",
            ProspectStage::Negotiation => "#fd7e14",
            ProspectStage::Customer => "#198754",
        }
    }

    /// 1-based position in the funnel.
    pub fn order(self) -> u8 {
        match self {
            ProspectStage::Prospect => 1,
            ProspectStage::Contact => 2,
            ProspectStage::Negotiation => 3,
            ProspectStage::Customer => 4,
        }
    }

    pub fn info(self) -> StageInfo {
        StageInfo {
            stage: self,
            name: self.display_name(),
            probability: self.probability(),
            color: self.color(),
            order: self.order(),
        }
    }
}

/// The full stage table in funnel order.
pub fn stage_table() -> Vec<StageInfo> {
    ProspectStage::ALL.into_iter().map(ProspectStage::info).collect()
}

/// Check a stage move for a prospect.
///
/// Any stage can be reached from any other, except that a prospect already
/// converted into a customer record stays in [`ProspectStage::Customer`].
pub fn validate_stage_move(
    current: ProspectStage,
    target: ProspectStage,
    converted: bool,
) -> Result<(), CoreError> {
    if converted && current == ProspectStage::Customer && target != ProspectStage::Customer {
        return Err(CoreError::Conflict(
            "Prospect was converted into a customer and cannot leave the customer stage"
                .to_string(),
        ));
    }
    Ok(())
}

pub const INTERACTION_CALL: &str = "call";
pub const INTERACTION_EMAIL: &str = "email";
pub const INTERACTION_WHATSAPP: &str = "whatsapp";
pub const INTERACTION_MEETING: &str = "meeting";
pub const INTERACTION_VISIT: &str = "visit";
pub const INTERACTION_OTHER: &str = "other";

/// All valid interaction kinds.
pub const INTERACTION_KINDS: &[&str] = &[
    INTERACTION_CALL,
    INTERACTION_EMAIL,
    INTERACTION_WHATSAPP,
    INTERACTION_MEETING,
    INTERACTION_VISIT,
    INTERACTION_OTHER,
];

/// Validate that an interaction kind is one of the accepted values.
pub fn validate_interaction_kind(kind: &str) -> Result<(), CoreError> {
    if INTERACTION_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid interaction kind '{kind}'. Must be one of: {}",
            INTERACTION_KINDS.join(", ")
        )))
    }
}
