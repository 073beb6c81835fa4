//! Error taxonomy for the scoring core.
//!
//! Validation and state-conflict errors are refused locally and never reach
//! the persistence collaborator; transport errors propagate per operation
//! with no automatic retry. Partial batch failure is an aggregate reported
//! by the batch coordinator, not an error type here.

use thiserror::Error;

use crate::domain::Section;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// An interaction value would be persisted outside its declared bounds.
    /// Never clamped; the prior field state stays untouched.
    #[error("value {value} out of range [{low}, {high}] for {section} question {id}")]
    OutOfRange { section: Section, id: u8, value: f64, low: f64, high: f64 },

    /// The interaction state kind does not match the question's mode
    /// (e.g. a checkbox payload sent for a numeric-score question).
    #[error("wrong interaction kind for {section} question {id}")]
    WrongKind { section: Section, id: u8 },

    /// No such question in this sheet type's layout. Placeholder (retired)
    /// catalog entries resolve here as well: they own no physical field.
    #[error("no field mapped for {section} question {id}")]
    UnknownQuestion { section: Section, id: u8 },

    /// Mutation attempted on a sheet that has already been submitted.
    #[error("sheet {sheet_id} is already submitted")]
    AlreadySubmitted { sheet_id: String },

    /// Submit attempted before every required score is filled in.
    #[error("sheet {sheet_id} is not complete")]
    Incomplete { sheet_id: String },

    /// The persistence collaborator has no such sheet.
    #[error("sheet not found")]
    NotFound,

    /// The persistence collaborator failed or was unreachable.
    #[error("scores api: {0}")]
    Transport(String),
}
