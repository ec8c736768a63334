//! Input validation errors.
//!
//! Stages never return these directly: a failed validation becomes an
//! `InsufficientResources` envelope carrying the error text.

use crate::ResourceId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("No input resources provided")]
    Empty,

    /// NaN or infinite quantity.
    #[error("Invalid quantity type for resource {id}: {quantity}")]
    NonNumeric { id: ResourceId, quantity: f64 },

    #[error("Invalid quantity for resource {id}: {quantity}")]
    NonPositive { id: ResourceId, quantity: f64 },
}
