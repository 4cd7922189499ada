//! Resource-family clients.
//!
//! Each family declares its API version, its models and a table of
//! `Operation` constants, and routes every call through the shared
//! `ManagementClient` pipeline. A family client built with `new` pins its
//! own API version; `with_client` keeps whatever the given client sends.

pub mod apimanagement;
pub mod compute;
pub mod mobileengagement;
pub mod recoveryservices;
pub mod resources;
pub mod storage;

use crate::error::ApiError;
use crate::prepare::Operation;
use crate::validation::{Check, validate};

/// Runs the declared checks for `op`, tagging a violation with its name.
pub(crate) fn preflight(op: &Operation, checks: &[Check<'_>]) -> Result<(), ApiError> {
    validate(checks).map_err(|e| {
        tracing::debug!(operation = op.name, field = %e.field, "rejected by validation");
        ApiError::new(op.name, e)
    })
}
