//! Crate-level error type.

use thiserror::Error;

use crate::pixel_grid::GridError;
use crate::registration::RegistrationError;
use crate::stacking;

/// Any error an end-to-end run can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Invalid pixel data: {0}")]
    Grid(#[from] GridError),

    #[error("Registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Stacking failed: {0}")]
    Stacking(#[from] stacking::Error),
}
