use crate::component::ComponentKind;
use basis::BasisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NeoError {
    #[error("unknown EPC type '{0}', expected one of 17-1, 17-2, 18-1, 18-2 (or 17, 18 with explicit parameters)")]
    UnknownPreset(String),
    #[error("EPC parameter '{0}' is required for epc_type {1}")]
    MissingParameter(&'static str, String),
    #[error("density matrix supplied for component {0}, which is not part of the system")]
    UnknownComponent(ComponentKind),
    #[error("missing {what} for component {kind}")]
    MissingInput {
        what: &'static str,
        kind: ComponentKind,
    },
    #[error("{what} for component {kind} has shape {found:?}, the basis has {expected} functions")]
    DimensionMismatch {
        what: &'static str,
        kind: ComponentKind,
        expected: usize,
        found: (usize, usize),
    },
    #[error("invalid component label '{0}', expected e, n<index> or p<index>")]
    InvalidComponentLabel(String),
    #[error(transparent)]
    Basis(#[from] BasisError),
}

pub type Result<T> = std::result::Result<T, NeoError>;
