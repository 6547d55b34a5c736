//! Gaussian basis functions: primitives, contractions, NWChem input and the
//! per-component AO basis used for grid evaluation and Coulomb matrices.

pub mod basis;
pub mod cgto;
pub mod gto;
pub mod helper;


use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BasisError {
    #[error("unknown element symbol '{0}' in basis input")]
    UnknownElement(String),
    #[error("basis input mixes elements {0} and {1}")]
    MixedElements(String, String),
    #[error("unsupported shell type '{0}'")]
    UnsupportedShell(String),
    #[error("cannot parse number '{0}' in basis input")]
    InvalidNumber(String),
    #[error("malformed basis line: {0}")]
    Malformed(String),
    #[error("basis input contains no shells")]
    Empty,
}
