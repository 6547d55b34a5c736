//! Electron-proton correlation functionals of the epc17 and epc18 families.
//!
//! Both families are local in the two densities. Family 17:
//!
//!   P = ρe ρn,  s = √P,  D = a - b s + c P
//!   ε = -ρe / D
//!   vn = (-a ρe + ½ b ρe s) / D²
//!   ve = (-a ρn + ½ b ρn s) / D²
//!
//! Family 18 works with cube roots, β = ρe^⅓ + ρn^⅓, D = a - b β³ + c β⁶:
//!
//!   ε = -ρe / D
//!   vn = -(a ρe - b ρe^{4/3} β² + c ρe β⁵ (ρe^⅓ - ρn^⅓)) / D²
//!   ve = -(a ρn - b ρn^{4/3} β² + c ρn β⁵ (ρn^⅓ - ρe^⅓)) / D²
//!
//! The energy is ∫ ρn ε, so ε is an energy per unit nuclear density.

use crate::error::{NeoError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

const DEFAULT_EPC_TYPE: &str = "17-2";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EpcFamily {
    Epc17,
    Epc18,
}

/// Published parametrisations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EpcPreset {
    Epc17_1,
    Epc17_2,
    Epc18_1,
    Epc18_2,
}

impl EpcPreset {
    pub const ALL: [EpcPreset; 4] = [
        EpcPreset::Epc17_1,
        EpcPreset::Epc17_2,
        EpcPreset::Epc18_1,
        EpcPreset::Epc18_2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EpcPreset::Epc17_1 => "17-1",
            EpcPreset::Epc17_2 => "17-2",
            EpcPreset::Epc18_1 => "18-1",
            EpcPreset::Epc18_2 => "18-2",
        }
    }

    pub fn params(&self) -> EpcParams {
        match self {
            EpcPreset::Epc17_1 => EpcParams::new(EpcFamily::Epc17, 2.35, 2.4, 3.2),
            EpcPreset::Epc17_2 => EpcParams::new(EpcFamily::Epc17, 2.35, 2.4, 6.6),
            EpcPreset::Epc18_1 => EpcParams::new(EpcFamily::Epc18, 1.8, 0.1, 0.03),
            EpcPreset::Epc18_2 => EpcParams::new(EpcFamily::Epc18, 3.9, 0.5, 0.06),
        }
    }
}

impl FromStr for EpcPreset {
    type Err = NeoError;

    fn from_str(s: &str) -> Result<Self> {
        EpcPreset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| NeoError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for EpcPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epc{}", self.name())
    }
}

/// Resolved functional: family and the (a, b, c) triple.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpcParams {
    pub family: EpcFamily,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl EpcParams {
    pub fn new(family: EpcFamily, a: f64, b: f64, c: f64) -> Self {
        Self { family, a, b, c }
    }

    /// (ε, vn, ve) at one point; densities are expected to be non-negative.
    #[inline]
    pub fn evaluate_point(&self, rho_e: f64, rho_n: f64) -> (f64, f64, f64) {
        let (a, b, c) = (self.a, self.b, self.c);
        match self.family {
            EpcFamily::Epc17 => {
                let rho_prod = rho_e * rho_n;
                let rho_sqrt = rho_prod.sqrt();
                let denom = a - b * rho_sqrt + c * rho_prod;
                let denom2 = denom * denom;

                let exc = -rho_e / denom;
                let vxc_n = (-a * rho_e + 0.5 * b * rho_e * rho_sqrt) / denom2;
                let vxc_e = (-a * rho_n + 0.5 * b * rho_n * rho_sqrt) / denom2;
                (exc, vxc_n, vxc_e)
            }
            EpcFamily::Epc18 => {
                let cbrt_e = rho_e.cbrt();
                let cbrt_n = rho_n.cbrt();
                let beta = cbrt_e + cbrt_n;
                let beta2 = beta * beta;
                let beta3 = beta * beta2;
                let beta5 = beta2 * beta3;
                let beta6 = beta3 * beta3;
                let denom = a - b * beta3 + c * beta6;
                let denom2 = denom * denom;

                let exc = -rho_e / denom;
                let numer_n =
                    a * rho_e - b * cbrt_e.powi(4) * beta2 + c * rho_e * beta5 * (cbrt_e - cbrt_n);
                let numer_e =
                    a * rho_n - b * cbrt_n.powi(4) * beta2 + c * rho_n * beta5 * (cbrt_n - cbrt_e);
                (exc, -numer_n / denom2, -numer_e / denom2)
            }
        }
    }
}

/// Which EPC functional to use and for which nuclei.
#[derive(Clone, Debug, PartialEq)]
pub enum EpcFunctional {
    /// Named preset, applied to every quantum hydrogen.
    Preset(EpcPreset),
    /// Explicit parameters restricted to the listed nuclei (atom indices).
    Explicit {
        params: EpcParams,
        nuclei: BTreeSet<usize>,
    },
}

impl EpcFunctional {
    pub fn params(&self) -> EpcParams {
        match self {
            EpcFunctional::Preset(preset) => preset.params(),
            EpcFunctional::Explicit { params, .. } => *params,
        }
    }

    pub fn applies_to_nucleus(&self, index: usize) -> bool {
        match self {
            EpcFunctional::Preset(_) => true,
            EpcFunctional::Explicit { nuclei, .. } => nuclei.contains(&index),
        }
    }
}

impl FromStr for EpcFunctional {
    type Err = NeoError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(EpcFunctional::Preset(s.parse()?))
    }
}

impl fmt::Display for EpcFunctional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpcFunctional::Preset(preset) => write!(f, "{}", preset),
            EpcFunctional::Explicit { params, nuclei } => {
                let family = match params.family {
                    EpcFamily::Epc17 => "17",
                    EpcFamily::Epc18 => "18",
                };
                write!(
                    f,
                    "epc{}(a={}, b={}, c={}) on nuclei {:?}",
                    family, params.a, params.b, params.c, nuclei
                )
            }
        }
    }
}

/// EPC settings as written in a configuration file: either a preset name
/// or a record with `epc_type`, `a`, `b`, `c` and `epc_nuc`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpcConfig {
    Name(String),
    Record(EpcRecord),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpcRecord {
    /// `17`, `18` or a preset name. YAML may write the family unquoted.
    #[serde(default, deserialize_with = "string_or_number")]
    pub epc_type: Option<String>,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,
    pub epc_nuc: Option<BTreeSet<usize>>,
}

fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(x) => x.to_string(),
    }))
}

impl TryFrom<EpcConfig> for EpcFunctional {
    type Error = NeoError;

    fn try_from(config: EpcConfig) -> Result<Self> {
        match config {
            EpcConfig::Name(name) => name.parse(),
            EpcConfig::Record(record) => {
                let epc_type = record
                    .epc_type
                    .unwrap_or_else(|| DEFAULT_EPC_TYPE.to_string());
                let params = match epc_type.as_str() {
                    "17" | "18" => {
                        let family = if epc_type == "17" {
                            EpcFamily::Epc17
                        } else {
                            EpcFamily::Epc18
                        };
                        let a = record
                            .a
                            .ok_or_else(|| NeoError::MissingParameter("a", epc_type.clone()))?;
                        let b = record
                            .b
                            .ok_or_else(|| NeoError::MissingParameter("b", epc_type.clone()))?;
                        let c = record
                            .c
                            .ok_or_else(|| NeoError::MissingParameter("c", epc_type.clone()))?;
                        EpcParams::new(family, a, b, c)
                    }
                    name => name.parse::<EpcPreset>()?.params(),
                };
                let nuclei = record
                    .epc_nuc
                    .ok_or_else(|| NeoError::MissingParameter("epc_nuc", epc_type.clone()))?;
                Ok(EpcFunctional::Explicit { params, nuclei })
            }
        }
    }
}

/// Pointwise EPC output, one entry per grid point.
#[derive(Clone, Debug, PartialEq)]
pub struct EpcValues {
    pub exc: Vec<f64>,
    pub vxc_n: Vec<f64>,
    pub vxc_e: Vec<f64>,
}

/// Evaluates the functional on paired electronic and nuclear densities.
pub fn eval_epc(params: &EpcParams, rho_e: &[f64], rho_n: &[f64]) -> EpcValues {
    assert_eq!(
        rho_e.len(),
        rho_n.len(),
        "electronic and nuclear densities must live on the same points"
    );

    let n = rho_e.len();
    let mut values = EpcValues {
        exc: Vec::with_capacity(n),
        vxc_n: Vec::with_capacity(n),
        vxc_e: Vec::with_capacity(n),
    };
    for (&re, &rn) in rho_e.iter().zip(rho_n) {
        let (exc, vn, ve) = params.evaluate_point(re, rn);
        values.exc.push(exc);
        values.vxc_n.push(vn);
        values.vxc_e.push(ve);
    }
    values
}
