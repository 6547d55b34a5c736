/* Contracted Gaussian type orbitals (CGTO) built on the primitives in gto.rs,
   plus the NWChem reader used for electronic and nuclear basis sets.
*/

use crate::basis::Basis;
use crate::gto::GTO;
use crate::BasisError;
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use serde::{Deserialize, Serialize};

/// A normalised contraction of primitives sharing one centre and one
/// Cartesian angular part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractedGTO {
    pub primitives: Vec<GTO>,
    pub coefficients: Vec<f64>,
    // shell label: s, px, dxy, ...
    pub shell_type: String,
    pub center: Vector3<f64>,
    pub l_xyz: Vector3<i32>,
}

impl ContractedGTO {
    pub fn new(
        exponents: &[f64],
        coefficients: &[f64],
        l_xyz: Vector3<i32>,
        center: Vector3<f64>,
        shell_type: &str,
    ) -> Self {
        let primitives = exponents
            .iter()
            .map(|&alpha| GTO::new(alpha, l_xyz, center))
            .collect();
        let mut cgto = ContractedGTO {
            primitives,
            coefficients: coefficients.to_vec(),
            shell_type: shell_type.to_string(),
            center,
            l_xyz,
        };
        cgto.normalize();
        cgto
    }

    fn normalize(&mut self) {
        let s = ContractedGTO::Sab(self, self);
        if s > 0.0 {
            let scale = 1.0 / s.sqrt();
            self.coefficients.iter_mut().for_each(|c| *c *= scale);
        }
    }

    pub fn angular_momentum(&self) -> i32 {
        self.l_xyz.x + self.l_xyz.y + self.l_xyz.z
    }

    /// Radius beyond which every primitive term is below `cutoff` in magnitude.
    pub fn radial_extent(&self, cutoff: f64) -> f64 {
        let l = self.angular_momentum() as f64;
        self.primitives
            .iter()
            .zip(&self.coefficients)
            .map(|(g, &c)| {
                let scale = (c * g.norm).abs();
                if scale <= cutoff {
                    return 0.0;
                }
                let log_ratio = (scale / cutoff).ln();
                let mut r = (log_ratio / g.alpha).sqrt();
                // r^l e^{-alpha r^2} = cutoff / scale, fixed point on r
                for _ in 0..8 {
                    if r <= 1.0 {
                        break;
                    }
                    r = ((log_ratio + l * r.ln()) / g.alpha).sqrt();
                }
                r
            })
            .fold(0.0, f64::max)
    }
}

impl Basis for ContractedGTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.primitives
            .iter()
            .zip(&self.coefficients)
            .map(|(g, c)| c * g.evaluate(r))
            .sum()
    }

    fn Sab(a: &Self, b: &Self) -> f64 {
        let mut s = 0.0;
        for (ga, ca) in a.primitives.iter().zip(&a.coefficients) {
            for (gb, cb) in b.primitives.iter().zip(&b.coefficients) {
                s += ca * cb * GTO::Sab(ga, gb);
            }
        }
        s
    }

    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64 {
        let mut val = 0.0;
        for (ga, ca) in a.primitives.iter().zip(&a.coefficients) {
            for (gb, cb) in b.primitives.iter().zip(&b.coefficients) {
                let cab = ca * cb;
                for (gc, cc) in c.primitives.iter().zip(&c.coefficients) {
                    for (gd, cd) in d.primitives.iter().zip(&d.coefficients) {
                        val += cab * cc * cd * GTO::JKabcd(ga, gb, gc, gd);
                    }
                }
            }
        }
        val
    }
}

fn cartesian_components(shell: &str) -> Option<Vec<(&'static str, Vector3<i32>)>> {
    let comps = match shell {
        "S" => vec![("s", Vector3::new(0, 0, 0))],
        "P" => vec![
            ("px", Vector3::new(1, 0, 0)),
            ("py", Vector3::new(0, 1, 0)),
            ("pz", Vector3::new(0, 0, 1)),
        ],
        "D" => vec![
            ("dxx", Vector3::new(2, 0, 0)),
            ("dxy", Vector3::new(1, 1, 0)),
            ("dxz", Vector3::new(1, 0, 1)),
            ("dyy", Vector3::new(0, 2, 0)),
            ("dyz", Vector3::new(0, 1, 1)),
            ("dzz", Vector3::new(0, 0, 2)),
        ],
        _ => return None,
    };
    Some(comps)
}

fn parse_nwchem_float(token: &str) -> Result<f64, BasisError> {
    token
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|_| BasisError::InvalidNumber(token.to_string()))
}

/// Basis functions of one atom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasisSet {
    // element symbol
    pub name: String,
    pub atomic_number: u32,
    pub basis_set: Vec<ContractedGTO>,
}

impl BasisSet {
    // Example of nwchem format:
    // BASIS "ao basis" PRINT
    // H    S
    //       3.42525091             0.15432897
    //       0.62391373             0.53532814
    //       0.16885540             0.44463454
    // O    SP
    //       5.03315130            -0.09996723             0.15591627
    //       ...
    // END

    /// Parses an NWChem-formatted basis for a single element placed at `center`.
    pub fn parse_nwchem(input: &str, center: Vector3<f64>) -> Result<Self, BasisError> {
        let mut basis = BasisSet {
            name: String::new(),
            atomic_number: 0,
            basis_set: Vec::new(),
        };

        let mut current_shell: Option<String> = None;
        let mut exponents: Vec<f64> = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let head = tokens[0];
            if head.eq_ignore_ascii_case("BASIS") || head.eq_ignore_ascii_case("END") {
                continue;
            }

            if head.chars().all(char::is_alphabetic) {
                if tokens.len() < 2 {
                    return Err(BasisError::Malformed(line.to_string()));
                }
                let element = Element::from_symbol(head)
                    .ok_or_else(|| BasisError::UnknownElement(head.to_string()))?;
                if basis.name.is_empty() {
                    basis.name = element.get_symbol().to_string();
                    basis.atomic_number = element.get_atomic_number() as u32;
                } else if basis.name != element.get_symbol() {
                    return Err(BasisError::MixedElements(
                        basis.name.clone(),
                        head.to_string(),
                    ));
                }

                if let Some(shell) = current_shell.take() {
                    basis.push_block(&shell, &exponents, &columns, center)?;
                }
                current_shell = Some(tokens[1].to_uppercase());
                exponents.clear();
                columns.clear();
                continue;
            }

            if current_shell.is_none() {
                return Err(BasisError::Malformed(line.to_string()));
            }
            let numbers = tokens
                .iter()
                .map(|t| parse_nwchem_float(t))
                .collect::<Result<Vec<f64>, _>>()?;
            if numbers.len() < 2 {
                return Err(BasisError::Malformed(line.to_string()));
            }
            exponents.push(numbers[0]);
            if columns.is_empty() {
                columns = vec![Vec::new(); numbers.len() - 1];
            }
            if columns.len() != numbers.len() - 1 {
                return Err(BasisError::Malformed(line.to_string()));
            }
            for (col, &value) in columns.iter_mut().zip(&numbers[1..]) {
                col.push(value);
            }
        }

        if let Some(shell) = current_shell {
            basis.push_block(&shell, &exponents, &columns, center)?;
        }

        if basis.basis_set.is_empty() {
            return Err(BasisError::Empty);
        }
        Ok(basis)
    }

    fn push_block(
        &mut self,
        shell: &str,
        exponents: &[f64],
        columns: &[Vec<f64>],
        center: Vector3<f64>,
    ) -> Result<(), BasisError> {
        // SP blocks carry one coefficient column per angular part
        let parts: Vec<String> = if shell == "SP" {
            vec!["S".to_string(), "P".to_string()]
        } else {
            vec![shell.to_string()]
        };
        if parts.len() != columns.len() {
            return Err(BasisError::Malformed(format!(
                "{} shell with {} coefficient columns",
                shell,
                columns.len()
            )));
        }

        for (part, coeffs) in parts.iter().zip(columns) {
            let comps = cartesian_components(part)
                .ok_or_else(|| BasisError::UnsupportedShell(part.clone()))?;
            for (label, l_xyz) in comps {
                self.basis_set
                    .push(ContractedGTO::new(exponents, coeffs, l_xyz, center, label));
            }
        }
        Ok(())
    }

    /// Uncontracted s functions, the usual form of a nuclear basis.
    pub fn from_s_exponents(element: Element, exponents: &[f64], center: Vector3<f64>) -> Self {
        let basis_set = exponents
            .iter()
            .map(|&alpha| ContractedGTO::new(&[alpha], &[1.0], Vector3::zeros(), center, "s"))
            .collect();
        BasisSet {
            name: element.get_symbol().to_string(),
            atomic_number: element.get_atomic_number() as u32,
            basis_set,
        }
    }

    /// Even-tempered s exponents alpha_k = alpha_0 * beta^k.
    pub fn even_tempered_s(
        element: Element,
        alpha_0: f64,
        beta: f64,
        count: usize,
        center: Vector3<f64>,
    ) -> Self {
        let exponents: Vec<f64> = (0..count).map(|k| alpha_0 * beta.powi(k as i32)).collect();
        BasisSet::from_s_exponents(element, &exponents, center)
    }

    pub fn len(&self) -> usize {
        self.basis_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basis_set.is_empty()
    }
}
