#![allow(non_snake_case)]
extern crate nalgebra as na;

use crate::basis::Basis;
use crate::helper::boys_function;
use itertools::iproduct;
use na::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// One Cartesian factor N x^l exp(-alpha x^2) of a primitive Gaussian.
#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO1d {
    pub alpha: f64,
    pub l: i32,
    pub center: f64,
    pub norm: f64,
}

fn factorial(n: i32) -> f64 {
    (1..=n).fold(1.0, |acc, x| acc * x as f64)
}

impl GTO1d {
    pub fn new(alpha: f64, l: i32, center: f64) -> Self {
        let norm = GTO1d::compute_norm(alpha, l);
        Self {
            alpha,
            l,
            center,
            norm,
        }
    }

    // N^2 = 2^(3l) l! alpha^l sqrt(2 alpha / pi) / (2l)!
    fn compute_norm(alpha: f64, l: i32) -> f64 {
        let numerator = 2.0_f64.powi(3 * l) * factorial(l) * alpha.powi(l);
        let n_squared = numerator * (2.0 * alpha / PI).sqrt() / factorial(2 * l);
        n_squared.sqrt()
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let x = x - self.center;
        self.norm * x.powi(self.l) * (-self.alpha * x * x).exp()
    }

    /// Hermite expansion coefficient E^{ij}_t of the Gaussian product
    /// (McMurchie-Davidson), `Qx` is the separation A - B.
    pub fn Eab(i: i32, j: i32, t: i32, Qx: f64, a: f64, b: f64) -> f64 {
        let p = a + b;
        let q = a * b / p;

        if t < 0 || t > i + j || i < 0 || j < 0 {
            0.0
        } else if i == 0 && j == 0 && t == 0 {
            (-q * Qx * Qx).exp()
        } else if j == 0 {
            GTO1d::Eab(i - 1, j, t - 1, Qx, a, b) / (2.0 * p)
                - GTO1d::Eab(i - 1, j, t, Qx, a, b) * q * Qx / a
                + GTO1d::Eab(i - 1, j, t + 1, Qx, a, b) * (t + 1) as f64
        } else {
            GTO1d::Eab(i, j - 1, t - 1, Qx, a, b) / (2.0 * p)
                + GTO1d::Eab(i, j - 1, t, Qx, a, b) * q * Qx / b
                + GTO1d::Eab(i, j - 1, t + 1, Qx, a, b) * (t + 1) as f64
        }
    }

    pub(crate) fn Sab(a: &GTO1d, b: &GTO1d) -> f64 {
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        GTO1d::Eab(a.l, b.l, 0, Qx, a.alpha, b.alpha) * (PI / p).sqrt() * a.norm * b.norm
    }
}

/// Normalised Cartesian primitive Gaussian x^lx y^ly z^lz exp(-alpha r^2).
#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO {
    pub alpha: f64,
    pub l_xyz: Vector3<i32>,
    pub center: Vector3<f64>,
    pub norm: f64,
    pub gto1d: [GTO1d; 3],
}

impl GTO {
    pub fn new(alpha: f64, l_xyz: Vector3<i32>, center: Vector3<f64>) -> Self {
        let gto1d = [
            GTO1d::new(alpha, l_xyz.x, center.x),
            GTO1d::new(alpha, l_xyz.y, center.y),
            GTO1d::new(alpha, l_xyz.z, center.z),
        ];
        let norm = gto1d[0].norm * gto1d[1].norm * gto1d[2].norm;
        Self {
            alpha,
            l_xyz,
            center,
            norm,
            gto1d,
        }
    }

    pub fn angular_momentum(&self) -> i32 {
        self.l_xyz.x + self.l_xyz.y + self.l_xyz.z
    }

    /// Hermite Coulomb integral R^n_{tuv}(p, R_PC), Helgaker/Jørgensen/Olsen recursion.
    pub fn hermite_coulomb(
        t: i32,
        u: i32,
        v: i32,
        n: i32,
        p: f64,
        PCx: f64,
        PCy: f64,
        PCz: f64,
        RPC: f64,
    ) -> f64 {
        if t < 0 || u < 0 || v < 0 {
            return 0.0;
        }

        if t == 0 && u == 0 && v == 0 {
            return (-2.0 * p).powi(n) * boys_function(n, p * RPC * RPC);
        }

        if t == 0 && u == 0 {
            (v - 1) as f64 * GTO::hermite_coulomb(t, u, v - 2, n + 1, p, PCx, PCy, PCz, RPC)
                + PCz * GTO::hermite_coulomb(t, u, v - 1, n + 1, p, PCx, PCy, PCz, RPC)
        } else if t == 0 {
            (u - 1) as f64 * GTO::hermite_coulomb(t, u - 2, v, n + 1, p, PCx, PCy, PCz, RPC)
                + PCy * GTO::hermite_coulomb(t, u - 1, v, n + 1, p, PCx, PCy, PCz, RPC)
        } else {
            (t - 1) as f64 * GTO::hermite_coulomb(t - 2, u, v, n + 1, p, PCx, PCy, PCz, RPC)
                + PCx * GTO::hermite_coulomb(t - 1, u, v, n + 1, p, PCx, PCy, PCz, RPC)
        }
    }

    fn product_center(a: &GTO, b: &GTO) -> Vector3<f64> {
        (a.center * a.alpha + b.center * b.alpha) / (a.alpha + b.alpha)
    }
}

impl Basis for GTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.gto1d[0].evaluate(r.x) * self.gto1d[1].evaluate(r.y) * self.gto1d[2].evaluate(r.z)
    }

    fn Sab(a: &GTO, b: &GTO) -> f64 {
        GTO1d::Sab(&a.gto1d[0], &b.gto1d[0])
            * GTO1d::Sab(&a.gto1d[1], &b.gto1d[1])
            * GTO1d::Sab(&a.gto1d[2], &b.gto1d[2])
    }

    fn JKabcd(a: &GTO, b: &GTO, c: &GTO, d: &GTO) -> f64 {
        let p = a.alpha + b.alpha;
        let q = c.alpha + d.alpha;
        let alpha = p * q / (p + q);
        let dr = GTO::product_center(a, b) - GTO::product_center(c, d);
        let rpq = dr.norm();
        let dab = a.center - b.center;
        let dcd = c.center - d.center;
        let lab = a.l_xyz + b.l_xyz;
        let lcd = c.l_xyz + d.l_xyz;

        let val: f64 = iproduct!(
            0..=lab.x,
            0..=lab.y,
            0..=lab.z,
            0..=lcd.x,
            0..=lcd.y,
            0..=lcd.z
        )
        .map(|(t, u, v, tau, nu, phi)| {
            let eab = GTO1d::Eab(a.l_xyz.x, b.l_xyz.x, t, dab.x, a.alpha, b.alpha)
                * GTO1d::Eab(a.l_xyz.y, b.l_xyz.y, u, dab.y, a.alpha, b.alpha)
                * GTO1d::Eab(a.l_xyz.z, b.l_xyz.z, v, dab.z, a.alpha, b.alpha);
            if eab == 0.0 {
                return 0.0;
            }
            let ecd = GTO1d::Eab(c.l_xyz.x, d.l_xyz.x, tau, dcd.x, c.alpha, d.alpha)
                * GTO1d::Eab(c.l_xyz.y, d.l_xyz.y, nu, dcd.y, c.alpha, d.alpha)
                * GTO1d::Eab(c.l_xyz.z, d.l_xyz.z, phi, dcd.z, c.alpha, d.alpha);
            let sgn = if (tau + nu + phi) % 2 == 0 { 1.0 } else { -1.0 };
            eab * ecd
                * sgn
                * GTO::hermite_coulomb(t + tau, u + nu, v + phi, 0, alpha, dr.x, dr.y, dr.z, rpq)
        })
        .sum();

        a.norm * b.norm * c.norm * d.norm * val * 2.0 * PI.powf(2.5) / (p * q * (p + q).sqrt())
    }
}
