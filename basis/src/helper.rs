use libm::erf;
use std::f64::consts::PI;

// Above this argument the upward recursion from F_0 is stable.
const BOYS_SERIES_LIMIT: f64 = 30.0;

/// Boys function F_n(x) = ∫_0^1 t^{2n} exp(-x t^2) dt.
///
/// Small arguments use the convergent series
/// F_n(x) = e^{-x} Σ_k (2x)^k / ((2n+1)(2n+3)...(2n+2k+1)),
/// large arguments start from the error function and recurse upwards.
pub fn boys_function(n: i32, x: f64) -> f64 {
    assert!(n >= 0, "Boys function order must be non-negative");
    assert!(x >= 0.0, "x must be nonnegative");

    let order = n as f64;
    if x < 1e-14 {
        return 1.0 / (2.0 * order + 1.0);
    }

    if x < BOYS_SERIES_LIMIT {
        let mut term = 1.0 / (2.0 * order + 1.0);
        let mut sum = term;
        let mut k = 1.0;
        while term > 1e-17 * sum && k < 1000.0 {
            term *= 2.0 * x / (2.0 * order + 2.0 * k + 1.0);
            sum += term;
            k += 1.0;
        }
        return sum * (-x).exp();
    }

    let ex = (-x).exp();
    let mut f = 0.5 * (PI / x).sqrt() * erf(x.sqrt());
    for m in 0..n {
        f = ((2 * m + 1) as f64 * f - ex) / (2.0 * x);
    }
    f
}

// Simpson's rule integration
#[cfg(test)]
pub(crate) fn simpson_integration<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boys_function_at_zero() {
        for n in 0..6 {
            let val = boys_function(n, 0.0);
            assert!((val - 1.0 / (2 * n + 1) as f64).abs() < 1e-14);
        }
    }

    #[test]
    fn test_boys_function_against_quadrature() {
        for &n in &[0, 1, 3] {
            for &x in &[0.1, 2.5, 17.0, 29.9, 30.1, 55.0] {
                let reference =
                    simpson_integration(|t| t.powi(2 * n) * (-x * t * t).exp(), 0.0, 1.0, 20_000);
                let val = boys_function(n, x);
                assert!(
                    (val - reference).abs() < 1e-9,
                    "F_{}({}) = {} but quadrature gives {}",
                    n,
                    x,
                    val,
                    reference
                );
            }
        }
    }

    #[test]
    fn test_boys_function_f0_closed_form() {
        let x: f64 = 4.0;
        let expected = 0.5 * (PI / x).sqrt() * erf(x.sqrt());
        assert!((boys_function(0, x) - expected).abs() < 1e-12);
    }
}
