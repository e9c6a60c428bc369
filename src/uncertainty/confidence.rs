//! # Confidence Interval Calculations
//!
//! Parameter confidence intervals from standard errors and the Student-t
//! distribution with the fit's degrees of freedom.

/// Quantile function of the standard normal distribution.
///
/// Uses Acklam's rational approximation (relative error below 1.2e-9).
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p.is_nan() || p <= 0.0 {
        return if p == 0.0 { f64::NEG_INFINITY } else { f64::NAN };
    }
    if p >= 1.0 {
        return if p == 1.0 { f64::INFINITY } else { f64::NAN };
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}

/// Quantile function of Student's t distribution with `dof` degrees of freedom.
///
/// Exact for one and two degrees of freedom; a Cornish-Fisher expansion
/// around the normal quantile otherwise.
pub fn student_t_quantile(p: f64, dof: usize) -> f64 {
    if !(p > 0.0 && p < 1.0) || dof == 0 {
        return f64::NAN;
    }
    match dof {
        1 => (std::f64::consts::PI * (p - 0.5)).tan(),
        2 => (2.0 * p - 1.0) / (2.0 * p * (1.0 - p)).sqrt(),
        _ => {
            let z = normal_quantile(p);
            let n = dof as f64;
            let z2 = z * z;
            let z3 = z2 * z;
            let z5 = z3 * z2;
            let z7 = z5 * z2;
            let z9 = z7 * z2;
            z + (z3 + z) / (4.0 * n)
                + (5.0 * z5 + 16.0 * z3 + 3.0 * z) / (96.0 * n.powi(2))
                + (3.0 * z7 + 19.0 * z5 + 17.0 * z3 - 15.0 * z) / (384.0 * n.powi(3))
                + (79.0 * z9 + 776.0 * z7 + 1482.0 * z5 - 1920.0 * z3 - 945.0 * z)
                    / (92160.0 * n.powi(4))
        }
    }
}

/// Two-sided critical value for the given confidence level.
pub fn t_critical(confidence: f64, dof: usize) -> f64 {
    student_t_quantile(0.5 * (1.0 + confidence), dof)
}

/// Symmetric confidence intervals `value ± t * σ` for each parameter.
///
/// Parameters without a standard error, and every parameter when there are
/// no degrees of freedom left, get `None`.
pub fn confidence_intervals(
    values: &[f64],
    std_errors: &[Option<f64>],
    confidence: f64,
    dof: usize,
) -> Vec<Option<(f64, f64)>> {
    let t = t_critical(confidence, dof);
    values
        .iter()
        .zip(std_errors)
        .map(|(&value, sigma)| {
            let half_width = t * (*sigma)?;
            if half_width.is_finite() {
                Some((value - half_width, value + half_width))
            } else {
                None
            }
        })
        .collect()
}
