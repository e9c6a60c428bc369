//! Number formatting for rendered equations and parameter reports.

/// Format `value` with `figures` significant figures.
///
/// Plain decimal notation is used for exponents in `[-4, figures)`, scientific
/// notation (`1.235e6`) outside it. Trailing zeros are dropped. The output
/// always parses back with `str::parse::<f64>`.
pub fn format_significant(value: f64, figures: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let figures = figures.max(1);
    let scientific = format!("{:.*e}", figures - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= figures as i32 {
        format!("{}e{}", trim_zeros(mantissa), exponent)
    } else {
        // Re-read the rounded value so fixed notation cannot round twice.
        let rounded: f64 = scientific.parse().unwrap_or(value);
        let decimals = (figures as i32 - 1 - exponent).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, rounded)).to_string()
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Round a parameter to the precision its uncertainty supports.
///
/// Returns the rounded value and the uncertainty text. The uncertainty is
/// kept to one significant figure and the value rounded to the same decimal
/// place. Uncertainties that are very small or very large are written in `E`
/// notation, infinite ones as `∞`, and undefined or NaN ones as `NaN` (the
/// value is then returned unchanged).
pub fn format_parameter(value: f64, sigma: Option<f64>) -> (f64, String) {
    let sigma = match sigma {
        Some(s) if s.is_nan() => return (value, "NaN".to_string()),
        None => return (value, "NaN".to_string()),
        Some(s) if s.is_infinite() => return (value, "∞".to_string()),
        Some(s) => s.abs(),
    };
    if sigma == 0.0 {
        return (value, "0".to_string());
    }

    let mut exponent = sigma.log10().floor() as i32;
    let rounded_sigma = round_to_exponent(sigma, exponent);
    // 0.096 rounds up to 0.1, which moves the leading digit.
    if rounded_sigma > 0.0 {
        exponent = rounded_sigma.log10().floor() as i32;
    }
    let rounded_value = round_to_exponent(value, exponent);

    let text = if !(-4..=5).contains(&exponent) {
        format!("{:.1E}", sigma)
    } else {
        format!("{:.*}", (-exponent).max(0) as usize, rounded_sigma)
    };
    (rounded_value, text)
}

/// Round to the nearest multiple of `10^exponent`.
fn round_to_exponent(value: f64, exponent: i32) -> f64 {
    let factor = 10f64.powi(-exponent);
    if !factor.is_finite() || factor == 0.0 {
        return value;
    }
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
