// Interpolation on tabulated cross section grids

/// Linear interpolation on a linear scale.
///
/// Given arrays of x and y values, interpolate to find the y value at x_new.
/// If x_new is outside the range of x, returns the first or last y value.
pub fn interpolate_linear(x: &[f64], y: &[f64], x_new: f64) -> f64 {
    interpolate(x, y, x_new, |x1, x2, y1, y2| {
        y1 + (x_new - x1) * (y2 - y1) / (x2 - x1)
    })
}

/// Log-log interpolation.
///
/// All x and y values must be positive. Outside the grid the end values are
/// returned, as for [`interpolate_linear`].
pub fn interpolate_log_log(x: &[f64], y: &[f64], x_new: f64) -> f64 {
    interpolate(x, y, x_new, |x1, x2, y1, y2| {
        let log_y = y1.ln() + (x_new.ln() - x1.ln()) * (y2.ln() - y1.ln()) / (x2.ln() - x1.ln());
        log_y.exp()
    })
}

fn interpolate<F>(x: &[f64], y: &[f64], x_new: f64, segment: F) -> f64
where
    F: Fn(f64, f64, f64, f64) -> f64,
{
    if x.is_empty() {
        return f64::NAN;
    }
    if x.len() == 1 {
        return y[0];
    }
    if x_new <= x[0] {
        return y[0];
    }
    if x_new >= x[x.len() - 1] {
        return y[y.len() - 1];
    }

    // invariant: target interval within (low, high]
    let mut low = 0usize;
    let mut high = x.len() - 1;
    while high - low > 1 {
        let mid = (low + high) >> 1;
        if x[mid] <= x_new {
            low = mid;
        } else {
            high = mid;
        }
    }

    segment(x[low], x[low + 1], y[low], y[low + 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_linear() {
        let x = [1.0, 2.0, 4.0];
        let y = [10.0, 20.0, 0.0];

        assert_eq!(interpolate_linear(&x, &y, 1.5), 15.0);
        assert_eq!(interpolate_linear(&x, &y, 3.0), 10.0);
        assert_eq!(interpolate_linear(&x, &y, 2.0), 20.0);
        assert_eq!(interpolate_linear(&x, &y, 0.1), 10.0);
        assert_eq!(interpolate_linear(&x, &y, 9.0), 0.0);
        assert!(interpolate_linear(&[], &[], 1.0).is_nan());
        assert_eq!(interpolate_linear(&[3.0], &[7.0], 1.0), 7.0);
    }

    #[test]
    fn test_interpolate_log_log() {
        // y = x^2 is a straight line in log-log space
        let x = [1.0, 10.0, 100.0];
        let y = [1.0, 100.0, 10000.0];

        let v = interpolate_log_log(&x, &y, 5.0);
        assert!((v - 25.0).abs() < 1e-9, "{}", v);
        assert_eq!(interpolate_log_log(&x, &y, 1000.0), 10000.0);
    }
}
