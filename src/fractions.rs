// Composition arithmetic for materials built from signed fractions.
//
// All functions work in place on an ordered slice of `(fraction, data)`
// records, where `data` is whatever the caller needs to recover an atomic
// weight (a scattering center handle, an atomic weight, ...). The sign of
// the first fraction selects the convention for the whole slice:
// negative = weight fractions, positive = atom fractions.

use crate::constants::{AVOGADRO, BARNS_PER_CM2, RELATIVE_TOLERANCE};

/// Sum of the fraction field of every record.
#[inline]
pub fn fraction_sum<T>(fractions: &[(f64, T)]) -> f64 {
    fractions.iter().map(|(fraction, _)| *fraction).sum()
}

/// Check that a fraction slice can be converted.
///
/// Returns `false` when the slice is empty, when any fraction is exactly
/// zero, or when a fraction does not share the sign of the first one.
pub fn are_fractions_valid<T>(fractions: &[(f64, T)]) -> bool {
    let first = match fractions.first() {
        Some((fraction, _)) => *fraction,
        None => return false,
    };

    fractions.iter().all(|(fraction, _)| {
        *fraction != 0.0 && fraction.is_finite() && (first < 0.0) == (*fraction < 0.0)
    })
}

/// Check that `|Σ fraction|` is one within [`RELATIVE_TOLERANCE`].
pub fn are_fractions_normalized<T>(fractions: &[(f64, T)]) -> bool {
    (fraction_sum(fractions).abs() - 1.0).abs() <= RELATIVE_TOLERANCE
}

/// Divide every fraction by `|Σ fraction|`.
///
/// The sign convention of the input is kept, so normalized weight fractions
/// stay negative. The sum must be a normal float.
pub fn normalize_fractions<T>(fractions: &mut [(f64, T)]) {
    debug_assert!(are_fractions_valid(fractions));

    let norm = fraction_sum(fractions).abs();

    for (fraction, _) in fractions.iter_mut() {
        *fraction /= norm;
    }

    debug_assert!(are_fractions_normalized(fractions));
}

/// Turn weight fractions (negative) into normalized atom fractions.
///
/// Each weight fraction is divided by the atomic weight of its constituent
/// and the resulting ratios are normalized. Atom fractions (positive input)
/// are left untouched and must be normalized separately with
/// [`normalize_fractions`]. The sum of the ratios must be a normal float.
pub fn convert_weight_fractions_to_atom_fractions<T, F>(fractions: &mut [(f64, T)], atomic_weight: F)
where
    F: Fn(&T) -> f64,
{
    debug_assert!(are_fractions_valid(fractions));

    match fractions.first() {
        Some((first, _)) if *first < 0.0 => {}
        _ => return,
    }

    let mut ratio_sum = 0.0;

    for (fraction, data) in fractions.iter_mut() {
        let weight = atomic_weight(data);
        debug_assert!(weight > 0.0, "atomic weights must be positive");

        *fraction = -*fraction / weight;
        ratio_sum += *fraction;
    }

    for (fraction, _) in fractions.iter_mut() {
        *fraction /= ratio_sum;
    }

    debug_assert!(are_fractions_normalized(fractions));
}

/// Convert a mass density (g/cm³) to a number density (atoms/(b·cm)).
///
/// The fractions must already be positive, normalized atom fractions. The
/// effective atomic weight of the mixture is the fraction weighted average
/// of the constituent atomic weights.
pub fn convert_mass_density_to_number_density<T, F>(
    mass_density: f64,
    fractions: &[(f64, T)],
    atomic_weight: F,
) -> f64
where
    F: Fn(&T) -> f64,
{
    debug_assert!(mass_density > 0.0);
    debug_assert!(are_fractions_normalized(fractions));
    debug_assert!(fractions.iter().all(|(fraction, _)| *fraction > 0.0));

    let effective_atomic_weight: f64 = fractions
        .iter()
        .map(|(fraction, data)| fraction * atomic_weight(data))
        .sum();

    mass_density / effective_atomic_weight * AVOGADRO * BARNS_PER_CM2
}

/// Multiply every atom fraction by the number density, leaving absolute
/// per-constituent number densities in the fraction field.
pub fn scale_fractions_by_number_density<T>(number_density: f64, fractions: &mut [(f64, T)]) {
    debug_assert!(number_density > 0.0);

    for (fraction, _) in fractions.iter_mut() {
        *fraction *= number_density;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(w: &f64) -> f64 {
        *w
    }

    #[test]
    fn test_are_fractions_valid() {
        let empty: Vec<(f64, ())> = Vec::new();
        assert!(!are_fractions_valid(&empty));

        assert!(are_fractions_valid(&[(0.2, ()), (0.8, ())]));
        assert!(are_fractions_valid(&[(-0.2, ()), (-0.8, ())]));
        assert!(!are_fractions_valid(&[(0.2, ()), (-0.8, ())]));
        assert!(!are_fractions_valid(&[(-0.2, ()), (0.8, ())]));
        assert!(!are_fractions_valid(&[(0.2, ()), (0.0, ())]));
        assert!(!are_fractions_valid(&[(f64::NAN, ())]));
    }

    #[test]
    fn test_are_fractions_normalized() {
        assert!(are_fractions_normalized(&[(0.25, ()), (0.75, ())]));
        assert!(are_fractions_normalized(&[(-0.25, ()), (-0.75, ())]));
        assert!(!are_fractions_normalized(&[(0.5, ()), (0.75, ())]));
    }

    #[test]
    fn test_normalize_fractions() {
        let mut fractions = vec![(2.0, ()), (6.0, ())];
        normalize_fractions(&mut fractions);
        assert!((fractions[0].0 - 0.25).abs() < 1e-15);
        assert!((fractions[1].0 - 0.75).abs() < 1e-15);

        // Weight fractions keep their sign
        let mut fractions = vec![(-1.0, ()), (-3.0, ())];
        normalize_fractions(&mut fractions);
        assert!((fractions[0].0 + 0.25).abs() < 1e-15);
        assert!(are_fractions_normalized(&fractions));
    }

    #[test]
    fn test_convert_weight_fractions_to_atom_fractions() {
        let mut fractions = vec![(-0.25, 10.0), (-0.75, 20.0)];
        convert_weight_fractions_to_atom_fractions(&mut fractions, weight);

        // (0.25/10)/(0.25/10 + 0.75/20) = 0.025/0.0625 = 0.4
        assert!((fractions[0].0 - 0.4).abs() < 1e-14);
        assert!((fractions[1].0 - 0.6).abs() < 1e-14);
        assert!(are_fractions_normalized(&fractions));
    }

    #[test]
    fn test_convert_atom_fractions_is_identity() {
        let mut fractions = vec![(1.0, 10.0), (3.0, 20.0)];
        convert_weight_fractions_to_atom_fractions(&mut fractions, weight);
        assert_eq!(fractions[0].0, 1.0);
        assert_eq!(fractions[1].0, 3.0);
    }

    #[test]
    fn test_convert_mass_density_to_number_density() {
        let fractions = vec![(0.4, 10.0), (0.6, 20.0)];
        let number_density = convert_mass_density_to_number_density(1.0, &fractions, weight);

        // Effective atomic weight = 0.4*10 + 0.6*20 = 16
        let expected = 1.0 / 16.0 * AVOGADRO * 1e-24;
        assert!((number_density - expected).abs() / expected < 1e-14);
    }

    #[test]
    fn test_scale_fractions_by_number_density() {
        let mut fractions = vec![(0.4, ()), (0.6, ())];
        scale_fractions_by_number_density(0.05, &mut fractions);
        assert!((fractions[0].0 - 0.02).abs() < 1e-15);
        assert!((fractions[1].0 - 0.03).abs() < 1e-15);
        assert!((fraction_sum(&fractions) - 0.05).abs() < 1e-15);
    }
}
