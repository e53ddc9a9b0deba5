use num_traits::Float;

use crate::error::Error;
use crate::regression::CalibrationModel;
use crate::sample::PhysicalSample;
use crate::Result;

/// Residual-based quality metrics of a fitted model.
///
/// Residuals are predicted minus observed pressure, so a positive bias means
/// the fitted line systematically over-predicts.
#[derive(Clone, Copy, Debug)]
pub struct FitMetrics<E> {
    pub(crate) rmse: E,
    pub(crate) mae: E,
    pub(crate) mape: E,
    pub(crate) bias: E,
    pub(crate) r_squared: E,
}

impl<E: Copy> FitMetrics<E> {
    /// Root-mean-square error in kPa.
    pub const fn rmse(&self) -> E {
        self.rmse
    }

    /// Mean absolute error in kPa.
    pub const fn mae(&self) -> E {
        self.mae
    }

    /// Mean absolute percent error.
    pub const fn mape(&self) -> E {
        self.mape
    }

    /// Mean signed residual in kPa.
    pub const fn bias(&self) -> E {
        self.bias
    }

    /// Coefficient of determination.
    pub const fn r_squared(&self) -> E {
        self.r_squared
    }
}

/// Evaluate the residual quality of a fitted model over its own samples.
///
/// All five metrics are accumulated in a single pass. R² is computed from the
/// residual and total sums of squares, which for a first-order OLS fit equals
/// the squared correlation coefficient; if the pressures have no variance it
/// is reported as 0, matching the calibrator's convention for r.
///
/// A sample whose observed pressure is exactly zero has an undefined percent
/// error; such samples are excluded from the MAPE term only and still
/// contribute to RMSE, MAE, bias and R², so the returned metrics never
/// contain NaN or infinity.
///
/// # Errors
/// `InsufficientData` for an empty collection, `DivisionByZero` when every
/// observed pressure is zero and the MAPE denominator set is empty.
pub fn evaluate<E: Float>(
    model: &CalibrationModel<E>,
    samples: &[PhysicalSample<E>],
) -> Result<FitMetrics<E>> {
    if samples.is_empty() {
        return Err(Error::InsufficientData(
            "no samples to evaluate the fit against".into(),
        ));
    }
    let n = E::from(samples.len()).expect("sample count must fit in `E`");
    let hundred = E::from(100.0).expect("constant must fit in `E`");

    let mut residual_sum = E::zero();
    let mut absolute_sum = E::zero();
    let mut square_sum = E::zero();
    let mut percent_sum = E::zero();
    let mut percent_count = 0usize;
    let mut pressure_sum = E::zero();
    let mut pressure_square_sum = E::zero();

    for sample in samples {
        let observed = sample.pressure();
        let residual = model.predict(sample.voltage()) - observed;

        residual_sum = residual_sum + residual;
        absolute_sum = absolute_sum + residual.abs();
        square_sum = square_sum + residual * residual;
        pressure_sum = pressure_sum + observed;
        pressure_square_sum = pressure_square_sum + observed * observed;

        if observed != E::zero() {
            percent_sum = percent_sum + (hundred * residual / observed).abs();
            percent_count += 1;
        }
    }

    if percent_count == 0 {
        return Err(Error::DivisionByZero(
            "every observed pressure is zero, so percent error is undefined".into(),
        ));
    }

    let rmse = (square_sum / n).sqrt();
    let mae = absolute_sum / n;
    let bias = residual_sum / n;
    let mape = percent_sum / E::from(percent_count).expect("sample count must fit in `E`");

    let total_sum_of_squares = pressure_square_sum - pressure_sum * pressure_sum / n;
    let r_squared = if total_sum_of_squares > E::zero() {
        E::one() - square_sum / total_sum_of_squares
    } else {
        E::zero()
    };

    Ok(FitMetrics {
        rmse,
        mae,
        mape,
        bias,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use ndarray_rand::rand::{Rng, SeedableRng};
    use rand_isaac::Isaac64Rng;

    use super::evaluate;
    use crate::error::Error;
    use crate::regression::{linear_fit, CalibrationModel};
    use crate::sample::PhysicalSample;

    fn samples_from_pairs(pairs: &[(f64, f64)]) -> Vec<PhysicalSample<f64>> {
        pairs
            .iter()
            .map(|&(voltage, pressure)| PhysicalSample { pressure, voltage })
            .collect()
    }

    #[test]
    fn perfect_fit_has_zero_errors_and_unit_r_squared() {
        let samples = samples_from_pairs(&[(20.0, -1.0), (22.0, 0.2), (24.0, 1.4)]);
        let model = linear_fit(&samples).unwrap();

        let metrics = evaluate(&model, &samples).unwrap();

        approx::assert_relative_eq!(metrics.rmse(), 0.0, epsilon = 1e-12);
        approx::assert_relative_eq!(metrics.mae(), 0.0, epsilon = 1e-12);
        approx::assert_relative_eq!(metrics.mape(), 0.0, epsilon = 1e-9);
        approx::assert_relative_eq!(metrics.bias(), 0.0, epsilon = 1e-12);
        approx::assert_relative_eq!(metrics.r_squared(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn best_fit_line_has_vanishing_bias() {
        let seed = 40;
        let mut rng = Isaac64Rng::seed_from_u64(seed);
        let samples = samples_from_pairs(
            &(0..16)
                .map(|_| (rng.gen_range(18.0..25.0), rng.gen_range(-1.5..1.5)))
                .collect::<Vec<_>>(),
        );
        let model = linear_fit(&samples).unwrap();

        let metrics = evaluate(&model, &samples).unwrap();

        // The mean residual of the least-squares line is exactly zero up to
        // floating-point rounding.
        approx::assert_relative_eq!(metrics.bias(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn r_squared_equals_squared_correlation() {
        let seed = 40;
        let mut rng = Isaac64Rng::seed_from_u64(seed);
        let samples = samples_from_pairs(
            &(0..16)
                .map(|_| {
                    let voltage: f64 = rng.gen_range(18.0..25.0);
                    let pressure = 0.6 * voltage - 13.0 + rng.gen_range(-0.1..0.1);
                    (voltage, pressure)
                })
                .collect::<Vec<_>>(),
        );
        let model = linear_fit(&samples).unwrap();

        let metrics = evaluate(&model, &samples).unwrap();

        approx::assert_relative_eq!(
            metrics.r_squared(),
            model.r_value() * model.r_value(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn known_residuals_produce_known_metrics() {
        // A line held flat at zero against observations [1, -2, 3]:
        // residuals are [-1, 2, -3].
        let model = CalibrationModel {
            slope: 0.0,
            intercept: 0.0,
            r_value: 0.0,
            p_value: 1.0,
            std_err: 0.0,
        };
        let samples = samples_from_pairs(&[(20.0, 1.0), (22.0, -2.0), (24.0, 3.0)]);

        let metrics = evaluate(&model, &samples).unwrap();

        approx::assert_relative_eq!(metrics.rmse(), (14.0f64 / 3.0).sqrt(), max_relative = 1e-12);
        approx::assert_relative_eq!(metrics.mae(), 2.0, max_relative = 1e-12);
        approx::assert_relative_eq!(metrics.mape(), 100.0, max_relative = 1e-12);
        approx::assert_relative_eq!(metrics.bias(), -2.0 / 3.0, max_relative = 1e-12);
    }

    #[test]
    fn zero_pressure_samples_are_excluded_from_mape_only() {
        let model = CalibrationModel {
            slope: 0.0,
            intercept: 0.0,
            r_value: 0.0,
            p_value: 1.0,
            std_err: 0.0,
        };
        // The zero-pressure observation would make percent error undefined.
        let samples = samples_from_pairs(&[(20.0, 1.0), (22.0, 0.0), (24.0, -1.0)]);

        let metrics = evaluate(&model, &samples).unwrap();

        assert!(metrics.mape().is_finite());
        // MAPE averages over the two non-zero observations only.
        approx::assert_relative_eq!(metrics.mape(), 100.0, max_relative = 1e-12);
        // The excluded sample still counts towards the other metrics.
        approx::assert_relative_eq!(metrics.mae(), 2.0 / 3.0, max_relative = 1e-12);
        approx::assert_relative_eq!(metrics.rmse(), (2.0f64 / 3.0).sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn all_zero_pressures_fail_rather_than_emit_nan() {
        let model = CalibrationModel {
            slope: 0.0,
            intercept: 0.1,
            r_value: 0.0,
            p_value: 1.0,
            std_err: 0.0,
        };
        let samples = samples_from_pairs(&[(20.0, 0.0), (22.0, 0.0)]);

        let result = evaluate(&model, &samples);

        assert!(matches!(result, Err(Error::DivisionByZero(_))));
    }

    #[test]
    fn empty_collection_is_insufficient() {
        let model = CalibrationModel {
            slope: 0.6,
            intercept: -13.0,
            r_value: 1.0,
            p_value: 0.0,
            std_err: 0.0,
        };

        let result = evaluate(&model, &[]);

        assert!(matches!(result, Err(Error::InsufficientData(_))));
    }
}
