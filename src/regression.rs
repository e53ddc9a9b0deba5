use num_traits::Float;

use crate::error::Error;
use crate::math::students_t_two_sided;
use crate::sample::PhysicalSample;
use crate::Result;

/// First-order model of the transducer response,
///
/// $$
///     P = \text{slope} \cdot V + \text{intercept},
/// $$
///
/// with pressure in kPa and voltage in mV, together with the correlation
/// statistics of the fit. Produced exactly once per sample collection and
/// immutable thereafter.
#[derive(Clone, Copy, Debug)]
pub struct CalibrationModel<E> {
    pub(crate) slope: E,
    pub(crate) intercept: E,
    pub(crate) r_value: E,
    pub(crate) p_value: E,
    pub(crate) std_err: E,
}

impl<E: Copy> CalibrationModel<E> {
    /// Fitted slope in kPa/mV.
    pub const fn slope(&self) -> E {
        self.slope
    }

    /// Fitted intercept in kPa.
    pub const fn intercept(&self) -> E {
        self.intercept
    }

    /// Pearson correlation coefficient of voltage and pressure.
    pub const fn r_value(&self) -> E {
        self.r_value
    }

    /// Two-sided p-value of the correlation under the t-distribution null
    /// hypothesis of no linear association.
    pub const fn p_value(&self) -> E {
        self.p_value
    }

    /// Standard error of the slope estimate.
    pub const fn std_err(&self) -> E {
        self.std_err
    }
}

impl<E: Float> CalibrationModel<E> {
    /// Pressure predicted by the fitted line at `voltage` mV.
    pub fn predict(&self, voltage: E) -> E {
        self.slope * voltage + self.intercept
    }
}

/// Fit pressure on voltage by ordinary least squares.
///
/// The slope and intercept minimize the sum of squared vertical residuals
/// over the whole collection. Centred sums are accumulated in two passes
/// (means first), so the result is independent of sample order up to
/// floating-point summation and reproducible across runs.
///
/// With exactly two samples the residual degrees of freedom vanish; the
/// p-value is reported as 1 and the slope standard error as 0 rather than
/// NaN. If every pressure is identical the correlation coefficient is
/// reported as 0.
///
/// # Errors
/// `InsufficientData` for fewer than two samples or zero variance in voltage,
/// either of which leaves the line underdetermined.
pub fn linear_fit<E: Float>(samples: &[PhysicalSample<E>]) -> Result<CalibrationModel<E>> {
    let n = samples.len();
    if n < 2 {
        return Err(Error::InsufficientData(format!(
            "{n} samples cannot determine a line"
        )));
    }
    let n_scalar = E::from(n).expect("sample count must fit in `E`");

    let mean_voltage = samples
        .iter()
        .fold(E::zero(), |sum, sample| sum + sample.voltage())
        / n_scalar;
    let mean_pressure = samples
        .iter()
        .fold(E::zero(), |sum, sample| sum + sample.pressure())
        / n_scalar;

    let (ss_voltage, ss_pressure, ss_cross) = samples.iter().fold(
        (E::zero(), E::zero(), E::zero()),
        |(ss_v, ss_p, ss_vp), sample| {
            let dv = sample.voltage() - mean_voltage;
            let dp = sample.pressure() - mean_pressure;
            (ss_v + dv * dv, ss_p + dp * dp, ss_vp + dv * dp)
        },
    );

    if ss_voltage == E::zero() {
        return Err(Error::InsufficientData(
            "zero variance in voltage leaves the regression underdetermined".into(),
        ));
    }

    let slope = ss_cross / ss_voltage;
    let intercept = mean_pressure - slope * mean_voltage;

    let r_value = if ss_pressure == E::zero() {
        E::zero()
    } else {
        // Clamp against rounding pushing |r| past one.
        (ss_cross / (ss_voltage * ss_pressure).sqrt())
            .max(-E::one())
            .min(E::one())
    };

    let degrees_of_freedom = n - 2;
    let (p_value, std_err) = if degrees_of_freedom == 0 {
        (E::one(), E::zero())
    } else {
        let df = E::from(degrees_of_freedom).expect("degrees of freedom must fit in `E`");
        let t = r_value * (df / ((E::one() - r_value) * (E::one() + r_value))).sqrt();
        let slope_variance = (ss_pressure / ss_voltage - slope * slope) / df;
        let std_err = if slope_variance > E::zero() {
            slope_variance.sqrt()
        } else {
            E::zero()
        };
        (students_t_two_sided(t.abs(), degrees_of_freedom), std_err)
    };

    Ok(CalibrationModel {
        slope,
        intercept,
        r_value,
        p_value,
        std_err,
    })
}
