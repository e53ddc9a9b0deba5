use itertools::Itertools;
use ndarray::Array1;
use num_traits::Float;

use crate::config::Config;
use crate::error::Error;
use crate::regression::CalibrationModel;
use crate::Result;

/// Points in the default dense voltage domain.
const DOMAIN_POINTS: usize = 1000;

/// A transducer sensitivity/offset pair in datasheet units.
///
/// Either the rated constants copied from the datasheet, or the equivalent
/// constants back-derived from a fitted model.
#[derive(Clone, Copy, Debug)]
pub struct SensorConstants<E> {
    /// Sensitivity in V/kPa.
    pub sensitivity: E,
    /// DC offset in volts.
    pub offset: E,
}

/// A predicted pressure-vs-voltage line sampled on a dense voltage domain.
///
/// Purely derived from its generating constants; two curves built over the
/// same domain are comparable point-for-point.
#[derive(Clone, Debug)]
pub struct ResponseCurve<E> {
    voltages: Array1<E>,
    pressures: Array1<E>,
}

impl<E: Float> ResponseCurve<E> {
    /// Sample the response line
    ///
    /// $$
    ///     P = \frac{V}{S} - \frac{b}{S}
    /// $$
    ///
    /// over `domain` (mV), with the constants in datasheet units.
    fn from_constants(domain: Array1<E>, constants: SensorConstants<E>) -> Result<Self> {
        if constants.sensitivity == E::zero() {
            return Err(Error::DivisionByZero(
                "a zero sensitivity has no response curve".into(),
            ));
        }
        let kilo = E::from(1000.0).expect("constant must fit in `E`");
        let pressures = domain.mapv(|voltage_mv| {
            let voltage = voltage_mv / kilo;
            voltage / constants.sensitivity - constants.offset / constants.sensitivity
        });
        Ok(Self {
            voltages: domain,
            pressures,
        })
    }

    /// Domain voltages in mV, in ascending order.
    pub const fn voltages(&self) -> &Array1<E> {
        &self.voltages
    }

    /// Predicted pressures in kPa, one per domain voltage.
    pub const fn pressures(&self) -> &Array1<E> {
        &self.pressures
    }

    /// (voltage, pressure) pairs in domain order.
    pub fn points(&self) -> impl Iterator<Item = (E, E)> + '_ {
        self.voltages
            .iter()
            .copied()
            .zip(self.pressures.iter().copied())
    }

    /// Smallest and largest predicted pressure on the domain, for sizing
    /// downstream annotations.
    pub fn pressure_extent(&self) -> Option<(E, E)> {
        self.pressures.iter().copied().minmax().into_option()
    }
}

/// The dense voltage domain shared by both curves, in mV.
///
/// Spans zero to twice the rated DC offset (the rated offset sits mid-span),
/// which reproduces the transducer's claimed full-scale output window.
pub fn voltage_domain<E: Float>(config: &Config<E>) -> Array1<E> {
    let kilo = E::from(1000.0).expect("constant must fit in `E`");
    let two = E::from(2.0).expect("constant must fit in `E`");
    let upper = two * config.datasheet_offset * kilo;
    Array1::linspace(E::zero(), upper, DOMAIN_POINTS)
}

/// Predicted response from the rated datasheet constants.
///
/// # Errors
/// `DivisionByZero` for a zero rated sensitivity.
pub fn datasheet_curve<E: Float>(config: &Config<E>, domain: Array1<E>) -> Result<ResponseCurve<E>> {
    ResponseCurve::from_constants(
        domain,
        SensorConstants {
            sensitivity: config.datasheet_sensitivity,
            offset: config.datasheet_offset,
        },
    )
}

/// Sensitivity and offset implied by a fitted model, in datasheet units.
///
/// The slope is in kPa/mV, so the implied sensitivity is (1/slope)/1000
/// V/kPa. The fitted intercept enters with the opposite sign to the rated
/// offset so that the derived constants reproduce the fitted line exactly.
///
/// # Errors
/// `DivisionByZero` when the slope is zero and the implied sensitivity is
/// undefined.
pub fn adjusted_constants<E: Float>(model: &CalibrationModel<E>) -> Result<SensorConstants<E>> {
    if model.slope() == E::zero() {
        return Err(Error::DivisionByZero(
            "a zero slope has no derived sensitivity".into(),
        ));
    }
    let kilo = E::from(1000.0).expect("constant must fit in `E`");
    let sensitivity = (E::one() / model.slope()) / kilo;
    let offset = -model.intercept() * sensitivity;
    Ok(SensorConstants {
        sensitivity,
        offset,
    })
}

/// Predicted response with constants back-derived from a fitted model.
///
/// Shares its functional form and voltage domain with [`datasheet_curve`],
/// and coincides with the fitted line everywhere on the domain.
///
/// # Errors
/// `DivisionByZero` when the fitted slope is zero.
pub fn adjusted_curve<E: Float>(
    model: &CalibrationModel<E>,
    domain: Array1<E>,
) -> Result<ResponseCurve<E>> {
    ResponseCurve::from_constants(domain, adjusted_constants(model)?)
}

/// The voltage window of the sensor's valid digital output, in mV.
#[derive(Clone, Copy, Debug)]
pub struct DigitalRange<E> {
    pub(crate) lower: E,
    pub(crate) upper: E,
}

impl<E: Copy> DigitalRange<E> {
    /// Voltage of the all-zeros ADC code.
    pub const fn lower(&self) -> E {
        self.lower
    }

    /// Voltage of the all-ones ADC code.
    pub const fn upper(&self) -> E {
        self.upper
    }
}

/// Compute the voltage window corresponding to the ADC's digital output
/// range, [0, fullScale / amplification].
///
/// # Errors
/// `InvalidConfiguration` under the same constant guards as the unit
/// conversion.
pub fn digital_range<E: Float>(config: &Config<E>) -> Result<DigitalRange<E>> {
    config.validate()?;
    let kilo = E::from(1000.0).expect("constant must fit in `E`");
    let upper = config.full_scale_voltage / config.amplification * kilo;
    Ok(DigitalRange {
        lower: E::zero(),
        upper,
    })
}
