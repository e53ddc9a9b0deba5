use num_traits::Float;

use crate::config::Config;
use crate::sample::{PhysicalSample, RawSample};
use crate::Result;

/// Convert raw observations into physical units, one output per input.
///
/// Pressure follows the hydrostatic relation over the manometer column,
///
/// $$
///     P = \left(\rho_\text{ref} - \rho_\text{fluid}\right) g h,
/// $$
///
/// scaled from Pa to kPa. Voltage recovers the transducer output from the
/// amplified ADC reading,
///
/// $$
///     V = \frac{V_\text{fs} \, c / 2^{bits}}{A},
/// $$
///
/// scaled from V to mV. Ordering is preserved so each physical sample pairs
/// with its source reading.
///
/// # Errors
/// `InvalidConfiguration` if the constants would make either formula
/// undefined; the check runs before any sample is converted.
pub fn convert_samples<E: Float>(
    samples: &[RawSample<E>],
    config: &Config<E>,
) -> Result<Vec<PhysicalSample<E>>> {
    config.validate()?;

    let kilo = E::from(1000.0).expect("constant must fit in `E`");
    let density_difference = config.reference_fluid_density - config.displaced_fluid_density;
    let adc_span = config.adc_span();
    let max_count = if config.resolution_bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << config.resolution_bits) - 1
    };

    Ok(samples
        .iter()
        .map(|sample| {
            if sample.count > max_count {
                log::warn!(
                    "ADC count {} exceeds the {}-bit range",
                    sample.count,
                    config.resolution_bits
                );
            }
            let count = E::from(sample.count).expect("ADC count must fit in `E`");
            let pressure =
                density_difference * config.gravitational_acceleration * sample.height / kilo;
            let voltage =
                kilo * (config.full_scale_voltage * count / adc_span) / config.amplification;
            PhysicalSample { pressure, voltage }
        })
        .collect())
}
