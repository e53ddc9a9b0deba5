use std::fs;
use std::path::Path;

use num_traits::Float;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// Physical and sensor constants for one calibration run.
///
/// Every component takes the configuration by reference, so independent
/// calibrations with different fluids or sensors can run concurrently without
/// shared state.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Config<E> {
    /// Density of the manometer reference fluid in kg/m^3.
    pub reference_fluid_density: E,
    /// Density of the displaced fluid in kg/m^3.
    pub displaced_fluid_density: E,
    /// Gravitational acceleration in m/s^2.
    pub gravitational_acceleration: E,
    /// Gain of the amplifier sitting between the transducer and the ADC.
    pub amplification: E,
    /// Full-scale ADC reference voltage in volts.
    pub full_scale_voltage: E,
    /// ADC word width in bits.
    pub resolution_bits: u32,
    /// Rated sensitivity from the transducer datasheet in V/kPa.
    pub datasheet_sensitivity: E,
    /// Rated DC offset from the transducer datasheet in volts.
    pub datasheet_offset: E,
}

impl<E: DeserializeOwned> Config<E> {
    /// Read a configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not parse as a
    /// configuration. The parsed value is not validated here; `validate` runs
    /// at the head of the pipeline.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}

impl<E: Float> Config<E> {
    /// Reject constants on which the conversion formulas are undefined.
    ///
    /// A non-positive amplification or full-scale voltage, or a zero-width
    /// ADC word, would turn the unit conversions into silent infinities, so
    /// they fail here before any sample is touched.
    ///
    /// # Errors
    /// `InvalidConfiguration` naming the offending constant.
    pub fn validate(&self) -> Result<()> {
        if self.amplification <= E::zero() {
            return Err(Error::InvalidConfiguration(
                "amplification must be positive".into(),
            ));
        }
        if self.resolution_bits == 0 {
            return Err(Error::InvalidConfiguration(
                "resolution must be at least one bit".into(),
            ));
        }
        if self.full_scale_voltage <= E::zero() {
            return Err(Error::InvalidConfiguration(
                "full-scale voltage must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The number of distinct ADC codes, 2^resolution_bits, as a scalar.
    pub(crate) fn adc_span(&self) -> E {
        let two = E::from(2.0).expect("constant must fit in `E`");
        two.powi(i32::try_from(self.resolution_bits).expect("resolution doesn't fit in `i32`"))
    }
}
