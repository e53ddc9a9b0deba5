use log::debug;
use num_traits::Float;

use crate::config::Config;
use crate::metrics::{self, FitMetrics};
use crate::regression::{self, CalibrationModel};
use crate::sample::{PhysicalSample, RawDataset};
use crate::theory::{self, DigitalRange, ResponseCurve};
use crate::units;
use crate::Result;

/// The complete numeric output of one calibration run.
///
/// Everything a presentation layer needs to render the calibration: the
/// fitted model, its residual metrics, the datasheet and fit-adjusted
/// response curves on a shared voltage domain, the valid digital-output
/// window, and the converted samples themselves for scatter rendering.
/// Immutable once produced; either the whole bundle exists or the run
/// failed, so the model and its derived quantities can never disagree.
pub struct Calibration<E> {
    model: CalibrationModel<E>,
    metrics: FitMetrics<E>,
    datasheet_curve: ResponseCurve<E>,
    adjusted_curve: ResponseCurve<E>,
    digital_range: DigitalRange<E>,
    samples: Vec<PhysicalSample<E>>,
}

impl<E: Copy> Calibration<E> {
    pub const fn model(&self) -> &CalibrationModel<E> {
        &self.model
    }

    pub const fn metrics(&self) -> &FitMetrics<E> {
        &self.metrics
    }

    /// Predicted response from the rated datasheet constants.
    pub const fn datasheet_curve(&self) -> &ResponseCurve<E> {
        &self.datasheet_curve
    }

    /// Predicted response with constants back-derived from the fit.
    pub const fn adjusted_curve(&self) -> &ResponseCurve<E> {
        &self.adjusted_curve
    }

    pub const fn digital_range(&self) -> &DigitalRange<E> {
        &self.digital_range
    }

    /// The converted samples the model was fitted to, in ingestion order.
    pub fn samples(&self) -> &[PhysicalSample<E>] {
        &self.samples
    }
}

/// Run the full calibration pipeline over one dataset.
///
/// Raw samples are converted to physical units, fitted by least squares,
/// evaluated for residual quality, and compared against the theoretical
/// response; the first failure propagates and no partial bundle is produced.
/// The computation is pure and synchronous, so independent datasets may be
/// calibrated concurrently.
///
/// # Errors
/// `InvalidConfiguration`, `InsufficientData` or `DivisionByZero` from the
/// individual stages, each detected eagerly at the stage boundary.
pub fn calibrate<E: Float>(dataset: &RawDataset<E>, config: &Config<E>) -> Result<Calibration<E>> {
    config.validate()?;

    let samples = units::convert_samples(dataset.samples(), config)?;
    debug!("converted {} samples to physical units", samples.len());

    let model = regression::linear_fit(&samples)?;
    let metrics = metrics::evaluate(&model, &samples)?;
    debug!("fitted calibration line over {} samples", samples.len());

    let domain = theory::voltage_domain(config);
    let datasheet_curve = theory::datasheet_curve(config, domain.clone())?;
    let adjusted_curve = theory::adjusted_curve(&model, domain)?;
    let digital_range = theory::digital_range(config)?;

    Ok(Calibration {
        model,
        metrics,
        datasheet_curve,
        adjusted_curve,
        digital_range,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::calibrate;
    use crate::config::Config;
    use crate::error::Error;
    use crate::sample::RawDataset;

    fn reference_config() -> Config<f64> {
        Config {
            reference_fluid_density: 997.0,
            displaced_fluid_density: 1.225,
            gravitational_acceleration: 9.81,
            amplification: 128.0,
            full_scale_voltage: 5.0,
            resolution_bits: 24,
            datasheet_sensitivity: 0.05 / 40.0,
            datasheet_offset: 0.025,
        }
    }

    #[test]
    fn pipeline_produces_a_consistent_bundle() {
        let heights = [0.0137, 0.0232, -0.0174, -0.0538];
        let counts = [9_830_572, 9_887_678, 9_601_672, 9_351_684];
        let dataset = RawDataset::from_columns(&heights, &counts).unwrap();

        let calibration = calibrate(&dataset, &reference_config()).unwrap();

        assert_eq!(calibration.samples().len(), 4);
        // R-squared round-trips through the metrics.
        approx::assert_relative_eq!(
            calibration.metrics().r_squared(),
            calibration.model().r_value() * calibration.model().r_value(),
            max_relative = 1e-9
        );
        // Both curves share one domain.
        assert_eq!(
            calibration.datasheet_curve().voltages(),
            calibration.adjusted_curve().voltages()
        );
    }

    #[test]
    fn underdetermined_dataset_produces_no_bundle() {
        let dataset = RawDataset::from_columns(&[0.0137], &[9_830_572]).unwrap();

        let result = calibrate(&dataset, &reference_config());

        assert!(matches!(result, Err(Error::InsufficientData(_))));
    }

    #[test]
    fn invalid_constants_fail_before_any_stage_runs() {
        let config = Config {
            full_scale_voltage: 0.0,
            ..reference_config()
        };
        let dataset =
            RawDataset::from_columns(&[0.0137, 0.0232], &[9_830_572, 9_887_678]).unwrap();

        let result = calibrate(&dataset, &config);

        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }
}
