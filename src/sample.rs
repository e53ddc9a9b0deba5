use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize};

use crate::error::Error;
use crate::Result;

/// One raw calibration observation.
#[derive(Clone, Copy, Debug)]
pub struct RawSample<E> {
    /// Manometer column height in metres, signed about the zero reference.
    pub height: E,
    /// Raw ADC count, bounded by the converter's word width.
    pub count: u64,
}

/// One observation converted to physical units.
///
/// Produced one-for-one from [`RawSample`]s with ingestion order preserved, so
/// a physical sample can always be paired back with its source reading.
#[derive(Clone, Copy, Debug)]
pub struct PhysicalSample<E> {
    pub(crate) pressure: E,
    pub(crate) voltage: E,
}

impl<E: Copy> PhysicalSample<E> {
    /// Pressure in kilopascals, signed about the manometer zero reference.
    pub const fn pressure(&self) -> E {
        self.pressure
    }

    /// Transducer output voltage in millivolts.
    pub const fn voltage(&self) -> E {
        self.voltage
    }
}

#[derive(Deserialize)]
struct Row<E>(E, u64);

/// The aligned raw observations of one calibration run, in ingestion order.
#[derive(Clone, Debug)]
pub struct RawDataset<E> {
    samples: Vec<RawSample<E>>,
}

impl<E: Copy> RawDataset<E> {
    /// Pair aligned height and count columns into a dataset.
    ///
    /// # Errors
    /// `MismatchedColumns` if the two columns differ in length.
    pub fn from_columns(heights: &[E], counts: &[u64]) -> Result<Self> {
        if heights.len() != counts.len() {
            return Err(Error::MismatchedColumns {
                heights: heights.len(),
                counts: counts.len(),
            });
        }
        let samples = heights
            .iter()
            .zip(counts)
            .map(|(&height, &count)| RawSample { height, count })
            .collect();
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[RawSample<E>] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<E: Copy + DeserializeOwned> RawDataset<E> {
    /// Create a dataset from an on-disk representation
    ///
    /// Expects a headered CSV with one `height_m,adc_count` row per
    /// observation.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a row does not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = fs::read(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(&file[..]);

        let mut samples = vec![];
        for result in rdr.deserialize() {
            let record: Row<E> = result?;
            samples.push(RawSample {
                height: record.0,
                count: record.1,
            });
        }
        log::debug!("read {} calibration rows from {path:?}", samples.len());

        Ok(Self { samples })
    }
}
