use crate::constants::*;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("fft size {0} must be a power of two between 32 and 32768")]
    FftSize(usize),
    #[error("smoothing constant {0} must be within [0, 1]")]
    Smoothing(f64),
    #[error("decibel range [{min}, {max}] is empty")]
    DecibelRange { min: f64, max: f64 },
}

/// Analyser settings, mirroring the knobs of a Web Audio `AnalyserNode`.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyserConfig {
    /// Samples per transform window.
    pub fft_size: usize,
    /// Weight given to the previous snapshot when smoothing (0.95 = 95%).
    pub smoothing: f64,
    pub min_decibels: f64,
    pub max_decibels: f64,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: ANALYSER_FFT_SIZE,
            smoothing: ANALYSER_SMOOTHING,
            min_decibels: ANALYSER_MIN_DECIBELS,
            max_decibels: ANALYSER_MAX_DECIBELS,
        }
    }
}

impl AnalyserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two()
            || !(ANALYSER_FFT_SIZE_MIN..=ANALYSER_FFT_SIZE_MAX).contains(&self.fft_size)
        {
            return Err(ConfigError::FftSize(self.fft_size));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(ConfigError::DecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }

    /// Number of frequency bins produced per snapshot.
    #[inline]
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// Anything that can write a byte frequency spectrum on demand.
pub trait FrequencySource {
    /// Fill `out` with magnitudes scaled to 0..=255. Bins beyond the
    /// source's own bin count are left untouched.
    fn fill_byte_frequency_data(&mut self, out: &mut [u8]);

    /// Tear down whatever processing graph backs the source.
    fn dispose(&mut self) {}
}

/// Fixed-length byte spectrum, refreshed in place on each query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencySnapshot {
    bins: Vec<u8>,
}

impl FrequencySnapshot {
    pub fn new(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    #[inline]
    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Loudest bin as `(index, magnitude)`; `None` when every bin is silent.
    pub fn peak(&self) -> Option<(usize, u8)> {
        self.bins
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| *v > 0)
            .max_by_key(|(_, v)| *v)
    }

    /// Mean magnitude normalized to [0, 1].
    pub fn level(&self) -> f32 {
        if self.bins.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.bins.iter().map(|&v| v as u32).sum();
        sum as f32 / (self.bins.len() as f32 * 255.0)
    }

    fn clear(&mut self) {
        self.bins.fill(0);
    }
}

/// Run `build` against a freshly created platform resource. If it fails the
/// resource is handed to `release` before the error is returned.
pub fn build_or_release<C, T, E>(
    resource: C,
    build: impl FnOnce(&C) -> Result<T, E>,
    release: impl FnOnce(C),
) -> Result<T, E> {
    match build(&resource) {
        Ok(built) => Ok(built),
        Err(e) => {
            release(resource);
            Err(e)
        }
    }
}

/// Audio analysis front-end.
///
/// Holds an optional live source. When the platform could not build the
/// audio graph the front-end is *degraded*: `sample` still returns a
/// snapshot of the configured length, filled with zeros.
pub struct AudioAnalysis<S> {
    config: AnalyserConfig,
    source: Option<S>,
    snapshot: FrequencySnapshot,
}

impl<S: FrequencySource> AudioAnalysis<S> {
    pub fn new(config: AnalyserConfig, source: Option<S>) -> Result<Self, ConfigError> {
        config.validate()?;
        let snapshot = FrequencySnapshot::new(config.bin_count());
        Ok(Self {
            config,
            source,
            snapshot,
        })
    }

    pub fn degraded(config: AnalyserConfig) -> Result<Self, ConfigError> {
        Self::new(config, None)
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    #[inline]
    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Refresh the snapshot from the source and return it.
    pub fn sample(&mut self) -> &FrequencySnapshot {
        match self.source.as_mut() {
            Some(src) => {
                self.snapshot.clear();
                src.fill_byte_frequency_data(&mut self.snapshot.bins);
            }
            None => self.snapshot.clear(),
        }
        &self.snapshot
    }

    /// Release the source; the front-end is degraded afterwards.
    pub fn dispose(&mut self) {
        if let Some(mut src) = self.source.take() {
            src.dispose();
            log::info!("audio analysis disposed");
        }
        self.snapshot.clear();
    }
}
