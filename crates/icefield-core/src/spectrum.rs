use crate::analyser::{AnalyserConfig, ConfigError, FrequencySource};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Host-side analyser producing the same byte spectrum a Web Audio
/// `AnalyserNode` reports for the pushed PCM samples.
///
/// Per query: Blackman window over the newest `fft_size` samples, forward
/// FFT, magnitude / N, exponential smoothing against the previous query,
/// conversion to dB and a linear map of `[min_decibels, max_decibels]`
/// onto `0..=255`.
pub struct SoftwareAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    // ring buffer of the newest fft_size samples; `write` is the oldest slot
    history: Vec<f32>,
    write: usize,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SoftwareAnalyser {
    pub fn new(config: AnalyserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let n = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        let window = (0..n).map(|i| blackman(i, n)).collect();
        Ok(Self {
            fft,
            window,
            history: vec![0.0; n],
            write: 0,
            scratch: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; config.bin_count()],
            config,
        })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Append mono samples; only the newest `fft_size` are kept.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let n = self.history.len();
        for &s in samples {
            self.history[self.write] = s;
            self.write = (self.write + 1) % n;
        }
    }

    fn analyse(&mut self) {
        let n = self.history.len();
        for i in 0..n {
            let s = self.history[(self.write + i) % n];
            self.scratch[i] = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let tau = self.config.smoothing as f32;
        let inv_n = 1.0 / n as f32;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let mag = self.scratch[k].norm() * inv_n;
            *smoothed = tau * *smoothed + (1.0 - tau) * mag;
        }
    }

    fn to_byte(&self, magnitude: f32) -> u8 {
        if magnitude <= 0.0 {
            return 0;
        }
        let db = 20.0 * (magnitude as f64).log10();
        let min = self.config.min_decibels;
        let range = self.config.max_decibels - min;
        let scaled = (255.0 / range) * (db - min);
        scaled.clamp(0.0, 255.0).floor() as u8
    }
}

impl FrequencySource for SoftwareAnalyser {
    fn fill_byte_frequency_data(&mut self, out: &mut [u8]) {
        self.analyse();
        for (dst, &mag) in out.iter_mut().zip(self.smoothed.iter()) {
            *dst = self.to_byte(mag);
        }
    }
}

#[inline]
fn blackman(index: usize, size: usize) -> f32 {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyser::AudioAnalysis;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(bin: usize, fft_size: usize, len: usize, amplitude: f32) -> Vec<f32> {
        let freq = bin as f32 * SAMPLE_RATE / fft_size as f32;
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn unsmoothed() -> AnalyserConfig {
        AnalyserConfig {
            smoothing: 0.0,
            ..AnalyserConfig::default()
        }
    }

    #[test]
    fn silence_maps_to_zero() {
        let mut analyser = SoftwareAnalyser::new(AnalyserConfig::default()).unwrap();
        analyser.push_samples(&[0.0; 512]);
        let mut out = [7u8; 128];
        analyser.fill_byte_frequency_data(&mut out);
        assert!(out.iter().all(|&v| v == 0));
    }

    #[test]
    fn pure_tone_peaks_at_its_bin() {
        let mut analyser = SoftwareAnalyser::new(unsmoothed()).unwrap();
        // -60 dBFS keeps the main lobe below the 255 ceiling
        analyser.push_samples(&sine(20, 256, 1024, 0.001));
        let mut analysis = AudioAnalysis::new(unsmoothed(), Some(analyser)).unwrap();
        let snap = analysis.sample();
        assert_eq!(snap.len(), 128);
        let (peak_bin, peak) = snap.peak().expect("tone should register");
        assert_eq!(peak_bin, 20);
        assert!(peak > snap.bins()[19] && peak > snap.bins()[21]);
        // far from the tone the Blackman sidelobes sit below the floor
        assert_eq!(snap.bins()[60], 0);
    }

    #[test]
    fn smoothing_rises_gradually() {
        let mut analyser = SoftwareAnalyser::new(AnalyserConfig::default()).unwrap();
        analyser.push_samples(&sine(10, 256, 256, 1.0));
        let mut first = [0u8; 128];
        analyser.fill_byte_frequency_data(&mut first);
        let mut later = [0u8; 128];
        for _ in 0..40 {
            analyser.fill_byte_frequency_data(&mut later);
        }
        assert!(first[10] > 0);
        assert!(later[10] > first[10]);
    }

    #[test]
    fn only_newest_window_is_analysed() {
        let mut analyser = SoftwareAnalyser::new(unsmoothed()).unwrap();
        analyser.push_samples(&sine(30, 256, 256, 1.0));
        analyser.push_samples(&[0.0; 256]);
        let mut out = [0u8; 128];
        analyser.fill_byte_frequency_data(&mut out);
        assert!(out.iter().all(|&v| v == 0));
    }
}
