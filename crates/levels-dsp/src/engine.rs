// SPDX-License-Identifier: LGPL-3.0-or-later

//! Level metering engine.
//!
//! Orchestrates the weighting filter, RMS smoother, peak tracker, and
//! needle ballistics per channel, converts measurements to dB or SPL
//! according to the metering mode, and publishes the results for the
//! display layer.
//!
//! The engine is driven from two call sites: [`process_block`] at audio
//! block cadence and [`tick`] at display-tick cadence for the slow text
//! labels. It is the single writer of its state; consumers read through
//! the lock-free [`LevelsHandle`] snapshot or a [`LevelSink`].
//!
//! Processing never fails: degraded inputs are logged and every reading
//! stays finite (floored logarithms).
//!
//! [`process_block`]: LevelMeterEngine::process_block
//! [`tick`]: LevelMeterEngine::tick

use crate::consts::{
    DEFAULT_RESPONSE_TIME_S, DEFAULT_SAMPLE_RATE, LABEL_PERIOD_MS, MAX_CHANNELS,
    PEAK_AMP_FLOOR, PEAK_CREST_CORRECTION_DB, PEAK_RESPONSE_TIME_S, RMS_POWER_FLOOR,
    SPL_REFERENCE_DB, TICK_PERIOD_MS,
};
use crate::error::MeterError;
use crate::filters::weighting::AWeightingFilter;
use crate::meters::ballistics::BallisticPeak;
use crate::meters::peak::PeakTracker;
use crate::meters::smoother::SmoothingKernel;
use crate::mode::MeteringMode;
use crate::snapshot::{LevelSnapshot, LevelsHandle};
use crate::units::{gain_to_db, power_to_db};

/// Engine timing and response configuration.
///
/// Received at construction; the engine owns no other configuration and
/// reaches into no global state.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// RMS smoothing response time in seconds.
    pub response_time: f32,
    /// Peak tracker release response time in seconds.
    pub peak_response_time: f32,
    /// Display tick period in milliseconds.
    pub tick_period_ms: f32,
    /// Slow text-label refresh period in milliseconds; must be a whole
    /// multiple of the tick period.
    pub label_period_ms: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            response_time: DEFAULT_RESPONSE_TIME_S,
            peak_response_time: PEAK_RESPONSE_TIME_S,
            tick_period_ms: TICK_PERIOD_MS,
            label_period_ms: LABEL_PERIOD_MS,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), MeterError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(MeterError::InvalidSampleRate(self.sample_rate));
        }
        for &time in &[self.response_time, self.peak_response_time] {
            if !(time.is_finite() && time > 0.0) {
                return Err(MeterError::InvalidResponseTime(time));
            }
        }
        if !(self.tick_period_ms.is_finite() && self.tick_period_ms > 0.0) {
            return Err(MeterError::InvalidTickPeriod(self.tick_period_ms));
        }
        let ratio = self.label_period_ms / self.tick_period_ms;
        if !ratio.is_finite() || ratio < 1.0 || (ratio - ratio.round()).abs() > 1e-6 {
            return Err(MeterError::InvalidLabelPeriod {
                label_ms: self.label_period_ms,
                tick_ms: self.tick_period_ms,
            });
        }
        Ok(())
    }

    /// Number of display ticks between slow-label refreshes.
    pub fn label_steps(&self) -> usize {
        (self.label_period_ms / self.tick_period_ms).round() as usize
    }

    /// Display tick period in seconds.
    fn tick_period_s(&self) -> f32 {
        self.tick_period_ms / 1000.0
    }
}

/// Per-channel meter readings for one instant.
///
/// Overwritten on every processed block; consumers that need a stable
/// copy take it by value or read a published snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelRecord {
    /// Smoothed RMS level in dBFS (RMS mode) or dB SPL (dBA/SPL modes).
    pub level_rms_db: f32,
    /// Tracked peak level in dBFS or dB SPL.
    pub level_max_db: f32,
    /// Ballistic needle position, normalized [0, 1].
    pub peak_iec: f32,
}

impl Default for LevelRecord {
    /// Floored silence readings; finite by construction.
    fn default() -> Self {
        Self {
            level_rms_db: power_to_db(RMS_POWER_FLOOR),
            level_max_db: gain_to_db(PEAK_AMP_FLOOR),
            peak_iec: 0.0,
        }
    }
}

/// Typed push interface for the display layer.
///
/// Replaces any by-name object lookup: the engine hands structured
/// records to whatever implements this trait.
pub trait LevelSink {
    /// A channel's fast level record was refreshed.
    fn levels_updated(&mut self, channel: usize, record: LevelRecord);

    /// A channel's slow (text label) record was refreshed.
    fn slow_levels_updated(&mut self, _channel: usize, _record: LevelRecord) {}

    /// The active channel count changed.
    fn channel_count_changed(&mut self, _two_channels: bool) {}
}

/// All metering state for one channel.
#[derive(Debug, Clone)]
struct ChannelMeter {
    filter: AWeightingFilter,
    /// Previous smoothed mean-square value; invariant: > 0.
    old_rms: f32,
    peak: PeakTracker,
    needle: BallisticPeak,
    record: LevelRecord,
    slow_record: LevelRecord,
}

impl ChannelMeter {
    fn new(config: &EngineConfig) -> Self {
        Self {
            filter: AWeightingFilter::new(config.sample_rate),
            old_rms: RMS_POWER_FLOOR,
            peak: PeakTracker::new(config.peak_response_time, config.tick_period_s()),
            needle: BallisticPeak::new(config.tick_period_s()),
            record: LevelRecord::default(),
            slow_record: LevelRecord::default(),
        }
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.old_rms = RMS_POWER_FLOOR;
        self.peak.reset();
        self.needle.reset();
        self.record = LevelRecord::default();
        self.slow_record = LevelRecord::default();
    }
}

/// Real-time level metering engine for one or two channels.
///
/// # Examples
///
/// ```
/// use levels_dsp::{EngineConfig, LevelMeterEngine, MeteringMode};
///
/// let mut engine = LevelMeterEngine::new(EngineConfig::default()).unwrap();
/// let block: Vec<f32> = (0..1200)
///     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin())
///     .collect();
/// engine.process_block(&[&block], MeteringMode::Rms, 0.0);
/// assert!(engine.levels(0).level_rms_db.is_finite());
/// ```
#[derive(Debug)]
pub struct LevelMeterEngine {
    config: EngineConfig,
    kernel: SmoothingKernel,
    channels: Vec<ChannelMeter>,
    two_channels: bool,
    label_steps: usize,
    tick_index: usize,
    /// Block workspace: weighted samples, then their squares.
    scratch: Vec<f32>,
    handle: LevelsHandle,
    mode_fallback_warned: bool,
}

impl LevelMeterEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, MeterError> {
        config.validate()?;

        let kernel = SmoothingKernel::new(config.response_time, config.sample_rate);
        let channels = (0..MAX_CHANNELS).map(|_| ChannelMeter::new(&config)).collect();
        let label_steps = config.label_steps();

        Ok(Self {
            config,
            kernel,
            channels,
            two_channels: false,
            label_steps,
            tick_index: 0,
            scratch: Vec::new(),
            handle: LevelsHandle::new(),
            mode_fallback_warned: false,
        })
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A cloneable read handle for lock-free snapshot consumers.
    pub fn handle(&self) -> LevelsHandle {
        self.handle.clone()
    }

    /// Whether two channels are currently active.
    pub fn two_channels(&self) -> bool {
        self.two_channels
    }

    /// Current fast level record for a channel slot.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= 2`.
    pub fn levels(&self, channel: usize) -> LevelRecord {
        self.channels[channel].record
    }

    /// Current slow (text label) record for a channel slot.
    pub fn slow_levels(&self, channel: usize) -> LevelRecord {
        self.channels[channel].slow_record
    }

    /// Resolve a mode provider label, falling back to RMS.
    ///
    /// An unrecognized label is a configuration error: it is logged once
    /// and RMS mode is used from then on until a valid label appears.
    pub fn resolve_mode(&mut self, label: &str) -> MeteringMode {
        match label.parse() {
            Ok(mode) => mode,
            Err(_) => {
                if !self.mode_fallback_warned {
                    log::warn!("unrecognized metering mode {label:?}, falling back to RMS");
                    self.mode_fallback_warned = true;
                }
                MeteringMode::Rms
            }
        }
    }

    /// Process one multichannel sample block.
    ///
    /// Each element of `input` is one channel's samples; channels beyond
    /// the second are ignored. The block is not retained. Mode and
    /// microphone sensitivity are polled by the caller and passed in
    /// explicitly; sensitivity is only used in SPL-calibrated modes.
    ///
    /// An empty `input` is treated as a data gap: the active channels
    /// decay by one tick's worth.
    ///
    /// # Returns
    /// `true` if the active channel count changed with this block.
    pub fn process_block(
        &mut self,
        input: &[&[f32]],
        mode: MeteringMode,
        mic_sensitivity_db: f32,
    ) -> bool {
        let active = input.len().min(MAX_CHANNELS);

        let mut changed = false;
        if active > 0 {
            let two = active == MAX_CHANNELS;
            changed = two != self.two_channels;
            self.two_channels = two;
            for ch in 0..active {
                self.process_channel(ch, input[ch], mode, mic_sensitivity_db);
            }
        } else {
            for ch in 0..self.active_channels() {
                self.process_channel(ch, &[], mode, mic_sensitivity_db);
            }
        }

        self.publish();
        changed
    }

    /// Process one block and push the results into a sink.
    ///
    /// Same as [`process_block`](Self::process_block), additionally
    /// notifying `sink` of a channel-count change and of every refreshed
    /// record.
    pub fn process_block_into(
        &mut self,
        input: &[&[f32]],
        mode: MeteringMode,
        mic_sensitivity_db: f32,
        sink: &mut dyn LevelSink,
    ) -> bool {
        let changed = self.process_block(input, mode, mic_sensitivity_db);
        if changed {
            sink.channel_count_changed(self.two_channels);
        }
        for ch in 0..self.active_channels() {
            sink.levels_updated(ch, self.channels[ch].record);
        }
        changed
    }

    /// Advance the display tick.
    ///
    /// Every `label_period / tick_period` ticks the current records are
    /// copied into the slow records; the counter wraps modulo that
    /// period.
    pub fn tick(&mut self) {
        self.tick_index += 1;
        if self.tick_index == self.label_steps {
            for ch in 0..self.active_channels() {
                self.channels[ch].slow_record = self.channels[ch].record;
            }
        }
        self.tick_index %= self.label_steps;
        self.publish();
    }

    /// Advance the display tick and push refreshed slow records.
    pub fn tick_into(&mut self, sink: &mut dyn LevelSink) {
        let refreshing = self.tick_index + 1 == self.label_steps;
        self.tick();
        if refreshing {
            for ch in 0..self.active_channels() {
                sink.slow_levels_updated(ch, self.channels[ch].slow_record);
            }
        }
    }

    /// Push the current records for all active channels into a sink.
    pub fn push_levels(&self, sink: &mut dyn LevelSink) {
        for ch in 0..self.active_channels() {
            sink.levels_updated(ch, self.channels[ch].record);
            sink.slow_levels_updated(ch, self.channels[ch].slow_record);
        }
    }

    /// Reset all per-channel state and the tick counter.
    pub fn reset(&mut self) {
        for meter in &mut self.channels {
            meter.reset();
        }
        self.two_channels = false;
        self.tick_index = 0;
        self.publish();
    }

    fn active_channels(&self) -> usize {
        if self.two_channels {
            MAX_CHANNELS
        } else {
            1
        }
    }

    /// Run the full per-channel measurement chain on one block.
    fn process_channel(
        &mut self,
        ch: usize,
        samples: &[f32],
        mode: MeteringMode,
        mic_sensitivity_db: f32,
    ) {
        let Self {
            channels,
            kernel,
            scratch,
            ..
        } = self;
        let meter = &mut channels[ch];

        scratch.clear();
        scratch.extend_from_slice(samples);

        if mode.applies_weighting() {
            if samples.len() < meter.filter.min_block_len() {
                log::warn!(
                    "channel {ch}: {} samples received but the weighting filter needs at least {}",
                    samples.len(),
                    meter.filter.min_block_len()
                );
            }
            meter.filter.process(scratch);
        }

        let peak = meter.peak.track(scratch);

        for x in scratch.iter_mut() {
            *x *= *x;
        }
        let rms = kernel.smoothed_value(scratch, meter.old_rms);
        meter.old_rms = rms.max(RMS_POWER_FLOOR);

        let rms_db = power_to_db(meter.old_rms);
        let peak_db = gain_to_db(peak.max(PEAK_AMP_FLOOR));

        let (level_rms_db, level_max_db) = if mode.spl_calibrated() {
            (
                SPL_REFERENCE_DB - mic_sensitivity_db + rms_db,
                SPL_REFERENCE_DB - PEAK_CREST_CORRECTION_DB - mic_sensitivity_db + peak_db,
            )
        } else {
            (rms_db, peak_db)
        };

        let needle_db = level_max_db.max(level_rms_db);
        let peak_iec = meter.needle.update(needle_db, mode.scale());

        meter.record = LevelRecord {
            level_rms_db,
            level_max_db,
            peak_iec,
        };
    }

    /// Publish the current state as an immutable snapshot.
    fn publish(&self) {
        let mut snapshot = LevelSnapshot {
            two_channels: self.two_channels,
            ..LevelSnapshot::default()
        };
        for (ch, meter) in self.channels.iter().enumerate() {
            snapshot.levels[ch] = meter.record;
            snapshot.slow_levels[ch] = meter.slow_record;
        }
        self.handle.publish(snapshot);
    }
}
