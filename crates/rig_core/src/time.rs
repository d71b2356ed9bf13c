use std::time::{Duration, Instant};

use crate::animation::TICK_INTERVAL_MS;

const FPS_SAMPLE_COUNT: usize = 60;

/// Turns wall-clock time into a whole number of fixed animation ticks.
///
/// Time only accumulates while something is animating. When a tween starts
/// from idle the caller `resync`s, so a long idle wait never turns into a
/// burst of catch-up ticks.
pub struct TickClock {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    last_instant: Instant,
    pub total_ticks: u64,
    pub ticks_this_frame: u32,
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            fixed_dt: TICK_INTERVAL_MS as f64 / 1000.0,
            max_accumulator: 0.25,
            accumulator: 0.0,
            last_instant: Instant::now(),
            total_ticks: 0,
            ticks_this_frame: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.fixed_dt)
    }

    /// Forget accumulated time and restart measuring from now.
    pub fn resync(&mut self) {
        self.accumulator = 0.0;
        self.last_instant = Instant::now();
    }

    /// Measure wall-clock time since the last call and bank it.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Bank `dt` seconds. Split out from `begin_frame` so tick sequences can
    /// be driven without a real clock.
    pub fn advance(&mut self, dt: f64) {
        let mut dt = dt.max(0.0);
        // Spiral-of-death cap
        if dt > self.max_accumulator {
            log::warn!(
                "Tick clock stalled for {:.1}ms, capping to {}ms",
                dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            dt = self.max_accumulator;
        }
        self.accumulator += dt;
        self.ticks_this_frame = 0;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_ticks += 1;
            self.ticks_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// When the next tick is due, measured from the last `begin_frame`.
    pub fn next_deadline(&self) -> Instant {
        let remaining = (self.fixed_dt - self.accumulator).max(0.0);
        self.last_instant + Duration::from_secs_f64(remaining)
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Smoothed presentation rate, sampled once per drawn frame.
pub struct FrameTimer {
    last_instant: Instant,
    samples: [f64; FPS_SAMPLE_COUNT],
    sample_index: usize,
    pub frame_count: u64,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last_instant: Instant::now(),
            samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            sample_index: 0,
            frame_count: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn record_frame(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.record_sample(dt);
    }

    pub fn record_sample(&mut self, dt: f64) {
        self.frame_count += 1;
        self.samples[self.sample_index] = dt;
        self.sample_index = (self.sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
