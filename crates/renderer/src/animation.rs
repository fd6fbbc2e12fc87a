//! Julia constant animation and frame-rate sampling.

use std::f64::consts::TAU;
use std::time::Duration;

use tracing::debug;

use crate::runtime::{SystemTimeSource, TimeSource};

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSettings {
    /// Wall-clock time between samples.
    pub interval: Duration,
    /// Number of samples for one trip around the circle.
    pub period: u32,
    pub radius: f64,
    /// Feed the real part into `C_im` as well.
    pub mirror_imaginary: bool,
    /// Leading text of the window title.
    pub caption: String,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(50),
            period: 250,
            radius: 0.7885,
            mirror_imaginary: true,
            caption: "fracview".to_string(),
        }
    }
}

/// Complex parameter `c` of the Julia iteration `z = z² + c`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JuliaConstant {
    pub re: f64,
    pub im: f64,
}

impl JuliaConstant {
    /// Point `counter` of `period` evenly spaced points on a circle, starting
    /// at the top and running clockwise.
    pub fn on_circle(counter: u32, period: u32, radius: f64) -> Self {
        let angle = TAU * f64::from(counter) / f64::from(period.max(1));
        Self {
            re: radius * angle.sin(),
            im: radius * angle.cos(),
        }
    }

    /// Value handed to the shader's `C_im` uniform.
    pub fn uniform_imaginary(&self, mirror_imaginary: bool) -> f64 {
        if mirror_imaginary {
            self.re
        } else {
            self.im
        }
    }
}

/// Emitted whenever a sampling interval elapses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSample {
    /// Frames counted during the interval that just closed.
    pub fps: u32,
    /// Counter value the constant was computed from.
    pub counter: u32,
    pub constant: JuliaConstant,
}

/// Samples the frame rate and steps the Julia constant once per interval of
/// `clock` time.
#[derive(Debug)]
pub struct AnimationDriver<C = SystemTimeSource> {
    clock: C,
    settings: AnimationSettings,
    last_sample: Duration,
    ticks: u32,
    fps: u32,
    counter: u32,
    constant: JuliaConstant,
}

impl<C: TimeSource> AnimationDriver<C> {
    /// Starts a driver whose first interval begins at the clock's current time.
    ///
    /// The constant stays at the origin until the first sample.
    pub fn new(settings: AnimationSettings, clock: C) -> Self {
        let last_sample = clock.elapsed();
        Self {
            clock,
            settings,
            last_sample,
            ticks: 0,
            fps: 0,
            counter: 0,
            constant: JuliaConstant::default(),
        }
    }

    /// Counts one rendered frame and samples when the interval has passed.
    pub fn tick(&mut self) -> Option<AnimationSample> {
        let now = self.clock.elapsed();
        self.ticks = self.ticks.saturating_add(1);
        if now.saturating_sub(self.last_sample) <= self.settings.interval {
            return None;
        }

        self.fps = self.ticks;
        self.ticks = 0;
        self.last_sample = now;

        let sampled = self.counter;
        self.constant = JuliaConstant::on_circle(sampled, self.settings.period, self.settings.radius);
        self.counter = (self.counter + 1) % self.settings.period.max(1);

        debug!(fps = self.fps, counter = sampled, "animation sample");
        Some(AnimationSample {
            fps: self.fps,
            counter: sampled,
            constant: self.constant,
        })
    }

    pub fn constant(&self) -> JuliaConstant {
        self.constant
    }

    /// Counter value the next sample will use.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    #[cfg(test)]
    pub(crate) fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

/// Builds the window caption shown after every sample.
pub fn window_title(
    caption: &str,
    sample: &AnimationSample,
    iterations: u32,
    zoom: f64,
) -> String {
    format!(
        "{caption}, FPS: {fps}, Iterations: {iterations}, Zoom: {zoom}, At: ({re:.8} + {im:.8}i), Step: {counter}",
        fps = sample.fps,
        re = sample.constant.re,
        im = sample.constant.im,
        counter = sample.counter,
    )
}
