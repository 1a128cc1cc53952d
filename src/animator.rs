use crate::clock::{impulse_for, IMPULSE_TABLE};
use crate::wave::{WaveLine, WaveParams, WaveStyle};
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoopState {
    Running,
    Paused,
    Stopped,
}

impl LoopState {
    pub(crate) fn name(self) -> &'static str {
        match self {
            LoopState::Running => "running",
            LoopState::Paused => "paused",
            LoopState::Stopped => "stopped",
        }
    }
}

/// Owns the wave line and decides when it advances.
///
/// The frame loop asks `update` once per frame; pausing just makes those
/// calls no-ops until `resume` resets the time baseline.
pub(crate) struct Animator {
    line: WaveLine,
    state: LoopState,
    last: Instant,
}

impl Animator {
    /// Sizes the line, seeds one strong impulse at the middle and starts
    /// producing frames.
    pub(crate) fn start(params: WaveParams, now: Instant, len: usize) -> Self {
        let mut line = WaveLine::new(params);
        line.resize(len);
        let seed = impulse_for(IMPULSE_TABLE.len() - 1);
        line.impulse((line.len() / 2) as i64, seed.radius, seed.strength);
        Self {
            line,
            state: LoopState::Running,
            last: now,
        }
    }

    /// Tears the loop down for good; later frames and resumes are ignored.
    pub(crate) fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    pub(crate) fn pause(&mut self) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.state = LoopState::Paused;
        true
    }

    pub(crate) fn resume(&mut self, now: Instant) -> bool {
        if self.state != LoopState::Paused {
            return false;
        }
        self.last = now;
        self.state = LoopState::Running;
        true
    }

    /// Advances the simulation to `now`. Returns whether a frame was produced.
    pub(crate) fn update(&mut self, now: Instant) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        let dt_ms = now.saturating_duration_since(self.last).as_secs_f64() * 1000.0;
        self.last = now;
        self.line.step(dt_ms);
        true
    }

    pub(crate) fn resize(&mut self, len: usize) {
        self.line.resize(len);
    }

    pub(crate) fn impulse(&mut self, position: i64, radius: usize, strength: f64) {
        self.line.impulse(position, radius, strength);
    }

    pub(crate) fn text(&self, style: WaveStyle) -> String {
        self.line.render_as(style)
    }

    pub(crate) fn state(&self) -> LoopState {
        self.state
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub(crate) fn line(&self) -> &WaveLine {
        &self.line
    }
}
