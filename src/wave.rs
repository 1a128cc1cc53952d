use serde::{Deserialize, Serialize};

/// Letters a line cell can show, lowest height first.
pub(crate) const WAVE_ALPHABET: [char; 52] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J',
    'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Eighth blocks, shortest first. Letters map onto these by alphabet index.
const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// How a line cell is drawn: the letter itself, or a bar as tall as the
/// letter's place in the alphabet (the line then reads as a waveform).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum WaveStyle {
    #[default]
    Bars,
    Letters,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct WaveParams {
    pub(crate) wave_speed: f64,         // per ms
    pub(crate) damping: f64,            // per ms
    pub(crate) scale_down: f64,         // height mapped onto the full alphabet is ±scale_down
    pub(crate) max_frame_delta_ms: f64, // one 60 Hz frame
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wave_speed: 0.01,
            damping: 0.0005,
            scale_down: 5.0,
            max_frame_delta_ms: 1000.0 / 60.0,
        }
    }
}

pub(crate) fn bar_for(level: usize) -> char {
    let level = level.min(WAVE_ALPHABET.len() - 1);
    BARS[level * BARS.len() / WAVE_ALPHABET.len()]
}

/// Damped 1-D wave over a row of character cells.
///
/// Cells outside the line are pinned at height zero, so both ends act as
/// fixed boundaries.
#[derive(Clone, Debug)]
pub(crate) struct WaveLine {
    params: WaveParams,
    heights: Vec<f64>,
    velocities: Vec<f64>,
    // scratch copy of the previous frame's heights
    snapshot: Vec<f64>,
}

impl WaveLine {
    pub(crate) fn new(params: WaveParams) -> Self {
        Self {
            params,
            heights: Vec::new(),
            velocities: Vec::new(),
            snapshot: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.heights.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub(crate) fn params(&self) -> &WaveParams {
        &self.params
    }

    pub(crate) fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub(crate) fn velocities(&self) -> &[f64] {
        &self.velocities
    }

    /// Reallocates both fields, zeroed, when the length changes.
    pub(crate) fn resize(&mut self, new_len: usize) {
        if new_len == self.heights.len() {
            return;
        }
        self.heights = vec![0.0; new_len];
        self.velocities = vec![0.0; new_len];
        self.snapshot = vec![0.0; new_len];
    }

    /// Adds a Gaussian bump of `strength` centred on `position` to the
    /// velocity field. Cells that fall off the line are skipped.
    pub(crate) fn impulse(&mut self, position: i64, radius: usize, strength: f64) {
        let sigma = radius as f64 / 2.0;
        // only walk the offsets that land on the line; i128 can't overflow here
        let (p, r) = (position as i128, radius as i128);
        let len = self.velocities.len() as i128;
        let lo = (-r).max(-p);
        let hi = r.min(len - 1 - p);

        for i in lo..=hi {
            let weight = if i == 0 {
                1.0
            } else {
                let x = i as f64;
                (-(x * x) / (2.0 * sigma * sigma)).exp()
            };
            self.velocities[(p + i) as usize] += strength * weight;
        }
    }

    /// Advances the field by `dt_ms`, clamped to one frame.
    pub(crate) fn step(&mut self, dt_ms: f64) {
        let dt = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, self.params.max_frame_delta_ms)
        } else {
            0.0
        };
        let c2 = self.params.wave_speed * self.params.wave_speed;
        let k = self.params.damping;

        self.snapshot.copy_from_slice(&self.heights);
        let old = &self.snapshot;
        let n = old.len();

        for i in 0..n {
            let left = if i > 0 { old[i - 1] } else { 0.0 };
            let right = if i + 1 < n { old[i + 1] } else { 0.0 };
            let acceleration = (left + right - 2.0 * old[i]) * c2;

            let v = &mut self.velocities[i];
            *v += acceleration * dt;
            *v -= k * *v * dt;
            self.heights[i] += *v * dt;
        }
    }

    /// Alphabet index for `height`, clamped to the ends.
    pub(crate) fn level_for(&self, height: f64) -> usize {
        let s = self.params.scale_down;
        let value = (height + s) / (2.0 * s);
        let top = (WAVE_ALPHABET.len() - 1) as f64;
        let idx = (value * WAVE_ALPHABET.len() as f64).floor();
        // NaN falls through both comparisons and lands on 'a'
        if idx >= top {
            WAVE_ALPHABET.len() - 1
        } else if idx > 0.0 {
            idx as usize
        } else {
            0
        }
    }

    pub(crate) fn glyph_for(&self, height: f64) -> char {
        WAVE_ALPHABET[self.level_for(height)]
    }

    pub(crate) fn render(&self) -> String {
        self.heights.iter().map(|&h| self.glyph_for(h)).collect()
    }

    pub(crate) fn render_as(&self, style: WaveStyle) -> String {
        match style {
            WaveStyle::Letters => self.render(),
            WaveStyle::Bars => self
                .heights
                .iter()
                .map(|&h| bar_for(self.level_for(h)))
                .collect(),
        }
    }

    /// Discrete energy conserved by the undamped integrator.
    ///
    /// Plain kinetic plus potential energy wobbles from frame to frame under
    /// semi-implicit Euler; the extra `dt·v·Ah` term makes it an exact
    /// invariant without damping. With damping it decays overall, but on very
    /// short lines it can still tick up by a tiny relative amount on a frame.
    pub(crate) fn energy(&self) -> f64 {
        let n = self.heights.len();
        let c2 = self.params.wave_speed * self.params.wave_speed;
        let dt = self.params.max_frame_delta_ms;
        let h = &self.heights;

        let mut kinetic = 0.0;
        let mut potential = 0.0;
        let mut cross = 0.0;
        for i in 0..n {
            let left = if i > 0 { h[i - 1] } else { 0.0 };
            let right = if i + 1 < n { h[i + 1] } else { 0.0 };
            let ah = (left + right - 2.0 * h[i]) * c2;
            kinetic += self.velocities[i] * self.velocities[i];
            potential -= h[i] * ah;
            cross += self.velocities[i] * ah;
        }
        0.5 * (kinetic + potential + dt * cross)
    }
}
