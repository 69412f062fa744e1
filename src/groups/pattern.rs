use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// What drives a group's members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalSource {
    /// Members are only changed by explicit sets
    #[default]
    None,
    /// A beat-synced pattern writes members and fires triggers
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatternType {
    #[default]
    Oscillator,
    Tap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OscillatorType {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl OscillatorType {
    /// Waveform value in 0..1 at `phase`
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            OscillatorType::Sine => ((phase * TAU - PI / 2.0).sin() + 1.0) / 2.0,
            OscillatorType::Square => ((phase * TAU).sin().signum() + 1.0) / 2.0,
            OscillatorType::Triangle => (2.0 * (phase - (0.5 + phase).floor())).abs(),
            OscillatorType::Sawtooth => phase - phase.floor(),
        }
    }
}

/// Output of one playback step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PatternOutput {
    pub value: f32,
    pub triggered: bool,
}

/// Beat-synced pattern: one cycle spans `num_beats` beats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    #[serde(default)]
    pub pattern_type: PatternType,
    #[serde(default)]
    pub oscillator_type: OscillatorType,
    #[serde(default = "default_num_beats")]
    pub num_beats: u32,
    /// Cycle positions (0..1) at which a tap pattern fires
    #[serde(default)]
    pub tap_triggers: Vec<f32>,
    #[serde(skip)]
    phase: f32,
    #[serde(skip)]
    value: f32,
}

fn default_num_beats() -> u32 {
    4
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new(PatternType::Oscillator)
    }
}

impl Pattern {
    pub fn new(pattern_type: PatternType) -> Self {
        let mut pattern = Self {
            pattern_type,
            oscillator_type: OscillatorType::default(),
            num_beats: default_num_beats(),
            tap_triggers: Vec::new(),
            phase: 0.0,
            value: 0.0,
        };
        pattern.reset();
        pattern
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_num_beats(&mut self, num_beats: u32) {
        self.num_beats = num_beats.max(1);
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.value = match self.pattern_type {
            PatternType::Oscillator => self.oscillator_type.evaluate(0.0),
            PatternType::Tap => 0.0,
        };
    }

    /// Record a tap trigger at the current cycle position
    pub fn add_trigger_at_current_phase(&mut self) {
        self.tap_triggers.push(self.phase);
        self.tap_triggers.sort_by(f32::total_cmp);
    }

    /// Replace tap triggers with `count` evenly spaced positions
    pub fn set_trigger_count(&mut self, count: u32) {
        self.tap_triggers = (0..count).map(|i| i as f32 / count as f32).collect();
    }

    pub fn clear_triggers(&mut self) {
        self.tap_triggers.clear();
    }

    /// Step forward by `delta_beats`
    pub fn advance(&mut self, delta_beats: f32) -> PatternOutput {
        let previous = self.phase;
        let end = previous + delta_beats.max(0.0) / self.num_beats.max(1) as f32;
        let wrapped = end >= 1.0;
        self.phase = end.fract();

        let (value, triggered) = match self.pattern_type {
            PatternType::Oscillator => {
                let value = self.oscillator_type.evaluate(self.phase);
                let triggered = match self.oscillator_type {
                    OscillatorType::Square => value != self.value,
                    _ => wrapped,
                };
                (value, triggered)
            }
            PatternType::Tap => {
                let triggered = self
                    .tap_triggers
                    .iter()
                    .any(|position| crossed(previous, end, *position));
                (if triggered { 1.0 } else { 0.0 }, triggered)
            }
        };

        self.value = value;
        PatternOutput { value, triggered }
    }
}

/// Whether cycle position `position` lies in (start, end], accounting for one wrap
fn crossed(start: f32, end: f32, position: f32) -> bool {
    (start < position && position <= end) || (start < position + 1.0 && position + 1.0 <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_oscillator_shapes() {
        assert!(close(OscillatorType::Sine.evaluate(0.0), 0.0));
        assert!(close(OscillatorType::Sine.evaluate(0.5), 1.0));
        assert_eq!(OscillatorType::Square.evaluate(0.25), 1.0);
        assert_eq!(OscillatorType::Square.evaluate(0.75), 0.0);
        assert!(close(OscillatorType::Triangle.evaluate(0.25), 0.5));
        assert!(close(OscillatorType::Triangle.evaluate(0.5), 1.0));
        assert!(close(OscillatorType::Sawtooth.evaluate(0.75), 0.75));
    }

    #[test]
    fn test_square_fires_on_each_edge() {
        let mut pattern = Pattern::new(PatternType::Oscillator);
        pattern.oscillator_type = OscillatorType::Square;
        pattern.set_num_beats(1);
        pattern.reset();
        let fired: Vec<bool> = (0..8).map(|_| pattern.advance(0.125).triggered).collect();
        assert_eq!(fired.iter().filter(|f| **f).count(), 2);
    }

    #[test]
    fn test_sine_fires_once_per_cycle() {
        let mut pattern = Pattern::new(PatternType::Oscillator);
        pattern.set_num_beats(2);
        let fired = (0..16).filter(|_| pattern.advance(0.25).triggered).count();
        assert_eq!(fired, 2);
    }

    #[test]
    fn test_tap_triggers() {
        let mut pattern = Pattern::new(PatternType::Tap);
        pattern.set_num_beats(1);
        pattern.set_trigger_count(4);
        assert_eq!(pattern.tap_triggers, vec![0.0, 0.25, 0.5, 0.75]);
        let fired = (0..8).filter(|_| pattern.advance(0.125).triggered).count();
        assert_eq!(fired, 4);
        pattern.clear_triggers();
        assert!(!pattern.advance(0.5).triggered);
    }

    #[test]
    fn test_add_trigger_at_current_phase() {
        let mut pattern = Pattern::new(PatternType::Tap);
        pattern.set_num_beats(1);
        pattern.advance(0.5);
        pattern.add_trigger_at_current_phase();
        assert_eq!(pattern.tap_triggers, vec![0.5]);
        assert!(!pattern.advance(0.25).triggered);
        assert!(!pattern.advance(0.5).triggered);
        assert!(pattern.advance(0.5).triggered);
    }
}
