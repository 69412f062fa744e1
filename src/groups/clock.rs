use std::time::Instant;

const MIN_BPM: f32 = 20.0;
const MAX_BPM: f32 = 300.0;
const DEFAULT_BPM: f32 = 120.0;

/// Result of advancing the clock by one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClockTick {
    /// Beats elapsed during this tick
    pub delta_beats: f32,
    /// Index of the beat boundary crossed during this tick, if any
    pub beat: Option<u64>,
}

/// Global BPM clock driving group playback.
///
/// Advanced explicitly from the control loop with the elapsed tick time.
#[derive(Debug, Clone)]
pub struct BpmClock {
    /// Beats per minute
    bpm: f32,
    /// Total beats elapsed since start/reset
    current_beat: f32,
    /// Whether the clock is running
    running: bool,
    /// Tap tempo samples for averaging
    tap_times: Vec<Instant>,
}

impl Default for BpmClock {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl BpmClock {
    pub fn new(bpm: f32) -> Self {
        Self {
            bpm: if bpm.is_finite() { bpm.clamp(MIN_BPM, MAX_BPM) } else { DEFAULT_BPM },
            current_beat: 0.0,
            running: true,
            tap_times: Vec::with_capacity(8),
        }
    }

    /// Advance by `delta_secs` (call once per tick)
    pub fn advance(&mut self, delta_secs: f32) -> ClockTick {
        if !self.running || delta_secs <= 0.0 {
            return ClockTick::default();
        }
        let delta_beats = delta_secs * self.bpm / 60.0;
        let before = self.current_beat.floor();
        self.current_beat += delta_beats;
        let after = self.current_beat.floor();
        ClockTick {
            delta_beats,
            beat: (after > before).then_some(after as u64),
        }
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Returns `false` and keeps the current tempo for a non-finite `bpm`
    pub fn set_bpm(&mut self, bpm: f32) -> bool {
        if !bpm.is_finite() {
            tracing::warn!(bpm, "ignoring non-finite tempo");
            return false;
        }
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        true
    }

    pub fn double_bpm(&mut self) {
        self.set_bpm(self.bpm * 2.0);
    }

    pub fn half_bpm(&mut self) {
        self.set_bpm(self.bpm / 2.0);
    }

    /// Seconds per beat at the current tempo
    pub fn beat_duration(&self) -> f32 {
        60.0 / self.bpm
    }

    pub fn current_beat(&self) -> f32 {
        self.current_beat
    }

    /// Phase within the current beat (0.0-1.0)
    pub fn beat_phase(&self) -> f32 {
        self.current_beat.fract()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Restart the beat count so the next beat lands now
    pub fn reset_phase(&mut self) {
        self.current_beat = 0.0;
    }

    /// Tap tempo - call repeatedly to set BPM from taps
    pub fn tap(&mut self) {
        self.tap_at(Instant::now());
    }

    pub fn tap_at(&mut self, now: Instant) {
        // Remove old taps (older than 2 seconds)
        self.tap_times.retain(|t| now.duration_since(*t).as_secs_f32() < 2.0);
        self.tap_times.push(now);

        if self.tap_times.len() >= 2 {
            let total: f32 = self
                .tap_times
                .windows(2)
                .map(|pair| pair[1].duration_since(pair[0]).as_secs_f32())
                .sum();
            let avg_interval = total / (self.tap_times.len() - 1) as f32;
            if avg_interval > 0.0 {
                self.set_bpm(60.0 / avg_interval);
            }
        }

        // Keep only last 8 taps
        if self.tap_times.len() > 8 {
            self.tap_times.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_bpm_clock_new() {
        let clock = BpmClock::new(120.0);
        assert_eq!(clock.bpm(), 120.0);
        assert!(clock.is_running());
    }

    #[test]
    fn test_bpm_clock_set_bpm() {
        let mut clock = BpmClock::new(120.0);
        clock.set_bpm(140.0);
        assert_eq!(clock.bpm(), 140.0);

        // Test clamping
        clock.set_bpm(10.0);
        assert_eq!(clock.bpm(), 20.0);
        clock.set_bpm(500.0);
        assert_eq!(clock.bpm(), 300.0);
    }

    #[test]
    fn test_non_finite_bpm_is_ignored() {
        let mut clock = BpmClock::new(128.0);
        assert!(!clock.set_bpm(f32::NAN));
        assert!(!clock.set_bpm(f32::INFINITY));
        assert_eq!(clock.bpm(), 128.0);

        let tick = clock.advance(60.0 / 128.0);
        assert_eq!(tick.beat, Some(1));
        assert_eq!(BpmClock::new(f32::NAN).bpm(), 120.0);
    }

    #[test]
    fn test_advance_reports_beats() {
        let mut clock = BpmClock::new(120.0);
        let tick = clock.advance(0.25);
        assert_eq!(tick.delta_beats, 0.5);
        assert_eq!(tick.beat, None);
        let tick = clock.advance(0.25);
        assert_eq!(tick.beat, Some(1));
        clock.stop();
        assert_eq!(clock.advance(1.0), ClockTick::default());
    }

    #[test]
    fn test_double_and_half() {
        let mut clock = BpmClock::new(100.0);
        clock.double_bpm();
        assert_eq!(clock.bpm(), 200.0);
        clock.half_bpm();
        clock.half_bpm();
        assert_eq!(clock.bpm(), 50.0);
    }

    #[test]
    fn test_tap_tempo() {
        let mut clock = BpmClock::new(120.0);
        let start = Instant::now();
        for i in 0..4 {
            clock.tap_at(start + Duration::from_millis(500 * i));
        }
        assert!((clock.bpm() - 120.0).abs() < 0.01);

        let later = start + Duration::from_secs(10);
        clock.tap_at(later);
        clock.tap_at(later + Duration::from_millis(400));
        assert!((clock.bpm() - 150.0).abs() < 0.01);
    }
}
