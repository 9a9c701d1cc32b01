use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;
const PING_MS: u64 = 220;

/// Short two-partial "ping" with an exponential decay, used as the
/// selection confirmation cue.
pub struct PingTone {
    freq: f32,
    amplitude: f32,
    num_sample: usize,
    total_samples: usize,
}

impl PingTone {
    pub fn new(volume: f32) -> Self {
        Self {
            freq: 1046.5, // C6
            amplitude: volume.clamp(0.0, 1.0) * 0.4,
            num_sample: 0,
            total_samples: (SAMPLE_RATE as u64 * PING_MS / 1000) as usize,
        }
    }
}

impl Iterator for PingTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        let t = self.num_sample as f32 / SAMPLE_RATE as f32;
        self.num_sample += 1;

        let envelope = (-t * 18.0).exp();
        let fundamental = (2.0 * PI * self.freq * t).sin();
        // Octave partial gives the bell-like edge
        let overtone = (2.0 * PI * self.freq * 2.0 * t).sin() * 0.3;

        Some((fundamental + overtone) * envelope * self.amplitude)
    }
}

impl Source for PingTone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples - self.num_sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(PING_MS))
    }
}
