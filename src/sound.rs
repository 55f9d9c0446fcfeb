use fundsp::prelude::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle};

const SAMPLE_RATE: u32 = 44_100;

/// Audible feedback for game events.
pub(crate) trait Cues {
    fn flap(&mut self);
    fn crash(&mut self);
}

pub(crate) struct Sound {
    // The stream stops playing when dropped, so it lives next to its handle.
    output: Option<(OutputStream, OutputStreamHandle)>,
    flap: Vec<f32>,
    crash: Vec<f32>,
}

impl Sound {
    /// Opens the default output device. Without one the game stays silent.
    pub(crate) fn open(muted: bool) -> Self {
        let output = if muted {
            None
        } else {
            match OutputStream::try_default() {
                Ok(output) => Some(output),
                Err(e) => {
                    log::warn!("no audio output, sound disabled: {e}");
                    None
                }
            }
        };
        Self {
            output,
            flap: flap_samples(),
            crash: crash_samples(),
        }
    }

    fn play(&self, samples: &[f32]) {
        let Some((_, handle)) = &self.output else {
            return;
        };
        match rodio::Sink::try_new(handle) {
            Ok(sink) => {
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec()));
                sink.detach(); // Play in background
            }
            Err(e) => log::warn!("could not play sound: {e}"),
        }
    }
}

impl Cues for Sound {
    fn flap(&mut self) {
        self.play(&self.flap);
    }

    fn crash(&mut self) {
        self.play(&self.crash);
    }
}

// ── Synthesis ───────────────────────────────────────────────────────────────

fn synth(mut unit: impl AudioUnit, seconds: f32) -> Vec<f32> {
    unit.set_sample_rate(SAMPLE_RATE as f64);
    let n = (SAMPLE_RATE as f32 * seconds) as usize;
    (0..n).map(|_| unit.get_mono()).collect()
}

/// Short rising chirp.
fn flap_samples() -> Vec<f32> {
    let freq = lfo(|t: f32| lerp(500.0, 900.0, (t / 0.08).min(1.0)));
    let gain = lfo(|t: f32| lerp(0.12, 0.0, (t / 0.1).min(1.0)));
    synth((freq >> sine::<f32>()) * gain, 0.1)
}

/// Sawtooth falling from 400Hz to 80Hz while fading out.
fn crash_samples() -> Vec<f32> {
    let freq = lfo(|t: f32| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
    let gain = lfo(|t: f32| lerp(0.15, 0.0, (t / 0.5).min(1.0)));
    synth((freq >> saw()) * gain, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cues_have_expected_length_and_stay_quiet() {
        let flap = flap_samples();
        let crash = crash_samples();
        assert_eq!(flap.len(), 4410);
        assert_eq!(crash.len(), 22050);
        assert!(flap.iter().all(|s| s.abs() <= 0.2));
        assert!(crash.iter().all(|s| s.abs() <= 0.2));
    }

    #[test]
    fn crash_fades_out() {
        let crash = crash_samples();
        let peak = |s: &[f32]| s.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!(peak(&crash[..4410]) > peak(&crash[crash.len() - 441..]));
    }

    #[test]
    fn muted_sound_plays_nothing() {
        let mut sound = Sound::open(true);
        assert!(sound.output.is_none());
        sound.flap();
        sound.crash();
    }
}
