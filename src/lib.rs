//! # Pitch Note
//! *pitch_note* estimates the fundamental frequency of a short, monophonic audio frame
//! and describes it as the nearest equal-tempered note (`A4`, `C#3`, ...) together with
//! its deviation in cents.
//!
//! # Detectors
//! A *detector* is an implementation of a pitch detection algorithm. Each detector's tolerance
//! for noise and polyphonic sounds varies.
//!
//!   * [AutocorrelationDetector][detector::autocorrelation]
//!   * [YINDetector][detector::yin]
//!   * [ProbabilisticYinDetector][detector::pyin]
//!   * [HpsDetector][detector::hps]
//!
//! The [PitchSelector] chains detectors behind a silence gate. By default it asks
//! probabilistic YIN first and falls back to autocorrelation.
//!
//! # Examples
//! ```
//! use pitch_note::estimate_pitch;
//!
//! fn main() {
//!     const SAMPLE_RATE: usize = 44100;
//!
//!     // Signal coming from some source (microphone, generated, etc...)
//!     let dt = 1.0 / SAMPLE_RATE as f64;
//!     let freq = 440.0;
//!     let signal: Vec<f64> = (0..SAMPLE_RATE / 10)
//!         .map(|x| 0.5 * (2.0 * std::f64::consts::PI * x as f64 * dt * freq).sin())
//!         .collect();
//!
//!     let result = estimate_pitch(&signal, SAMPLE_RATE).unwrap().unwrap();
//!
//!     println!(
//!         "{} ({:+} cents), confidence {}",
//!         result.note.full_note, result.note.cents, result.confidence
//!     );
//!     assert_eq!(result.note.full_note, "A4");
//! }
//! ```

pub use detector::internals::Pitch;
pub use detector::{FrequencyRange, PitchDetector, MAX_FREQUENCY, MIN_FREQUENCY};
pub use error::PitchError;
pub use note::{analyze_frequencies, frequency_to_note, note_to_frequency, NoteInfo, NoteName};
pub use selector::{estimate_pitch, ConfidencePolicy, DetectionResult, PitchSelector};

pub mod analysis;
pub mod detector;
pub mod error;
pub mod float;
pub mod note;
pub mod selector;
pub mod utils;
