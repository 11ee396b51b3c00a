#![cfg(feature = "serde")]

use pitch_note::{estimate_pitch, frequency_to_note};
use serde_json::json;

#[test]
fn note_info_fields_are_camel_case() {
    let note = frequency_to_note(440.0).unwrap();
    let value = serde_json::to_value(&note).unwrap();
    assert_eq!(
        value,
        json!({
            "frequency": 440.0,
            "note": "A",
            "octave": 4,
            "fullNote": "A4",
            "cents": 0,
            "midiNote": 69,
        })
    );
}

#[test]
fn detection_result_is_flat() {
    let signal: Vec<f64> = (0..4410)
        .map(|i| 0.5 * (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 44100.0).sin())
        .collect();
    let result = estimate_pitch(&signal, 44100).unwrap().unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["fullNote"], "A4");
    assert_eq!(value["note"], "A");
    assert_eq!(value["estimator"], "pyin");
    assert!(value["confidence"].as_f64().unwrap() > 0.9);
}
