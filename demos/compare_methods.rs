//! Compare the estimators over a WAV recording.
//!
//! ```text
//! cargo run --example compare_methods -- recording.wav
//! ```

use std::env;

use pitch_note::analysis::{compare_methods, method_stats, ComparisonConfig, METHODS};

fn read_mono(path: &str) -> Result<(usize, Vec<f32>), hound::Error> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    // Average the channels of every interleaved frame.
    let channels = spec.channels.max(1) as usize;
    let mono = samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();
    Ok((spec.sample_rate as usize, mono))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <input.wav>", args[0]);
        std::process::exit(1);
    }

    let (sample_rate, samples) = read_mono(&args[1])?;
    println!("File: {}", args[1]);
    println!("Sample rate: {} Hz", sample_rate);
    println!(
        "Duration: {:.2} seconds",
        samples.len() as f64 / sample_rate as f64
    );

    let frames = compare_methods(&samples, sample_rate, ComparisonConfig::default())?;
    println!("Frames analyzed: {}", frames.len());

    for method in METHODS {
        let stats = method_stats(&frames, method);
        print!(
            "{:<16} detected {:5.1}%",
            format!("{:?}", method),
            stats.detection_rate * 100.0
        );
        match (stats.mean_frequency, stats.std_frequency, stats.mean_note) {
            (Some(mean), Some(std), Some(note)) => println!(
                "  mean {:8.2} Hz  std {:7.2} Hz  {} ({:+} cents)",
                mean, std, note.full_note, note.cents
            ),
            _ => println!("  no pitch"),
        }
    }
    Ok(())
}
