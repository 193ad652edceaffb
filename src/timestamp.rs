/// Samples decoded from one AC-3 syncframe or E-AC-3 access unit.
pub const SAMPLES_PER_FRAME: usize = 1536;

/// Playback time of `frames` six-block frames, 0 when the rate is unknown.
pub fn frames_to_secs(frames: usize, sample_rate: Option<u32>) -> f64 {
    match sample_rate {
        Some(rate) if rate > 0 => (frames * SAMPLES_PER_FRAME) as f64 / rate as f64,
        _ => 0.0,
    }
}

/// Formats seconds as `HH:MM:SS.mmm`, widening the hour field past 99.
pub fn time_str(sec: f64) -> String {
    let total_ms = (sec * 1000.0) as u64;

    let hours = total_ms / 3_600_000;
    let minutes = total_ms / 60_000 % 60;
    let seconds = total_ms / 1000 % 60;
    let millis = total_ms % 1000;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

#[test]
fn format_durations() {
    assert_eq!(time_str(0.0), "00:00:00.000");
    assert_eq!(time_str(0.25), "00:00:00.250");
    assert_eq!(time_str(3725.5), "01:02:05.500");
    assert_eq!(time_str(360_000.0), "100:00:00.000");

    assert_eq!(frames_to_secs(125, Some(48000)), 4.0);
    assert_eq!(frames_to_secs(125, None), 0.0);
    assert_eq!(time_str(frames_to_secs(1875, Some(32000))), "00:01:30.000");
}
