#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use holdtime::analysis::{hold_samples, Histogram, HoldDetector, HoldState, KeyFrame};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug, Clone)]
struct ArbitraryStream {
    // Raw offsets, not necessarily sorted; exercises clamping of backwards steps.
    frames: Vec<(i64, bool)>,
    max_duration: u32,
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(stream) = ArbitraryStream::arbitrary(&mut u) else {
        return;
    };
    let frames: Vec<KeyFrame> = stream
        .frames
        .iter()
        .map(|&(offset, pressed)| KeyFrame { offset, pressed })
        .collect();

    let mut detector = HoldDetector::new();
    let mut expected = 0u64;
    for frame in &frames {
        let was_holding = matches!(detector.state(), HoldState::Holding { .. });
        let sample = detector.step(*frame);
        assert_eq!(sample.is_some(), was_holding && !frame.pressed);
        expected += u64::from(sample.is_some());
    }

    let histogram: Histogram = hold_samples(frames.iter().copied()).collect();
    assert_eq!(histogram.total_samples(), expected);

    let filtered = histogram.filter(stream.max_duration);
    assert_eq!(filtered.filter(stream.max_duration), filtered);
    if let (Some(mean), Some(min), Some(max)) = (
        filtered.weighted_mean(),
        filtered.min_duration(),
        filtered.max_duration(),
    ) {
        let slack = f64::from(max) * 1e-9 + 1e-6;
        assert!(mean >= f64::from(min) - slack && mean <= f64::from(max) + slack);
    }
});
