#![no_main]

use holdtime::analysis::{analyze, DEFAULT_MAX_HOLD_MS};
use holdtime::controls::ControlSelector;
use holdtime::replay::Replay;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail cleanly, never panic.
    if let Ok(replay) = Replay::decode(data) {
        let _ = replay.length_ms();
        let selectors = [ControlSelector::key1(), ControlSelector::key2()];
        let _ = analyze(&replay.frames, &selectors, DEFAULT_MAX_HOLD_MS);
    }
});
