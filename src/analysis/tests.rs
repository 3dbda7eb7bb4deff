//! Unit tests for projection and the per-input pipeline.

use super::*;
use crate::controls::{ControlSelector, Input, InputSet};
use crate::replay::RawFrame;

// --- Test Helpers ---

fn frame(offset: i64, inputs: &[Input]) -> RawFrame {
    RawFrame {
        offset,
        x: 256.0,
        y: 192.0,
        inputs: inputs.iter().copied().collect(),
    }
}

fn selectors() -> Vec<ControlSelector> {
    vec![ControlSelector::key1(), ControlSelector::key2()]
}

// --- Projection ---

#[test]
fn projection_preserves_length_and_order() {
    let frames = [
        frame(0, &[]),
        frame(5, &[Input::K1, Input::M1]),
        frame(5, &[Input::K2]),
        frame(9, &[Input::M1]),
    ];
    let key1 = project(&frames, &ControlSelector::key1());
    assert_eq!(
        key1,
        vec![
            KeyFrame { offset: 0, pressed: false },
            KeyFrame { offset: 5, pressed: true },
            KeyFrame { offset: 5, pressed: false },
            KeyFrame { offset: 9, pressed: true },
        ]
    );
    let key2: Vec<bool> = project(&frames, &ControlSelector::key2()).iter().map(|k| k.pressed).collect();
    assert_eq!(key2, vec![false, false, true, false]);
}

#[test]
fn mouse_and_keyboard_bindings_are_interchangeable() {
    let via_keyboard = [frame(0, &[Input::K1]), frame(25, &[])];
    let via_mouse = [frame(0, &[Input::M1]), frame(25, &[])];
    let sel = ControlSelector::key1();
    assert_eq!(project(&via_keyboard, &sel), project(&via_mouse, &sel));
}

#[test]
fn idle_stream_never_counts_as_pressed() {
    let frames: Vec<RawFrame> = (0..10).map(|i| frame(i * 16, &[])).collect();
    assert!(project(&frames, &ControlSelector::key1()).iter().all(|k| !k.pressed));
    assert_eq!(analyze(&frames, &selectors(), DEFAULT_MAX_HOLD_MS), Analysis::NoSignificantData);
}

// --- Pipeline ---

#[test]
fn end_to_end_single_active_control() {
    let frames = [
        frame(0, &[Input::K1, Input::M1]),
        frame(30, &[]),
        frame(100, &[Input::K1, Input::M1]),
        frame(250, &[]),
    ];
    let Analysis::Reportable(report) = analyze(&frames, &selectors(), 100) else {
        panic!("expected a reportable analysis");
    };

    let key1 = &report.controls[0];
    assert_eq!(key1.label, "Key 1");
    assert_eq!(key1.histogram.iter().collect::<Vec<_>>(), vec![(30, 1)]);
    assert_eq!(key1.statistic, Some(30.0));
    assert_eq!(key1.samples, 1);
    assert_eq!(key1.discarded, 1);

    let key2 = &report.controls[1];
    assert!(key2.histogram.is_empty());
    assert_eq!(key2.statistic, None);
    assert_eq!(key2.samples, 0);
}

#[test]
fn only_outliers_is_not_significant() {
    let frames = [frame(0, &[Input::K2]), frame(500, &[]), frame(600, &[Input::M1]), frame(900, &[])];
    assert_eq!(analyze(&frames, &selectors(), 100), Analysis::NoSignificantData);
}

#[test]
fn controls_are_independent() {
    // Overlapping presses on both keys (a "roll").
    let frames = [
        frame(0, &[Input::K1, Input::M1]),
        frame(10, &[Input::K1, Input::M1, Input::K2, Input::M2]),
        frame(20, &[Input::K2, Input::M2]),
        frame(45, &[]),
    ];
    let Analysis::Reportable(report) = analyze(&frames, &selectors(), 100) else {
        panic!("expected a reportable analysis");
    };
    assert_eq!(report.controls[0].histogram.iter().collect::<Vec<_>>(), vec![(20, 1)]);
    assert_eq!(report.controls[1].histogram.iter().collect::<Vec<_>>(), vec![(35, 1)]);
    assert_eq!(report.min_duration(), Some(20));
    assert_eq!(report.max_duration(), Some(35));
    assert_eq!(report.max_count(), Some(1));
}

#[test]
fn smoke_is_not_bound_by_default() {
    let frames = [frame(0, &[Input::Smoke]), frame(40, &[])];
    assert_eq!(analyze(&frames, &selectors(), 100), Analysis::NoSignificantData);

    let smoke = ControlSelector::new("Smoke", [Input::Smoke]);
    let report = analyze_control(&frames, &smoke, 100);
    assert_eq!(report.histogram.get(40), 1);
}

#[test]
fn empty_frames() {
    assert_eq!(analyze(&[], &selectors(), 100), Analysis::NoSignificantData);
    let report = analyze_control(&[], &ControlSelector::key1(), 100);
    assert_eq!(report.samples, 0);
    assert_eq!(report.statistic, None);
    assert!(InputSet::EMPTY.is_empty());
}

#[test]
fn press_held_at_end_is_dropped() {
    let frames = [
        frame(0, &[Input::K1]),
        frame(20, &[]),
        frame(50, &[Input::K1]),
        frame(90, &[Input::K1]),
    ];
    let report = analyze_control(&frames, &ControlSelector::key1(), 100);
    assert_eq!(report.histogram.iter().collect::<Vec<_>>(), vec![(20, 1)]);
    assert_eq!(report.samples, 1);
    assert_eq!(report.discarded, 0);
}
