//! Edge detector turning a press/release stream into hold durations.

use super::{HoldSample, KeyFrame};

/// Detector state between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldState {
    /// No press is open.
    #[default]
    Idle,
    /// A press opened at `start` has not been released yet.
    Holding { start: i64 },
}

/// Scans one control's frames and emits a sample for each completed press.
///
/// Only the first frame of a contiguous pressed run opens an interval and only
/// the first released frame after it closes the interval; repeated frames in the
/// same state are ignored. A press still open when the stream ends never yields
/// a sample.
#[derive(Debug, Clone, Default)]
pub struct HoldDetector {
    state: HoldState,
}

impl HoldDetector {
    #[must_use]
    pub fn new() -> Self {
        HoldDetector::default()
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    /// Feeds one frame. Returns the hold duration when this frame closes a press.
    pub fn step(&mut self, frame: KeyFrame) -> Option<HoldSample> {
        match (self.state, frame.pressed) {
            (HoldState::Idle, true) => {
                self.state = HoldState::Holding {
                    start: frame.offset,
                };
                None
            }
            (HoldState::Holding { start }, false) => {
                self.state = HoldState::Idle;
                Some(duration_between(start, frame.offset))
            }
            (HoldState::Idle, false) | (HoldState::Holding { .. }, true) => None,
        }
    }

    /// Ends the stream. Returns the start of a press that was still open and is
    /// therefore discarded.
    pub fn finish(self) -> Option<i64> {
        match self.state {
            HoldState::Holding { start } => Some(start),
            HoldState::Idle => None,
        }
    }
}

/// Milliseconds between a press and its release. Out-of-order offsets clamp to 0.
#[inline]
fn duration_between(start: i64, end: i64) -> HoldSample {
    let diff = end.saturating_sub(start).max(0);
    u32::try_from(diff).unwrap_or(u32::MAX)
}

/// Iterator adapter yielding hold samples in the order their releases appear.
#[derive(Debug, Clone)]
pub struct HoldSamples<I> {
    frames: I,
    detector: HoldDetector,
}

impl<I: Iterator<Item = KeyFrame>> Iterator for HoldSamples<I> {
    type Item = HoldSample;

    fn next(&mut self) -> Option<Self::Item> {
        for frame in self.frames.by_ref() {
            if let Some(sample) = self.detector.step(frame) {
                return Some(sample);
            }
        }
        None
    }
}

/// Runs a fresh [`HoldDetector`] over `frames`.
pub fn hold_samples<I>(frames: I) -> HoldSamples<I::IntoIter>
where
    I: IntoIterator<Item = KeyFrame>,
{
    HoldSamples {
        frames: frames.into_iter(),
        detector: HoldDetector::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kf(offset: i64, pressed: bool) -> KeyFrame {
        KeyFrame { offset, pressed }
    }

    fn samples(frames: &[(i64, bool)]) -> Vec<HoldSample> {
        hold_samples(frames.iter().map(|&(o, p)| kf(o, p))).collect()
    }

    #[test]
    fn empty_stream_yields_nothing() {
        assert!(samples(&[]).is_empty());
    }

    #[test]
    fn closes_on_release() {
        assert_eq!(samples(&[(0, false), (10, true), (50, false)]), vec![40]);
    }

    #[test]
    fn discards_unterminated_press() {
        assert!(samples(&[(0, false), (10, true)]).is_empty());
        assert_eq!(samples(&[(0, true), (5, false), (9, true), (30, true)]), vec![5]);
    }

    #[test]
    fn ignores_redundant_frames() {
        assert_eq!(samples(&[(0, true), (5, true), (5, true), (20, false)]), vec![20]);
        assert_eq!(
            samples(&[(0, false), (1, false), (2, true), (4, false), (6, false)]),
            vec![2]
        );
    }

    #[test]
    fn emits_in_release_order() {
        let frames = [
            (0, true),
            (30, false),
            (100, true),
            (250, false),
            (260, true),
            (262, false),
        ];
        assert_eq!(samples(&frames), vec![30, 150, 2]);
    }

    #[test]
    fn shared_timestamp_gives_zero_duration() {
        assert_eq!(samples(&[(7, true), (7, false)]), vec![0]);
    }

    #[test]
    fn backwards_offsets_clamp_to_zero() {
        assert_eq!(samples(&[(50, true), (40, false)]), vec![0]);
    }

    #[test]
    fn step_tracks_state() {
        let mut detector = HoldDetector::new();
        assert_eq!(detector.state(), HoldState::Idle);
        assert_eq!(detector.step(kf(3, true)), None);
        assert_eq!(detector.state(), HoldState::Holding { start: 3 });
        assert_eq!(detector.step(kf(8, true)), None);
        assert_eq!(detector.state(), HoldState::Holding { start: 3 });
        assert_eq!(detector.step(kf(12, false)), Some(9));
        assert_eq!(detector.state(), HoldState::Idle);
        assert_eq!(detector.step(kf(20, true)), None);
        assert_eq!(detector.finish(), Some(20));
    }
}
