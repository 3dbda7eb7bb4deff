// Decoder for osu! replay files (.osr), the event source of the analyzer.
// Only the header fields needed for chart titles are interpreted; the rest are
// read to keep the cursor aligned and retained verbatim.

mod mods;
mod reader;

pub use mods::Mods;

use crate::controls::InputSet;
use chrono::{DateTime, Utc};
use reader::ByteReader;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Record delta marking the trailing RNG seed entry instead of a frame.
const SEED_MARKER: i64 = -12345;

/// First game version writing the online score id as a 64-bit integer.
const LONG_SCORE_ID_VERSION: i32 = 20140721;

/// .NET ticks (100ns since 0001-01-01) at the Unix epoch.
const TICKS_AT_UNIX_EPOCH: i64 = 621_355_968_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read replay file")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of data reading {field} at byte {offset} (needed {needed}, {available} left)")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid string marker {marker:#04x} for {field} at byte {offset}")]
    BadStringMarker {
        field: &'static str,
        offset: usize,
        marker: u8,
    },
    #[error("invalid length for {field} at byte {offset}")]
    InvalidLength { field: &'static str, offset: usize },
    #[error("{field} at byte {offset} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str, offset: usize },
    #[error("failed to decompress frame data")]
    Lzma(#[source] lzma_rs::error::Error),
    #[error("frame data is not valid UTF-8")]
    FrameEncoding,
    #[error("malformed frame record #{index}: {record:?}")]
    MalformedFrame { index: usize, record: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameMode {
    Standard,
    Taiko,
    Catch,
    Mania,
    Unknown(u8),
}

impl From<u8> for GameMode {
    fn from(value: u8) -> Self {
        match value {
            0 => GameMode::Standard,
            1 => GameMode::Taiko,
            2 => GameMode::Catch,
            3 => GameMode::Mania,
            other => GameMode::Unknown(other),
        }
    }
}

/// Judgement counts stored in the replay header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HitCounts {
    pub count_300: u16,
    pub count_100: u16,
    pub count_50: u16,
    pub count_geki: u16,
    pub count_katu: u16,
    pub count_miss: u16,
}

/// One sample of the input stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFrame {
    /// Milliseconds from the start of the stream.
    pub offset: i64,
    pub x: f32,
    pub y: f32,
    /// Inputs held down during this frame.
    pub inputs: InputSet,
}

/// A decoded replay: header metadata plus its ordered frames.
#[derive(Debug, Clone)]
pub struct Replay {
    pub mode: GameMode,
    pub version: i32,
    pub beatmap_hash: String,
    pub player_name: String,
    pub replay_hash: String,
    pub hits: HitCounts,
    pub score: i32,
    pub max_combo: u16,
    pub perfect: bool,
    pub mods: Mods,
    pub life_bar: String,
    /// `None` when the stored tick count is outside the representable range.
    pub timestamp: Option<DateTime<Utc>>,
    pub frames: Vec<RawFrame>,
    pub seed: Option<i32>,
    /// Online score id, 0 for offline plays.
    pub online_id: i64,
    pub target_practice_accuracy: Option<f64>,
}

impl Replay {
    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        let bytes = std::fs::read(path)?;
        Replay::decode(&bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(bytes);

        let mode = GameMode::from(r.u8("game mode")?);
        let version = r.i32("game version")?;
        let beatmap_hash = r.osu_string("beatmap hash")?;
        let player_name = r.osu_string("player name")?;
        let replay_hash = r.osu_string("replay hash")?;
        let hits = HitCounts {
            count_300: r.u16("300 count")?,
            count_100: r.u16("100 count")?,
            count_50: r.u16("50 count")?,
            count_geki: r.u16("geki count")?,
            count_katu: r.u16("katu count")?,
            count_miss: r.u16("miss count")?,
        };
        let score = r.i32("score")?;
        let max_combo = r.u16("max combo")?;
        let perfect = r.u8("perfect flag")? != 0;
        let mods = Mods(r.i32("mods")? as u32);
        let life_bar = r.osu_string("life bar graph")?;
        let timestamp = ticks_to_datetime(r.i64("timestamp")?);

        let length_offset = r.position();
        let compressed_len = r.i32("compressed data length")?;
        let compressed_len = usize::try_from(compressed_len).map_err(|_| DecodeError::InvalidLength {
            field: "compressed data length",
            offset: length_offset,
        })?;
        let compressed = r.take(compressed_len, "compressed frame data")?;
        let (frames, seed) = if compressed.is_empty() {
            (Vec::new(), None)
        } else {
            parse_frames(&decompress(compressed)?)?
        };

        let online_id = if version >= LONG_SCORE_ID_VERSION {
            r.i64("online score id")?
        } else {
            i64::from(r.i32("online score id")?)
        };
        let target_practice_accuracy = if mods.contains(Mods::TARGET_PRACTICE) {
            Some(r.f64("target practice accuracy")?)
        } else {
            None
        };

        Ok(Replay {
            mode,
            version,
            beatmap_hash,
            player_name,
            replay_hash,
            hits,
            score,
            max_combo,
            perfect,
            mods,
            life_bar,
            timestamp,
            frames,
            seed,
            online_id,
            target_practice_accuracy,
        })
    }

    /// Offset of the last frame, i.e. the length of the recorded input stream.
    pub fn length_ms(&self) -> i64 {
        self.frames.last().map_or(0, |frame| frame.offset)
    }
}

fn ticks_to_datetime(ticks: i64) -> Option<DateTime<Utc>> {
    let since_epoch = ticks.checked_sub(TICKS_AT_UNIX_EPOCH)?;
    let secs = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = (since_epoch.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

fn decompress(mut compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(compressed.len() * 4);
    lzma_rs::lzma_decompress(&mut compressed, &mut out).map_err(DecodeError::Lzma)?;
    Ok(out)
}

/// Parses `w|x|y|keys` records separated by commas. Offsets accumulate `w`.
fn parse_frames(data: &[u8]) -> Result<(Vec<RawFrame>, Option<i32>), DecodeError> {
    let text = std::str::from_utf8(data).map_err(|_| DecodeError::FrameEncoding)?;
    let mut frames = Vec::with_capacity(text.len() / 12);
    let mut seed = None;
    let mut offset = 0i64;

    for (index, record) in text.split(',').enumerate() {
        let record = record.trim();
        if record.is_empty() {
            continue;
        }
        let malformed = || DecodeError::MalformedFrame {
            index,
            record: record.to_string(),
        };

        let mut fields = record.split('|');
        let (Some(w), Some(x), Some(y), Some(keys), None) =
            (fields.next(), fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed());
        };
        let delta: i64 = w.parse().map_err(|_| malformed())?;
        if delta == SEED_MARKER {
            seed = Some(keys.parse().map_err(|_| malformed())?);
            continue;
        }

        let x: f32 = x.parse().map_err(|_| malformed())?;
        let y: f32 = y.parse().map_err(|_| malformed())?;
        let keys: u32 = keys.parse().map_err(|_| malformed())?;
        offset = offset.saturating_add(delta);
        frames.push(RawFrame {
            offset,
            x,
            y,
            inputs: InputSet::from_bits(keys),
        });
    }

    Ok((frames, seed))
}
