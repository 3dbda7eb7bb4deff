//! Common builders for tests and benchmarks.
use holdtime::analysis::KeyFrame;
use holdtime::controls::InputSet;
use holdtime::replay::RawFrame;

// --- Constants ---
/// Key bits as written by the game when the first key is held (K1 implies M1).
pub const KEY1: u32 = 4 | 1;
/// Key bits when the second key is held (K2 implies M2).
pub const KEY2: u32 = 8 | 2;
pub const BOTH: u32 = KEY1 | KEY2;
pub const NONE: u32 = 0;

/// .NET ticks for 2024-03-01 12:30:00 UTC.
pub const TICKS_2024_03_01_1230: i64 = 638_448_930_000_000_000;

// --- Frame Helpers ---

/// Creates a raw frame at `offset` with the given key bits.
pub fn raw_frame(offset: i64, keys: u32) -> RawFrame {
    RawFrame {
        offset,
        x: 256.0,
        y: 192.0,
        inputs: InputSet::from_bits(keys),
    }
}

/// Creates raw frames from `(offset, keys)` pairs.
pub fn raw_frames(frames: &[(i64, u32)]) -> Vec<RawFrame> {
    frames.iter().map(|&(offset, keys)| raw_frame(offset, keys)).collect()
}

/// Creates key frames from `(offset, pressed)` pairs.
pub fn key_frames(frames: &[(i64, bool)]) -> Vec<KeyFrame> {
    frames
        .iter()
        .map(|&(offset, pressed)| KeyFrame { offset, pressed })
        .collect()
}

// --- Replay File Builder ---

/// Builds the bytes of a `.osr` replay file.
#[derive(Debug, Clone)]
pub struct ReplayBuilder {
    mode: u8,
    version: i32,
    player: String,
    online_id: i64,
    mods: u32,
    ticks: i64,
    frames: Vec<(i64, u32)>,
    seed: Option<i32>,
    frame_text: Option<String>,
}

impl Default for ReplayBuilder {
    fn default() -> Self {
        ReplayBuilder {
            mode: 0,
            version: 20240301,
            player: "tester".to_string(),
            online_id: 0,
            mods: 0,
            ticks: TICKS_2024_03_01_1230,
            frames: Vec::new(),
            seed: Some(12345),
            frame_text: None,
        }
    }
}

impl ReplayBuilder {
    pub fn new() -> Self {
        ReplayBuilder::default()
    }

    pub fn mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn player(mut self, name: &str) -> Self {
        self.player = name.to_string();
        self
    }

    pub fn online_id(mut self, id: i64) -> Self {
        self.online_id = id;
        self
    }

    pub fn mods(mut self, mods: u32) -> Self {
        self.mods = mods;
        self
    }

    /// Appends frames given as absolute `(offset, keys)` pairs.
    pub fn frames(mut self, frames: &[(i64, u32)]) -> Self {
        self.frames.extend_from_slice(frames);
        self
    }

    /// Replaces the generated frame payload with `text` verbatim.
    pub fn frame_text(mut self, text: &str) -> Self {
        self.frame_text = Some(text.to_string());
        self
    }

    /// The uncompressed frame payload: delta-encoded records and the seed entry.
    pub fn payload(&self) -> String {
        if let Some(text) = &self.frame_text {
            return text.clone();
        }
        let mut text = String::new();
        let mut previous = 0i64;
        for &(offset, keys) in &self.frames {
            text.push_str(&format!("{}|256|192|{keys},", offset - previous));
            previous = offset;
        }
        if let Some(seed) = self.seed {
            text.push_str(&format!("-12345|0|0|{seed},"));
        }
        text
    }

    /// Bytes before the compressed frame block.
    fn header(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(self.mode);
        out.extend_from_slice(&self.version.to_le_bytes());
        write_string(&mut out, "d41d8cd98f00b204e9800998ecf8427e");
        write_string(&mut out, &self.player);
        write_string(&mut out, "");
        for count in [300u16, 12, 1, 40, 7, 2] {
            out.extend_from_slice(&count.to_le_bytes());
        }
        out.extend_from_slice(&1_234_567i32.to_le_bytes());
        out.extend_from_slice(&321u16.to_le_bytes());
        out.push(0);
        out.extend_from_slice(&self.mods.to_le_bytes());
        write_string(&mut out, "0|1,");
        out.extend_from_slice(&self.ticks.to_le_bytes());
        out
    }

    /// Byte offset of the compressed frame block in [`build`](Self::build)'s output.
    pub fn compressed_offset(&self) -> usize {
        self.header().len() + 4
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header();
        let compressed = compress(self.payload().as_bytes());
        out.extend_from_slice(&(compressed.len() as i32).to_le_bytes());
        out.extend_from_slice(&compressed);

        if self.version >= 20140721 {
            out.extend_from_slice(&self.online_id.to_le_bytes());
        } else {
            out.extend_from_slice(&(self.online_id as i32).to_le_bytes());
        }
        if self.mods & (1 << 23) != 0 {
            out.extend_from_slice(&97.5f64.to_le_bytes());
        }
        out
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    if s.is_empty() {
        out.push(0x00);
        return;
    }
    out.push(0x0b);
    let mut len = s.len();
    loop {
        let byte = (len & 0x7f) as u8;
        len >>= 7;
        if len == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out.extend_from_slice(s.as_bytes());
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut input = data;
    let mut out = Vec::new();
    lzma_rs::lzma_compress(&mut input, &mut out).expect("in-memory LZMA compression cannot fail");
    out
}
