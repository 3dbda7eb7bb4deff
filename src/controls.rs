//! Physical inputs recorded in a replay and the logical controls built on top of them.
//!
//! A replay frame stores the pressed buttons as a bit field. Rather than testing
//! that field with flag arithmetic, frames are decoded into an [`InputSet`] and a
//! [`ControlSelector`] decides whether one of its bound inputs is active.

use serde::Serialize;
use std::fmt;

/// A physical input as stored in the replay key bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Input {
    M1,
    M2,
    K1,
    K2,
    Smoke,
}

impl Input {
    pub const ALL: [Input; 5] = [Input::M1, Input::M2, Input::K1, Input::K2, Input::Smoke];

    /// The bit this input occupies in a frame's key field.
    #[inline]
    pub const fn bit(self) -> u32 {
        match self {
            Input::M1 => 1,
            Input::M2 => 2,
            Input::K1 => 4,
            Input::K2 => 8,
            Input::Smoke => 16,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Input::M1 => "M1",
            Input::M2 => "M2",
            Input::K1 => "K1",
            Input::K2 => "K2",
            Input::Smoke => "SMOKE",
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static INPUT_NAMES: phf::Map<&'static str, Input> = phf::phf_map! {
    "M1" => Input::M1,
    "MOUSE1" => Input::M1,
    "M2" => Input::M2,
    "MOUSE2" => Input::M2,
    "K1" => Input::K1,
    "KEY1" => Input::K1,
    "K2" => Input::K2,
    "KEY2" => Input::K2,
    "SMOKE" => Input::Smoke,
};

/// Resolves an input from a user-supplied name (case-insensitive).
pub fn input_by_name(name: &str) -> Option<Input> {
    let normalized = name.trim().to_ascii_uppercase();
    INPUT_NAMES.get(normalized.as_str()).copied()
}

/// The set of physical inputs active in a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InputSet(u8);

impl InputSet {
    pub const EMPTY: InputSet = InputSet(0);

    /// Decodes the raw key field of a replay frame. Unknown bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        Input::ALL
            .iter()
            .filter(|input| bits & input.bit() != 0)
            .fold(InputSet::EMPTY, |set, input| set.with(*input))
    }

    #[must_use]
    pub fn with(self, input: Input) -> Self {
        InputSet(self.0 | input.bit() as u8)
    }

    #[inline]
    pub fn contains(self, input: Input) -> bool {
        self.0 & input.bit() as u8 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Input> {
        Input::ALL.into_iter().filter(move |input| self.contains(*input))
    }
}

impl FromIterator<Input> for InputSet {
    fn from_iter<T: IntoIterator<Item = Input>>(iter: T) -> Self {
        iter.into_iter().fold(InputSet::EMPTY, InputSet::with)
    }
}

/// A logical control: a display label and the physical inputs that act as it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSelector {
    pub label: String,
    pub inputs: Vec<Input>,
}

impl ControlSelector {
    pub fn new(label: impl Into<String>, inputs: impl IntoIterator<Item = Input>) -> Self {
        let mut inputs: Vec<Input> = inputs.into_iter().collect();
        inputs.sort();
        inputs.dedup();
        ControlSelector {
            label: label.into(),
            inputs,
        }
    }

    /// The first logical key: keyboard K1 or mouse M1.
    pub fn key1() -> Self {
        ControlSelector::new("Key 1", [Input::K1, Input::M1])
    }

    /// The second logical key: keyboard K2 or mouse M2.
    pub fn key2() -> Self {
        ControlSelector::new("Key 2", [Input::K2, Input::M2])
    }

    /// Whether any bound input is active in `active`.
    #[inline]
    pub fn is_active(&self, active: &InputSet) -> bool {
        self.inputs.iter().any(|input| active.contains(*input))
    }

    /// Parses a comma separated input list such as `K1,M1`.
    pub fn parse_inputs(label: impl Into<String>, spec: &str) -> Result<Self, String> {
        let inputs = spec
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| input_by_name(part).ok_or_else(|| format!("unknown input '{}'", part.trim())))
            .collect::<Result<Vec<_>, _>>()?;
        if inputs.is_empty() {
            return Err("at least one input is required".to_string());
        }
        Ok(ControlSelector::new(label, inputs))
    }
}

impl fmt::Display for ControlSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.inputs.iter().map(|input| input.name()).collect();
        write!(f, "{} [{}]", self.label, names.join(" | "))
    }
}
