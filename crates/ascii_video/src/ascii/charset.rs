/// Glyph ramp ordered from darkest to brightest.
pub const STANDARD_CHARS: &str = " .':!*oe&#%@";

/// Finer ramp with more brightness levels.
pub const EXTENDED_CHARS: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CharsetVariant {
    #[default]
    Standard,
    Extended,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterSet {
    chars: Vec<char>,
}

impl CharacterSet {
    /// Glyphs may repeat; cells carry their ramp index so lookups never go
    /// through the glyph itself.
    pub fn new(chars: impl Into<String>) -> Self {
        let chars: Vec<char> = chars.into().chars().collect();
        assert!(chars.len() >= 2, "character set must contain at least two glyphs");
        Self { chars }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_CHARS)
    }

    pub fn extended() -> Self {
        Self::new(EXTENDED_CHARS)
    }

    pub fn for_variant(variant: CharsetVariant) -> Self {
        match variant {
            CharsetVariant::Standard => Self::standard(),
            CharsetVariant::Extended => Self::extended(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Ramp index for a normalized luminance in `[0, 1]`.
    ///
    /// The square root pushes mid-tones toward brighter glyphs. The result is
    /// monotonic non-decreasing in `normalized` and always a valid index.
    pub fn index_for(&self, normalized: f64) -> usize {
        let max_index = self.chars.len() - 1;
        let normalized = normalized.clamp(0.0, 1.0);
        let index = (normalized.sqrt() * max_index as f64).floor() as usize;
        index.min(max_index)
    }

    /// Ramp index for an 8-bit luminance value.
    pub fn index_for_level(&self, level: u8) -> usize {
        self.index_for(f64::from(level) / 255.0)
    }

    pub fn char_at(&self, index: usize) -> char {
        self.chars[index.min(self.chars.len() - 1)]
    }

    /// Display gray for a ramp position, `floor(index / len * 255)`.
    pub fn gray_for(&self, index: usize) -> u8 {
        let index = index.min(self.chars.len() - 1);
        (index * 255 / self.chars.len()) as u8
    }
}
