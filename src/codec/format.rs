//! printf conversion specifier parsing.
//!
//! ```text
//! %[flags][width][.precision][length]conversion
//! flags      - + space # 0
//! width      digits | *
//! precision  . digits | . *
//! length     hh h l ll j z t L
//! conversion d i u o x X c s p f F e E g G a A
//! ```

/// Width or precision of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// Written in the format string.
    Fixed(usize),
    /// `*`: taken from the argument stream.
    Arg,
}

/// Length modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Length {
    #[default]
    Default,
    Char,
    Short,
    Long,
    LongLong,
    IntMax,
    Size,
    PtrDiff,
    LongDouble,
}

impl Length {
    /// Encoded size of an integer argument with this modifier.
    ///
    /// The device ABI is 32-bit: only `ll` and `j` widen to 8 bytes.
    #[inline]
    pub fn int_size(self) -> usize {
        match self {
            Length::LongLong | Length::IntMax => 8,
            _ => 4,
        }
    }
}

/// Flag characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    /// `-`
    pub left: bool,
    /// `+`
    pub plus: bool,
    /// ` `
    pub space: bool,
    /// `#`
    pub alternate: bool,
    /// `0`
    pub zero: bool,
}

/// One parsed conversion specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub flags: Flags,
    pub width: Option<Count>,
    pub precision: Option<Count>,
    pub length: Length,
    /// Conversion character, e.g. `d` or `s`.
    pub kind: char,
}

const CONVERSIONS: &str = "diuoxXcspfFeEgGaA";

/// Parse a conversion starting at the `%` in `spec`.
///
/// Returns the conversion and the number of bytes it spans (the `%` included),
/// or `None` if the text is not a supported conversion.
pub fn parse_conversion(spec: &str) -> Option<(Conversion, usize)> {
    let bytes = spec.as_bytes();
    if bytes.first() != Some(&b'%') {
        return None;
    }
    let mut pos = 1;

    let mut flags = Flags::default();
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'-' => flags.left = true,
            b'+' => flags.plus = true,
            b' ' => flags.space = true,
            b'#' => flags.alternate = true,
            b'0' => flags.zero = true,
            _ => break,
        }
        pos += 1;
    }

    let width = parse_count(bytes, &mut pos);

    let precision = if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        Some(parse_count(bytes, &mut pos).unwrap_or(Count::Fixed(0)))
    } else {
        None
    };

    let length = match (bytes.get(pos), bytes.get(pos + 1)) {
        (Some(b'h'), Some(b'h')) => {
            pos += 2;
            Length::Char
        }
        (Some(b'l'), Some(b'l')) => {
            pos += 2;
            Length::LongLong
        }
        (Some(b'h'), _) => {
            pos += 1;
            Length::Short
        }
        (Some(b'l'), _) => {
            pos += 1;
            Length::Long
        }
        (Some(b'j'), _) => {
            pos += 1;
            Length::IntMax
        }
        (Some(b'z'), _) => {
            pos += 1;
            Length::Size
        }
        (Some(b't'), _) => {
            pos += 1;
            Length::PtrDiff
        }
        (Some(b'L'), _) => {
            pos += 1;
            Length::LongDouble
        }
        _ => Length::Default,
    };

    let kind = *bytes.get(pos)? as char;
    if !CONVERSIONS.contains(kind) {
        return None;
    }

    Some((
        Conversion {
            flags,
            width,
            precision,
            length,
            kind,
        },
        pos + 1,
    ))
}

fn parse_count(bytes: &[u8], pos: &mut usize) -> Option<Count> {
    if bytes.get(*pos) == Some(&b'*') {
        *pos += 1;
        return Some(Count::Arg);
    }
    let start = *pos;
    let mut value: usize = 0;
    while let Some(&b) = bytes.get(*pos) {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add((b - b'0') as usize);
        *pos += 1;
    }
    (*pos > start).then_some(Count::Fixed(value))
}
