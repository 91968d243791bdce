//! printf-style argument decoder.
//!
//! Arguments are packed back to back in fixed-width little-endian form:
//!
//! | Conversion              | Encoding                                      |
//! |-------------------------|-----------------------------------------------|
//! | `d i u o x X c`, `*`    | 4 bytes (8 with `ll` / `j`)                   |
//! | `f F e E g G a A`       | 4-byte IEEE-754 single                        |
//! | `s`                     | length byte (bit 7 = truncated) + bytes       |
//! | `p`                     | 4 bytes                                       |
//!
//! When the argument bytes run out, or a conversion is not supported, the
//! remaining conversions are copied to the output as written. Field widths
//! and precisions above [`MAX_FIELD_WIDTH`] count as unsupported, whether
//! written in the format or read from the arguments. `%a` honours precision.

use super::format::{parse_conversion, Conversion, Count, Length};
use super::ArgumentDecoder;

/// Marker appended to strings the device truncated.
pub const TRUNCATED_MARKER: &str = "[...]";

/// Largest field width or precision that is rendered.
pub const MAX_FIELD_WIDTH: usize = 1024;

/// Bit of the string length byte flagging device-side truncation.
const STRING_TRUNCATED: u8 = 0x80;

/// Default `ArgumentDecoder` rendering printf conversions.
///
/// # Example
///
/// ```
/// use tokenlog::codec::{ArgumentDecoder, PrintfDecoder};
///
/// let args = [0x2A, 0, 0, 0, 3, b'a', b'b', b'c'];
/// assert_eq!(PrintfDecoder.decode("%d %s", &args), "42 abc");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintfDecoder;

impl ArgumentDecoder for PrintfDecoder {
    fn decode(&self, format: &str, args: &[u8]) -> String {
        render(format, args)
    }
}

/// Cursor over the packed argument bytes.
struct ArgReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ArgReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        let b = self.take(4)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Option<u64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Some(u64::from_le_bytes(buf))
    }

    /// Read an integer of the given size, zero-extended to 64 bits.
    fn read_int(&mut self, size: usize) -> Option<u64> {
        if size == 8 {
            self.read_u64()
        } else {
            self.read_u32().map(u64::from)
        }
    }

    fn read_f32(&mut self) -> Option<f32> {
        self.read_u32().map(f32::from_bits)
    }

    fn read_string(&mut self) -> Option<(String, bool)> {
        let header = *self.take(1)?.first()?;
        let len = (header & !STRING_TRUNCATED) as usize;
        let bytes = self.take(len)?;
        Some((
            String::from_utf8_lossy(bytes).into_owned(),
            header & STRING_TRUNCATED != 0,
        ))
    }
}

/// Render `format` against the packed `args`.
pub fn render(format: &str, args: &[u8]) -> String {
    let mut out = String::with_capacity(format.len() + args.len());
    let mut reader = ArgReader::new(args);
    let mut stalled = false;
    let mut rest = format;

    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        if rest.starts_with("%%") {
            out.push('%');
            rest = &rest[2..];
            continue;
        }

        let Some((conv, len)) = parse_conversion(rest) else {
            tracing::trace!("Unsupported conversion in format {:?}", format);
            stalled = true;
            out.push('%');
            rest = &rest[1..];
            continue;
        };

        let text = &rest[..len];
        rest = &rest[len..];

        if stalled {
            out.push_str(text);
            continue;
        }
        match render_conversion(&conv, &mut reader) {
            Some(rendered) => out.push_str(&rendered),
            None => {
                tracing::trace!("Cannot render {:?}, copying the rest as written", text);
                stalled = true;
                out.push_str(text);
            }
        }
    }
    out.push_str(rest);
    out
}

fn render_conversion(conv: &Conversion, reader: &mut ArgReader<'_>) -> Option<String> {
    let mut left = conv.flags.left;
    let width = match conv.width {
        Some(Count::Fixed(w)) => w,
        Some(Count::Arg) => {
            let w = reader.read_u32()? as i32;
            if w < 0 {
                left = true;
            }
            w.unsigned_abs() as usize
        }
        None => 0,
    };
    let precision = match conv.precision {
        Some(Count::Fixed(p)) => Some(p),
        Some(Count::Arg) => {
            let p = reader.read_u32()? as i32;
            (p >= 0).then_some(p as usize)
        }
        None => None,
    };
    if width > MAX_FIELD_WIDTH || precision.is_some_and(|p| p > MAX_FIELD_WIDTH) {
        tracing::debug!("Field width or precision over {} in conversion", MAX_FIELD_WIDTH);
        return None;
    }

    let spec = Spec {
        conv,
        left,
        width,
        precision,
    };

    let size = conv.length.int_size();
    let rendered = match conv.kind {
        'd' | 'i' => spec.signed(sign_extend(reader.read_int(size)?, size)),
        'u' | 'o' | 'x' | 'X' => spec.unsigned(reader.read_int(size)?),
        'c' => {
            let c = char::from_u32(reader.read_u32()?).unwrap_or(char::REPLACEMENT_CHARACTER);
            spec.pad(String::new(), c.to_string(), false)
        }
        's' => {
            let (mut s, truncated) = reader.read_string()?;
            if let Some(p) = precision {
                s = s.chars().take(p).collect();
            }
            if truncated {
                s.push_str(TRUNCATED_MARKER);
            }
            spec.pad(String::new(), s, false)
        }
        'p' => spec.pad(String::new(), format!("0x{:08X}", reader.read_u32()?), false),
        _ => spec.float(f64::from(reader.read_f32()?)),
    };
    Some(rendered)
}

fn sign_extend(value: u64, size: usize) -> i64 {
    if size == 8 {
        value as i64
    } else {
        value as u32 as i32 as i64
    }
}

/// Resolved conversion with width and precision read from the arguments.
struct Spec<'a> {
    conv: &'a Conversion,
    left: bool,
    width: usize,
    precision: Option<usize>,
}

impl Spec<'_> {
    fn sign(&self, negative: bool) -> String {
        if negative {
            "-".to_string()
        } else if self.conv.flags.plus {
            "+".to_string()
        } else if self.conv.flags.space {
            " ".to_string()
        } else {
            String::new()
        }
    }

    /// Pad `prefix + body` to the field width.
    fn pad(&self, prefix: String, body: String, zero_ok: bool) -> String {
        let len = prefix.chars().count() + body.chars().count();
        if len >= self.width {
            return prefix + &body;
        }
        let fill = self.width - len;
        if self.left {
            format!("{}{}{}", prefix, body, " ".repeat(fill))
        } else if zero_ok && self.conv.flags.zero {
            format!("{}{}{}", prefix, "0".repeat(fill), body)
        } else {
            format!("{}{}{}", " ".repeat(fill), prefix, body)
        }
    }

    fn digits(&self, magnitude: String, is_zero: bool) -> String {
        match self.precision {
            Some(0) if is_zero => String::new(),
            Some(p) if magnitude.len() < p => {
                format!("{}{}", "0".repeat(p - magnitude.len()), magnitude)
            }
            _ => magnitude,
        }
    }

    fn signed(&self, value: i64) -> String {
        let value = match self.conv.length {
            Length::Char => value as i8 as i64,
            Length::Short => value as i16 as i64,
            _ => value,
        };
        let body = self.digits(value.unsigned_abs().to_string(), value == 0);
        self.pad(self.sign(value < 0), body, self.precision.is_none())
    }

    fn unsigned(&self, value: u64) -> String {
        let value = match self.conv.length {
            Length::Char => value as u8 as u64,
            Length::Short => value as u16 as u64,
            _ => value,
        };
        let magnitude = match self.conv.kind {
            'o' => format!("{:o}", value),
            'x' => format!("{:x}", value),
            'X' => format!("{:X}", value),
            _ => value.to_string(),
        };
        let mut body = self.digits(magnitude, value == 0);

        let mut prefix = String::new();
        if self.conv.flags.alternate {
            match self.conv.kind {
                'o' if !body.starts_with('0') => body.insert(0, '0'),
                'x' if value != 0 => prefix.push_str("0x"),
                'X' if value != 0 => prefix.push_str("0X"),
                _ => {}
            }
        }
        self.pad(prefix, body, self.precision.is_none())
    }

    fn float(&self, value: f64) -> String {
        let upper = self.conv.kind.is_ascii_uppercase();
        let sign = self.sign(value.is_sign_negative() && !value.is_nan());

        if !value.is_finite() {
            let text = if value.is_nan() { "nan" } else { "inf" };
            let text = if upper { text.to_uppercase() } else { text.to_string() };
            return self.pad(sign, text, false);
        }

        let magnitude = value.abs();
        let alternate = self.conv.flags.alternate;
        let body = match self.conv.kind.to_ascii_lowercase() {
            'f' => fixed(magnitude, self.precision.unwrap_or(6), alternate),
            'e' => exponent(magnitude, self.precision.unwrap_or(6), alternate),
            'g' => general(magnitude, self.precision.unwrap_or(6), alternate),
            _ => hex_float(magnitude, self.precision, alternate),
        };
        let body = if upper { body.to_uppercase() } else { body };
        self.pad(sign, body, true)
    }
}

fn fixed(value: f64, precision: usize, alternate: bool) -> String {
    let mut s = format!("{:.*}", precision, value);
    if alternate && precision == 0 {
        s.push('.');
    }
    s
}

/// C-style exponent notation: `1.500000e+00`.
fn exponent(value: f64, precision: usize, alternate: bool) -> String {
    let s = format!("{:.*e}", precision, value);
    let (mantissa, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let mut mantissa = mantissa.to_string();
    if alternate && precision == 0 {
        mantissa.push('.');
    }
    format!(
        "{}e{}{:02}",
        mantissa,
        if exp < 0 { '-' } else { '+' },
        exp.unsigned_abs()
    )
}

/// `%g`: shortest of fixed and exponent notation, trailing zeros removed.
fn general(value: f64, precision: usize, alternate: bool) -> String {
    let p = precision.max(1);
    let exp = if value == 0.0 {
        0
    } else {
        let s = format!("{:.*e}", p - 1, value);
        s.split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };

    let s = if exp < -4 || exp >= p as i32 {
        exponent(value, p - 1, alternate)
    } else {
        fixed(value, (p as i32 - 1 - exp) as usize, alternate)
    };
    if alternate {
        return s;
    }

    match s.split_once('e') {
        Some((mantissa, exp)) => format!("{}e{}", strip_zeros(mantissa), exp),
        None => strip_zeros(&s).to_string(),
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `%a`: hexadecimal floating point, e.g. `0x1.8p+0`.
///
/// Without a precision the shortest exact form is used; otherwise the
/// mantissa is rounded to that many hex digits, ties to even.
fn hex_float(value: f64, precision: Option<usize>, alternate: bool) -> String {
    const MANTISSA_DIGITS: usize = 13;

    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7FF) as i32;
    let mantissa = bits & ((1u64 << 52) - 1);
    let (mut lead, exp) = if value == 0.0 {
        (0u64, 0)
    } else if biased == 0 {
        (0, -1022)
    } else {
        (1, biased - 1023)
    };

    let digits = match precision {
        None => format!("{:013x}", mantissa).trim_end_matches('0').to_string(),
        Some(p) if p >= MANTISSA_DIGITS => {
            format!("{:013x}{}", mantissa, "0".repeat(p - MANTISSA_DIGITS))
        }
        Some(p) => {
            let shift = (MANTISSA_DIGITS - p) * 4;
            let full = (lead << 52) | mantissa;
            let half = 1u64 << (shift - 1);
            let rem = full & ((1u64 << shift) - 1);
            let mut kept = full >> shift;
            if rem > half || (rem == half && kept & 1 == 1) {
                kept += 1;
            }
            lead = kept >> (p * 4);
            let frac = kept & ((1u64 << (p * 4)) - 1);
            if p == 0 {
                String::new()
            } else {
                format!("{:0width$x}", frac, width = p)
            }
        }
    };

    let point = if digits.is_empty() && !alternate { "" } else { "." };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("0x{}{}{}p{}{}", lead, point, digits, sign, exp.unsigned_abs())
}
