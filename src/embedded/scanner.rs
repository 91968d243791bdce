//! Forward scanner for `$`-prefixed Base64 candidates.
//!
//! Grammar of one candidate:
//!
//! ```text
//! PREFIX (B B B B)* ( B B B '=' | B B '=' '=' )?
//! B = A-Z a-z 0-9 + / - _
//! ```
//!
//! Matching is leftmost-first, greedy and non-overlapping. A bare prefix with
//! no following symbols is a valid (empty) candidate. A trailing partial block
//! without its padding is left outside the match.

use std::ops::Range;

/// Default prefix marking a Base64-encoded token in text.
pub const DEFAULT_PREFIX: char = '$';

/// Size of one complete Base64 block.
const BLOCK: usize = 4;

/// Check whether a byte belongs to the candidate alphabet.
///
/// Accepts both the standard (`+`, `/`) and URL-safe (`-`, `_`) symbols.
#[inline]
pub fn is_base64_symbol(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'/' | b'-' | b'_')
}

/// One syntactic match inside the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Byte offset of the prefix character.
    pub start: usize,
    /// Byte offset one past the last matched character.
    pub end: usize,
    /// The matched text, prefix included.
    pub text: &'a str,
}

impl<'a> Candidate<'a> {
    /// Byte span of the match in the scanned text.
    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The Base64 body, without the prefix.
    #[inline]
    pub fn body(&self, prefix: char) -> &'a str {
        &self.text[prefix.len_utf8()..]
    }
}

/// Lazy iterator over the candidates of one text.
///
/// Single forward pass: once consumed, it cannot be restarted.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    prefix: char,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner with a custom prefix character.
    pub fn new(text: &'a str, prefix: char) -> Self {
        Self {
            text,
            prefix,
            pos: 0,
        }
    }

    /// Length of the Base64 body starting at `from`.
    fn body_len(&self, from: usize) -> usize {
        let bytes = &self.text.as_bytes()[from..];
        let symbols = bytes.iter().take_while(|&&b| is_base64_symbol(b)).count();
        let full = symbols - symbols % BLOCK;
        let rest = &bytes[full..];

        match symbols % BLOCK {
            3 if rest.get(3) == Some(&b'=') => full + BLOCK,
            2 if rest.get(2) == Some(&b'=') && rest.get(3) == Some(&b'=') => full + BLOCK,
            _ => full,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Candidate<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let found = self.text[self.pos..].find(self.prefix)?;
        let start = self.pos + found;
        let body_start = start + self.prefix.len_utf8();
        let end = body_start + self.body_len(body_start);

        self.pos = end;
        Some(Candidate {
            start,
            end,
            text: &self.text[start..end],
        })
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}

/// Scan text for `$`-prefixed candidates.
///
/// # Example
///
/// ```
/// use tokenlog::embedded::scan;
///
/// let found: Vec<_> = scan("a $KgAAACoAAAA= b $ c").map(|c| c.text).collect();
/// assert_eq!(found, ["$KgAAACoAAAA=", "$"]);
/// ```
pub fn scan(text: &str) -> Scanner<'_> {
    Scanner::new(text, DEFAULT_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(text: &str) -> Vec<&str> {
        scan(text).map(|c| c.text).collect()
    }

    #[test]
    fn test_no_prefix_yields_nothing() {
        assert!(matches("plain log line, nothing here").is_empty());
        assert!(matches("").is_empty());
    }

    #[test]
    fn test_full_blocks() {
        assert_eq!(matches("$AAAABBBB"), ["$AAAABBBB"]);
    }

    #[test]
    fn test_single_pad_tail() {
        assert_eq!(matches("$AAAAxyz="), ["$AAAAxyz="]);
        assert_eq!(matches("$xyz="), ["$xyz="]);
    }

    #[test]
    fn test_double_pad_tail() {
        assert_eq!(matches("$AAAAxy=="), ["$AAAAxy=="]);
        assert_eq!(matches("$xy=="), ["$xy=="]);
    }

    #[test]
    fn test_bare_prefix_is_empty_candidate() {
        let found: Vec<_> = scan("cost: $ 5").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "$");
        assert_eq!(found[0].span(), 6..7);
        assert_eq!(found[0].body('$'), "");
    }

    #[test]
    fn test_unterminated_tail_is_not_consumed() {
        // Three symbols without '=' and one symbol are both left behind.
        assert_eq!(matches("$AAAAxyz"), ["$AAAA"]);
        assert_eq!(matches("$AAAAx"), ["$AAAA"]);
        assert_eq!(matches("$xy="), ["$"]);
    }

    #[test]
    fn test_padding_without_symbols() {
        assert_eq!(matches("$===="), ["$"]);
    }

    #[test]
    fn test_url_safe_symbols_accepted() {
        assert_eq!(matches("$ab-_cd+/"), ["$ab-_cd+/"]);
    }

    #[test]
    fn test_spans_and_order() {
        let text = "x $AAAA y $BBBBcc== z";
        let found: Vec<_> = scan(text).collect();

        assert_eq!(found.len(), 2);
        assert_eq!(&text[found[0].span()], "$AAAA");
        assert_eq!(&text[found[1].span()], "$BBBBcc==");
        assert!(found[0].end <= found[1].start);
    }

    #[test]
    fn test_adjacent_candidates_do_not_overlap() {
        assert_eq!(matches("$AAAA$BBBB$"), ["$AAAA", "$BBBB", "$"]);
    }

    #[test]
    fn test_custom_prefix() {
        let found: Vec<_> = Scanner::new("#AAAA $BBBB", '#').map(|c| c.text).collect();
        assert_eq!(found, ["#AAAA"]);
    }

    #[test]
    fn test_multibyte_text_around_candidates() {
        assert_eq!(matches("żółw $AAAA ✓"), ["$AAAA"]);
    }

    #[test]
    fn test_scanner_is_fused() {
        let mut scanner = scan("$AAAA");
        assert!(scanner.next().is_some());
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
