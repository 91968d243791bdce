//! Detokenizer builder and orchestration.
//!
//! The [`Detokenizer`] ties a [`TokenDatabase`] and an [`ArgumentDecoder`]
//! together and renders frames in two ways:
//! 1. Binary: the frame is `token + args`
//! 2. Base64 in text: every `$`-prefixed candidate in the text is rendered in place
//!
//! Neither path fails. Unknown tokens fall back to lossy text (binary) or
//! leave the candidate untouched (text).
//!
//! # Example
//!
//! ```
//! use tokenlog::database::TokenTable;
//! use tokenlog::protocol::Frame;
//! use tokenlog::Detokenizer;
//!
//! let mut table = TokenTable::new();
//! table.insert(42, "answer=%d");
//! let detokenizer = Detokenizer::new(table);
//!
//! let frame = Frame::from_slice(&[0x2A, 0, 0, 0, 0x2A, 0, 0, 0]);
//! assert_eq!(detokenizer.detokenize(&frame), "answer=42");
//! assert_eq!(
//!     detokenizer.detokenize_text("prefix $KgAAACoAAAA= suffix"),
//!     "prefix answer=42 suffix"
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use crate::codec::{ArgumentDecoder, PrintfDecoder};
use crate::database::{TokenDatabase, TokenTable};
use crate::embedded::{decode_candidate, Candidate, Scanner, DEFAULT_PREFIX};
use crate::error::Result;
use crate::protocol::{lossy_text, Frame, Token};

/// Default depth for rendering tokens nested inside rendered messages.
pub const DEFAULT_RECURSION: usize = 2;

/// Detokenizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetokenizerConfig {
    /// Character marking a Base64 token in text.
    pub prefix: char,
    /// How many times a substituted message is scanned again for nested tokens.
    pub recursion: usize,
}

impl Default for DetokenizerConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX,
            recursion: DEFAULT_RECURSION,
        }
    }
}

/// Result of rendering one binary frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detokenized {
    token: Option<Token>,
    format: Option<String>,
    text: String,
}

impl Detokenized {
    /// Check if the token was found and its format string rendered.
    #[inline]
    pub fn ok(&self) -> bool {
        self.format.is_some()
    }

    /// The token, `None` if the frame was shorter than 4 bytes.
    #[inline]
    pub fn token(&self) -> Option<Token> {
        self.token
    }

    /// The format string the token resolved to.
    #[inline]
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// The rendered message, or the lossy fallback text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume and return the rendered text.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Detokenized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Renders tokenized frames back into text.
///
/// Cheap to clone: clones share the same database and decoder.
#[derive(Clone)]
pub struct Detokenizer {
    database: Arc<dyn TokenDatabase>,
    decoder: Arc<dyn ArgumentDecoder>,
    config: DetokenizerConfig,
}

impl fmt::Debug for Detokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detokenizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Detokenizer {
    /// Create a detokenizer with the printf decoder and default settings.
    pub fn new(database: impl TokenDatabase + 'static) -> Self {
        Self::builder().database(database).build()
    }

    /// Create a detokenizer with a custom argument decoder.
    pub fn with_decoder(
        database: impl TokenDatabase + 'static,
        decoder: impl ArgumentDecoder + 'static,
    ) -> Self {
        Self::builder().database(database).decoder(decoder).build()
    }

    /// Start configuring a detokenizer.
    pub fn builder() -> DetokenizerBuilder {
        DetokenizerBuilder::new()
    }

    /// Current settings.
    pub fn config(&self) -> &DetokenizerConfig {
        &self.config
    }

    /// Render one binary frame, keeping the token and format string.
    pub fn resolve(&self, frame: &Frame) -> Detokenized {
        let (token, args) = match frame.split() {
            Ok(split) => split,
            Err(e) => {
                tracing::debug!("Rendering short frame as text: {}", e);
                return Detokenized {
                    token: None,
                    format: None,
                    text: lossy_text(frame.payload()),
                };
            }
        };

        match self.database.lookup(token) {
            Some(format) => {
                let text = self.decoder.decode(&format, args);
                tracing::trace!("Token {:08x} rendered as {:?}", token, text);
                Detokenized {
                    token: Some(token),
                    format: Some(format.into_owned()),
                    text,
                }
            }
            None => {
                tracing::debug!("Token {:08x} not found in database", token);
                Detokenized {
                    token: Some(token),
                    format: None,
                    text: lossy_text(frame.payload()),
                }
            }
        }
    }

    /// Render one binary frame.
    ///
    /// Unknown tokens and frames shorter than 4 bytes are returned as the
    /// frame bytes decoded as lossy UTF-8.
    pub fn detokenize(&self, frame: &Frame) -> String {
        self.resolve(frame).into_string()
    }

    /// Render every Base64 token found in a frame's text payload.
    ///
    /// The payload is decoded as lossy UTF-8 first.
    pub fn detokenize_base64(&self, frame: &Frame) -> String {
        self.detokenize_text(&lossy_text(frame.payload()))
    }

    /// Render every Base64 token found in `text`.
    ///
    /// Candidates that fail to decode or resolve are left as written;
    /// everything else in the text is copied unchanged.
    pub fn detokenize_text(&self, text: &str) -> String {
        self.rewrite(text, self.config.recursion)
    }

    fn rewrite(&self, text: &str, depth: usize) -> String {
        let prefix = self.config.prefix;
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for candidate in Scanner::new(text, prefix) {
            out.push_str(&text[last..candidate.start]);
            last = candidate.end;

            match self.render_candidate(&candidate) {
                Ok(Some(rendered)) if depth > 0 && rendered.contains(prefix) => {
                    out.push_str(&self.rewrite(&rendered, depth - 1));
                }
                Ok(Some(rendered)) => out.push_str(&rendered),
                Ok(None) => out.push_str(candidate.text),
                Err(e) => {
                    tracing::debug!("Leaving {:?} unchanged: {}", candidate.text, e);
                    out.push_str(candidate.text);
                }
            }
        }

        out.push_str(&text[last..]);
        out
    }

    /// Render one candidate, `None` if its token is unknown.
    fn render_candidate(&self, candidate: &Candidate<'_>) -> Result<Option<String>> {
        let decoded = decode_candidate(candidate, self.config.prefix)?;
        let Some(format) = self.database.lookup(decoded.token) else {
            tracing::debug!("Token {:08x} not found in database", decoded.token);
            return Ok(None);
        };
        Ok(Some(self.decoder.decode(&format, &decoded.args)))
    }
}

/// Builder for configuring and creating a [`Detokenizer`].
pub struct DetokenizerBuilder {
    database: Option<Arc<dyn TokenDatabase>>,
    decoder: Arc<dyn ArgumentDecoder>,
    config: DetokenizerConfig,
}

impl DetokenizerBuilder {
    /// Create a builder with the printf decoder and default settings.
    pub fn new() -> Self {
        Self {
            database: None,
            decoder: Arc::new(PrintfDecoder),
            config: DetokenizerConfig::default(),
        }
    }

    /// Set the token database.
    pub fn database(mut self, database: impl TokenDatabase + 'static) -> Self {
        self.database = Some(Arc::new(database));
        self
    }

    /// Set a token database shared with other owners.
    pub fn shared_database(mut self, database: Arc<dyn TokenDatabase>) -> Self {
        self.database = Some(database);
        self
    }

    /// Set the argument decoder.
    ///
    /// Default: [`PrintfDecoder`]
    pub fn decoder(mut self, decoder: impl ArgumentDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Set the Base64 token prefix.
    ///
    /// Default: `$`
    pub fn prefix(mut self, prefix: char) -> Self {
        self.config.prefix = prefix;
        self
    }

    /// Set the nested token depth.
    ///
    /// Default: 2
    pub fn recursion(mut self, depth: usize) -> Self {
        self.config.recursion = depth;
        self
    }

    /// Replace all settings at once.
    pub fn config(mut self, config: DetokenizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the detokenizer.
    ///
    /// Without a database every token is unknown.
    pub fn build(self) -> Detokenizer {
        Detokenizer {
            database: self
                .database
                .unwrap_or_else(|| Arc::new(TokenTable::new())),
            decoder: self.decoder,
            config: self.config,
        }
    }
}

impl Default for DetokenizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RawDecoder;
    use crate::protocol::build_frame;

    /// `$` + Base64 of a token and its argument bytes.
    fn encode(token: Token, args: &[u8]) -> String {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine as _;
        format!("${}", STANDARD.encode(build_frame(token, args)))
    }

    fn detokenizer() -> Detokenizer {
        let mut table = TokenTable::new();
        table.insert(1, "boot complete");
        table.insert(42, "answer=%d");
        table.insert(7, "name=%s");
        Detokenizer::new(table)
    }

    #[test]
    fn test_zero_argument_token() {
        let frame = Frame::from(build_frame(1, &[]));
        assert_eq!(detokenizer().detokenize(&frame), "boot complete");
    }

    #[test]
    fn test_answer_frame() {
        let frame = Frame::from_slice(&[0x2A, 0, 0, 0, 0x2A, 0, 0, 0]);
        assert_eq!(detokenizer().detokenize(&frame), "answer=42");
    }

    #[test]
    fn test_unknown_token_falls_back_to_text() {
        let frame = Frame::from_slice(b"hello world");
        assert_eq!(detokenizer().detokenize(&frame), "hello world");

        let frame = Frame::from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, b'x']);
        assert_eq!(
            detokenizer().detokenize(&frame),
            "\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD}x"
        );
    }

    #[test]
    fn test_short_frame_falls_back_to_text() {
        let detokenizer = detokenizer();
        assert_eq!(detokenizer.detokenize(&Frame::from_slice(b"ok")), "ok");
        assert_eq!(detokenizer.detokenize(&Frame::from_slice(&[])), "");
        // Even a short frame matching a token prefix is not looked up.
        assert_eq!(detokenizer.detokenize(&Frame::from_slice(&[1, 0, 0])), "\u{1}\0\0");
    }

    #[test]
    fn test_resolve_details() {
        let detokenizer = detokenizer();

        let found = detokenizer.resolve(&Frame::from_slice(&[0x2A, 0, 0, 0, 1, 0, 0, 0]));
        assert!(found.ok());
        assert_eq!(found.token(), Some(42));
        assert_eq!(found.format(), Some("answer=%d"));
        assert_eq!(found.text(), "answer=1");
        assert_eq!(found.to_string(), "answer=1");

        let missing = detokenizer.resolve(&Frame::from_slice(&[9, 0, 0, 0]));
        assert!(!missing.ok());
        assert_eq!(missing.token(), Some(9));
        assert_eq!(missing.format(), None);

        let short = detokenizer.resolve(&Frame::from_slice(&[9]));
        assert!(!short.ok());
        assert_eq!(short.token(), None);
    }

    #[test]
    fn test_text_without_prefix_unchanged() {
        let text = "plain log line: temp=21 C, all good";
        assert_eq!(detokenizer().detokenize_text(text), text);
        assert_eq!(detokenizer().detokenize_text(""), "");
    }

    #[test]
    fn test_text_replaces_candidate() {
        let text = format!("prefix {} suffix", encode(42, &42i32.to_le_bytes()));
        assert_eq!(text, "prefix $KgAAACoAAAA= suffix");
        assert_eq!(
            detokenizer().detokenize_text(&text),
            "prefix answer=42 suffix"
        );
    }

    #[test]
    fn test_base64_frame_path() {
        let frame = Frame::from_slice(b"[I] $AQAAAA== ready");
        assert_eq!(
            detokenizer().detokenize_base64(&frame),
            "[I] boot complete ready"
        );
    }

    #[test]
    fn test_malformed_candidate_isolated() {
        let good = encode(1, &[]);
        let text = format!("a {good}$AQI= b");
        assert_eq!(
            detokenizer().detokenize_text(&text),
            "a boot complete$AQI= b"
        );
    }

    #[test]
    fn test_unknown_candidate_left_unchanged() {
        let unknown = encode(999, &[]);
        let text = format!("x {unknown} y {}", encode(1, &[]));
        assert_eq!(
            detokenizer().detokenize_text(&text),
            format!("x {unknown} y boot complete")
        );
    }

    #[test]
    fn test_bare_prefix_left_unchanged() {
        assert_eq!(detokenizer().detokenize_text("cost $ 5 $"), "cost $ 5 $");
    }

    #[test]
    fn test_nested_token_rendered() {
        let inner = encode(1, &[]);
        let mut args = vec![inner.len() as u8];
        args.extend_from_slice(inner.as_bytes());
        let outer = encode(7, &args);

        assert_eq!(
            detokenizer().detokenize_text(&outer),
            "name=boot complete"
        );
    }

    #[test]
    fn test_recursion_zero_keeps_nested_token() {
        let inner = encode(1, &[]);
        let mut args = vec![inner.len() as u8];
        args.extend_from_slice(inner.as_bytes());
        let outer = encode(7, &args);

        let mut table = TokenTable::new();
        table.insert(1, "boot complete");
        table.insert(7, "name=%s");
        let detokenizer = Detokenizer::builder().database(table).recursion(0).build();

        assert_eq!(detokenizer.detokenize_text(&outer), format!("name={inner}"));
    }

    #[test]
    fn test_custom_prefix() {
        let mut table = TokenTable::new();
        table.insert(1, "boot complete");
        let detokenizer = Detokenizer::builder().database(table).prefix('#').build();

        assert_eq!(
            detokenizer.detokenize_text("#AQAAAA== $AQAAAA=="),
            "boot complete $AQAAAA=="
        );
        assert_eq!(detokenizer.config().prefix, '#');
    }

    #[test]
    fn test_custom_decoder() {
        let mut table = TokenTable::new();
        table.insert(42, "answer=%d");
        let detokenizer = Detokenizer::with_decoder(table, RawDecoder);

        let frame = Frame::from_slice(&[0x2A, 0, 0, 0, 0x2A, 0, 0, 0]);
        assert_eq!(detokenizer.detokenize(&frame), "answer=%d");
    }

    #[test]
    fn test_oversized_fields_do_not_abort_text() {
        let mut table = TokenTable::new();
        table.insert(1, "boot complete");
        table.insert(3, "bad=%99999999999999999999d");
        table.insert(5, "v=%*d");
        let detokenizer = Detokenizer::new(table);

        let mut args = 200_000_000i32.to_le_bytes().to_vec();
        args.extend(1i32.to_le_bytes());
        let text = format!(
            "{} {} {}",
            encode(3, &1i32.to_le_bytes()),
            encode(5, &args),
            encode(1, &[])
        );
        assert_eq!(
            detokenizer.detokenize_text(&text),
            "bad=%99999999999999999999d v=%*d boot complete"
        );
    }

    #[test]
    fn test_builder_without_database() {
        let detokenizer = Detokenizer::builder().build();
        assert_eq!(detokenizer.config(), &DetokenizerConfig::default());
        assert_eq!(detokenizer.detokenize_text("$AQAAAA=="), "$AQAAAA==");
    }

    #[test]
    fn test_shared_across_threads() {
        let detokenizer = detokenizer();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let detokenizer = detokenizer.clone();
                std::thread::spawn(move || detokenizer.detokenize_text("$AQAAAA=="))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "boot complete");
        }
    }
}
