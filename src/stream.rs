//! Line stream adapter.
//!
//! Drives the text path of a [`Detokenizer`] over an async line stream, e.g.
//! a serial console piped into stdin:
//!
//! ```ignore
//! use tokio::io::{stdin, stdout, BufReader};
//!
//! let lines = detokenize_lines(&detokenizer, BufReader::new(stdin()), stdout()).await?;
//! ```
//!
//! Output lines always end with `\n`; a trailing `\r` is dropped.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::detokenizer::Detokenizer;
use crate::error::Result;
use crate::protocol::lossy_text;

/// Rewrite every line from `reader` into `writer`.
///
/// Returns the number of lines processed. Lines that are not valid UTF-8
/// are rendered lossily instead of failing.
///
/// # Errors
///
/// Returns `Io` if reading or writing fails.
pub async fn detokenize_lines<R, W>(
    detokenizer: &Detokenizer,
    mut reader: R,
    mut writer: W,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut count = 0u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = trim_line_ending(&buf);
        let rendered = detokenizer.detokenize_text(&lossy_text(line));
        writer.write_all(rendered.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        count += 1;
    }

    writer.flush().await?;
    tracing::debug!("Detokenized {} lines", count);
    Ok(count)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
