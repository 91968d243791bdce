//! Token database file formats.
//!
//! CSV, one entry per line, no header:
//!
//! ```text
//! 0000002a,          ,"answer=%d"
//! 5f2e1a07,2023-04-01,"removed string"
//! ```
//!
//! JSON, either a map from hex token to format string or a list of entries:
//!
//! ```text
//! { "0000002a": "answer=%d" }
//! [ { "token": 42, "format": "answer=%d", "removal_date": null } ]
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use super::table::{TokenEntry, TokenTable};
use crate::error::{DetokenizeError, Result};
use crate::protocol::Token;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDatabase {
    Map(HashMap<String, String>),
    List(Vec<TokenEntry>),
}

/// Parse a hex token such as `0000002a` (an optional `0x` prefix is accepted).
fn parse_token(field: &str) -> Result<Token> {
    let hex = field.trim();
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);
    if hex.is_empty() || hex.len() > 8 {
        return Err(DetokenizeError::Database(format!(
            "Invalid token '{}': expected up to 8 hex digits",
            field
        )));
    }
    u32::from_str_radix(hex, 16)
        .map_err(|e| DetokenizeError::Database(format!("Invalid token '{}': {}", field, e)))
}

impl TokenTable {
    /// Load a CSV token database.
    ///
    /// # Errors
    ///
    /// Returns `Csv` for malformed CSV and `Database` for rows with a bad
    /// token or fewer than 3 columns.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = TokenTable::new();
        for record in csv.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let (token, date, format) = match (record.get(0), record.get(1), record.get(2)) {
                (Some(token), Some(date), Some(format)) => (token, date, format),
                _ => {
                    return Err(DetokenizeError::Database(format!(
                        "Line {}: expected 3 columns, found {}",
                        line,
                        record.len()
                    )))
                }
            };

            let date = date.trim();
            let mut entry = TokenEntry::new(parse_token(token)?, format);
            if !date.is_empty() {
                entry = entry.removed(date);
            }
            table.push(entry);
        }

        tracing::debug!("Loaded {} CSV token entries", table.len());
        Ok(table)
    }

    /// Load a JSON token database.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let table = match serde_json::from_reader(reader)? {
            JsonDatabase::Map(map) => {
                let mut table = TokenTable::new();
                for (token, format) in map {
                    table.insert(parse_token(&token)?, format);
                }
                table
            }
            JsonDatabase::List(entries) => entries.into_iter().collect(),
        };

        tracing::debug!("Loaded {} JSON token entries", table.len());
        Ok(table)
    }

    /// Load a database file, choosing the format by extension.
    ///
    /// `.json` files are read as JSON, everything else as CSV.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let table = if is_json {
            Self::from_json_reader(reader)?
        } else {
            Self::from_csv_reader(reader)?
        };

        tracing::info!(
            "Loaded token database {} ({} entries)",
            path.display(),
            table.len()
        );
        Ok(table)
    }

    /// Load and merge several database files.
    pub fn load_paths<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Self> {
        let mut table = TokenTable::new();
        for path in paths {
            table.merge(Self::load_path(path)?);
        }
        Ok(table)
    }
}
