//! Key construction helpers
//!
//! Index keys are byte strings compared byte-wise, so fixed-width,
//! zero-padded fields sort the way their numbers do. Cell bytes are used as
//! they are (no decoding), which keeps keys from Shift-JIS or other 8-bit
//! input distinct. The same rules must be used when building the index and
//! when building a lookup key.

use std::str::FromStr;

use thiserror::Error;

use super::table::Table;

/// Left-pad `src` with `pad` up to `width` bytes. Longer input is returned as is.
pub fn pad_left(src: &[u8], width: usize, pad: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(width.max(src.len()));
    out.resize(width.saturating_sub(src.len()), pad);
    out.extend_from_slice(src);
    out
}

/// Right-pad `src` with `pad` up to `width` bytes. Longer input is returned as is.
pub fn pad_right(src: &[u8], width: usize, pad: u8) -> Vec<u8> {
    let mut out = src.to_vec();
    if out.len() < width {
        out.resize(width, pad);
    }
    out
}

/// Strip everything but ASCII digits (`" 01-23 "` becomes `"0123"`)
pub fn normalize_number(src: &[u8]) -> Vec<u8> {
    src.iter().copied().filter(u8::is_ascii_digit).collect()
}

/// Digits only, then left-padded with zeros to `width`
pub fn normalize_number_pad(src: &[u8], width: usize) -> Vec<u8> {
    pad_left(&normalize_number(src), width, b'0')
}

/// How one column contributes to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Cell bytes as is
    Raw,
    /// Digits only, zero-padded to `width`
    Digits { width: usize },
    /// Left-padded with the byte `pad` to `width`
    PadLeft { width: usize, pad: u8 },
    /// Right-padded with the byte `pad` to `width`
    PadRight { width: usize, pad: u8 },
}

impl KeyKind {
    /// Apply this rule to one value
    pub fn apply(&self, value: &[u8]) -> Vec<u8> {
        match *self {
            KeyKind::Raw => value.to_vec(),
            KeyKind::Digits { width } => normalize_number_pad(value, width),
            KeyKind::PadLeft { width, pad } => pad_left(value, width, pad),
            KeyKind::PadRight { width, pad } => pad_right(value, width, pad),
        }
    }
}

/// One column of a composite key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPart {
    pub column: usize,
    pub kind: KeyKind,
}

/// Error from parsing a key layout string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid key spec: {0}")]
pub struct KeySpecError(String);

/// Builder for composite keys made of normalized columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBuilder {
    parts: Vec<KeyPart>,
}

impl KeyBuilder {
    /// Create a new key builder with no parts
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column to the key
    pub fn with_part(mut self, column: usize, kind: KeyKind) -> Self {
        self.parts.push(KeyPart { column, kind });
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    /// Check if any key columns are set
    pub fn has_key_columns(&self) -> bool {
        !self.parts.is_empty()
    }

    /// Build the key for a table row; missing cells count as empty
    pub fn build_key(&self, table: &Table, row: usize) -> Vec<u8> {
        self.parts
            .iter()
            .flat_map(|part| part.kind.apply(table.get(row, part.column).as_bytes()))
            .collect()
    }

    /// Build a lookup key from values given in part order
    pub fn build_lookup_key<S: AsRef<[u8]>>(&self, values: &[S]) -> Vec<u8> {
        self.parts
            .iter()
            .enumerate()
            .flat_map(|(i, part)| {
                let value = values.get(i).map_or(&[][..], |v| v.as_ref());
                part.kind.apply(value)
            })
            .collect()
    }
}

impl FromStr for KeyBuilder {
    type Err = KeySpecError;

    /// Parse `COL[:KIND[:WIDTH[:PAD]]]` parts separated by commas, e.g.
    /// `0:digits:6,1:left:8:0`. Kinds are `raw`, `digits`, `left`, `right`;
    /// the pad is one ASCII character and defaults to a space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut builder = KeyBuilder::new();

        for raw in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let fields: Vec<&str> = raw.split(':').collect();
            let column = fields[0]
                .parse::<usize>()
                .map_err(|_| KeySpecError(format!("bad column in '{}'", raw)))?;

            let width = || -> Result<usize, KeySpecError> {
                fields
                    .get(2)
                    .and_then(|w| w.parse().ok())
                    .ok_or_else(|| KeySpecError(format!("missing width in '{}'", raw)))
            };
            let pad = || -> Result<u8, KeySpecError> {
                match fields.get(3).map(|p| p.as_bytes()) {
                    None => Ok(b' '),
                    Some(&[b]) if b.is_ascii() => Ok(b),
                    Some(_) => Err(KeySpecError(format!(
                        "pad must be one ASCII char in '{}'",
                        raw
                    ))),
                }
            };

            let kind = match fields.get(1).copied().unwrap_or("raw") {
                "raw" => KeyKind::Raw,
                "digits" => KeyKind::Digits { width: width()? },
                "left" => KeyKind::PadLeft {
                    width: width()?,
                    pad: pad()?,
                },
                "right" => KeyKind::PadRight {
                    width: width()?,
                    pad: pad()?,
                },
                other => return Err(KeySpecError(format!("unknown kind '{}'", other))),
            };

            builder = builder.with_part(column, kind);
        }

        if !builder.has_key_columns() {
            return Err(KeySpecError("no key columns".to_string()));
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_padding() {
        assert_eq!(pad_left(b"12", 5, b'0'), b"00012");
        assert_eq!(pad_right(b"ab", 4, b'.'), b"ab..");
        assert_eq!(pad_left(b"123456", 3, b'0'), b"123456");
        assert_eq!(pad_right(b"123456", 3, b'0'), b"123456");
        assert!(pad_right(b"", 0, b'x').is_empty());
    }

    #[test]
    fn test_padding_counts_bytes() {
        // a two-byte Shift-JIS character takes two of the four columns
        assert_eq!(pad_left(&[0x82, 0xa0], 4, b' '), vec![b' ', b' ', 0x82, 0xa0]);
        assert_eq!(pad_left(b"1", 4, b'0').len(), 4);
    }

    #[test]
    fn test_normalize_number() {
        assert_eq!(normalize_number(b" 01-23 "), b"0123");
        assert!(normalize_number(b"abc").is_empty());
        assert_eq!(normalize_number(&[0x82, 0x4f, b'7']), b"7");
        assert_eq!(normalize_number_pad(b"No. 42", 6), b"000042");
        assert_eq!(normalize_number_pad(b"", 3), b"000");
    }

    #[test]
    fn test_build_key_from_table() {
        let table = parse(b"id,date,value\n1,20240101,a\n2\n").unwrap();
        let key = KeyBuilder::new()
            .with_part(0, KeyKind::Digits { width: 6 })
            .with_part(1, KeyKind::PadLeft { width: 8, pad: b'0' });

        assert_eq!(key.build_key(&table, 1), b"00000120240101");
        // missing date column reads as empty
        assert_eq!(key.build_key(&table, 2), b"00000200000000");
        assert_eq!(key.build_lookup_key(&["1", "20240101"]), b"00000120240101");
    }

    #[test]
    fn test_raw_keys_keep_non_utf8_bytes() {
        let table = parse(&[0x82, 0xa0, b'\n', 0x82, 0xa2]).unwrap();
        let key = KeyBuilder::new().with_part(0, KeyKind::Raw);

        assert_eq!(key.build_key(&table, 0), vec![0x82, 0xa0]);
        assert_eq!(key.build_key(&table, 1), vec![0x82, 0xa2]);
        assert_ne!(key.build_key(&table, 0), key.build_key(&table, 1));
    }

    #[test]
    fn test_parse_key_spec() {
        let key: KeyBuilder = "0:digits:6, 1:left:8:0,2,3:right:4".parse().unwrap();
        assert_eq!(
            key.parts(),
            &[
                KeyPart { column: 0, kind: KeyKind::Digits { width: 6 } },
                KeyPart { column: 1, kind: KeyKind::PadLeft { width: 8, pad: b'0' } },
                KeyPart { column: 2, kind: KeyKind::Raw },
                KeyPart { column: 3, kind: KeyKind::PadRight { width: 4, pad: b' ' } },
            ]
        );

        assert!("".parse::<KeyBuilder>().is_err());
        assert!("x:digits:6".parse::<KeyBuilder>().is_err());
        assert!("0:digits".parse::<KeyBuilder>().is_err());
        assert!("0:left:4:ab".parse::<KeyBuilder>().is_err());
        assert!("0:upper".parse::<KeyBuilder>().is_err());
    }

    #[test]
    fn test_parse_key_spec_rejects_non_ascii_pad() {
        let err = "0:left:4:\u{3000}".parse::<KeyBuilder>().unwrap_err();
        assert!(err.to_string().contains("one ASCII char"));
        assert!("0:right:4:\u{e9}".parse::<KeyBuilder>().is_err());
    }
}
