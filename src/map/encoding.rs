//! Fixed text encodings understood by text registers.

use alloc::string::String;

use thiserror::Error;

/// Text encoding used by [`ValueKind::Text`](crate::map::ValueKind::Text) registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    Ascii,
    Latin1,
    Utf16Le,
    Utf16Be,
}

/// Raw bytes could not be decoded under a register's text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid {encoding} byte sequence at offset {valid_up_to}")]
pub struct TextDecodeError {
    pub encoding: TextEncoding,
    /// Offset of the first byte that could not be decoded.
    pub valid_up_to: usize,
}

impl TextEncoding {
    /// Resolves an encoding label such as `"utf-8"` or `"latin_1"`.
    ///
    /// Labels are matched case-insensitively and `_` is treated as `-`.
    pub fn from_label(label: &str) -> Option<Self> {
        let mut buf = [0u8; 16];
        let label = label.trim();
        if label.len() > buf.len() {
            return None;
        }
        for (dst, src) in buf.iter_mut().zip(label.bytes()) {
            *dst = match src {
                b'_' => b'-',
                c => c.to_ascii_lowercase(),
            };
        }
        match &buf[..label.len()] {
            b"utf-8" | b"utf8" => Some(TextEncoding::Utf8),
            b"ascii" | b"us-ascii" => Some(TextEncoding::Ascii),
            b"latin-1" | b"latin1" | b"iso-8859-1" | b"iso8859-1" => Some(TextEncoding::Latin1),
            b"utf-16-le" | b"utf-16le" | b"utf16le" => Some(TextEncoding::Utf16Le),
            b"utf-16-be" | b"utf-16be" | b"utf16be" => Some(TextEncoding::Utf16Be),
            _ => None,
        }
    }

    /// Canonical label for this encoding.
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Utf16Le => "utf-16-le",
            TextEncoding::Utf16Be => "utf-16-be",
        }
    }

    /// Decodes `raw` into a string.
    pub fn decode(&self, raw: &[u8]) -> Result<String, TextDecodeError> {
        let err = |valid_up_to| TextDecodeError {
            encoding: *self,
            valid_up_to,
        };

        match self {
            TextEncoding::Utf8 => core::str::from_utf8(raw)
                .map(String::from)
                .map_err(|e| err(e.valid_up_to())),
            TextEncoding::Ascii => match raw.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(err(pos)),
                None => Ok(raw.iter().map(|&b| b as char).collect()),
            },
            TextEncoding::Latin1 => Ok(raw.iter().map(|&b| b as char).collect()),
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
                let units = raw.chunks(2).map(|pair| match (pair, self) {
                    ([lo, hi], TextEncoding::Utf16Le) => Some(u16::from_le_bytes([*lo, *hi])),
                    ([hi, lo], _) => Some(u16::from_be_bytes([*hi, *lo])),
                    _ => None,
                });

                let mut out = String::with_capacity(raw.len() / 2);
                let mut offset = 0;
                for decoded in char::decode_utf16(units.map_while(|u| u)) {
                    match decoded {
                        Ok(c) => {
                            out.push(c);
                            offset += c.len_utf16() * 2;
                        }
                        Err(_) => return Err(err(offset)),
                    }
                }
                // Odd trailing byte
                if offset != raw.len() {
                    return Err(err(offset));
                }
                Ok(out)
            }
        }
    }
}

impl core::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_resolve() {
        assert_eq!(TextEncoding::from_label("UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_label("utf_8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_label("latin_1"), Some(TextEncoding::Latin1));
        assert_eq!(
            TextEncoding::from_label("utf-16-be"),
            Some(TextEncoding::Utf16Be)
        );
        assert_eq!(TextEncoding::from_label("ebcdic"), None);
        assert_eq!(TextEncoding::from_label("a-very-long-unknown-label"), None);
    }

    #[test]
    fn decode_scenarios() {
        assert_eq!(TextEncoding::Utf8.decode(b"ok").unwrap(), "ok");
        assert_eq!(TextEncoding::Ascii.decode(b"ID01").unwrap(), "ID01");
        assert_eq!(TextEncoding::Latin1.decode(&[0x41, 0xE9]).unwrap(), "A\u{e9}");
        assert_eq!(
            TextEncoding::Utf16Le.decode(&[0x48, 0x00, 0x69, 0x00]).unwrap(),
            "Hi"
        );
        assert_eq!(
            TextEncoding::Utf16Be.decode(&[0x00, 0x48, 0x00, 0x69]).unwrap(),
            "Hi"
        );
    }

    #[test]
    fn decode_errors_report_offset() {
        assert_eq!(
            TextEncoding::Utf8.decode(&[b'a', 0xFF]),
            Err(TextDecodeError {
                encoding: TextEncoding::Utf8,
                valid_up_to: 1
            })
        );
        assert_eq!(
            TextEncoding::Ascii.decode(&[b'a', b'b', 0x80]).unwrap_err().valid_up_to,
            2
        );
        // Lone surrogate
        assert_eq!(
            TextEncoding::Utf16Le
                .decode(&[0x41, 0x00, 0x00, 0xD8])
                .unwrap_err()
                .valid_up_to,
            2
        );
        // Odd length
        assert_eq!(
            TextEncoding::Utf16Be.decode(&[0x00, 0x41, 0x00]).unwrap_err().valid_up_to,
            2
        );
    }
}
