//! Typed loader errors shared by the DDS and OBJ readers.

use std::fmt;

use thiserror::Error;

/// Which OBJ attribute pool a face index was resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Position,
    TexCoord,
    Normal,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Position => "position",
            Attribute::TexCoord => "texture coordinate",
            Attribute::Normal => "normal",
        })
    }
}

/// Every way a single `load` call can fail. None of them leave a partial asset behind.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("not a DDS file: bad magic {found:?}")]
    Format { found: [u8; 4] },

    #[error("input ended inside the {region} ({needed} bytes needed, {available} available)")]
    TruncatedInput {
        region: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("unsupported compressed format tag 0x{tag:08x} ({})", four_cc_text(*.tag))]
    UnsupportedFormat { tag: u32 },

    #[error("mip level {level} needs {needed} bytes but only {available} remain")]
    CorruptData {
        level: u32,
        needed: usize,
        available: usize,
    },

    #[error("malformed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("{attribute} index {index} out of range (have {len}) on line {line}")]
    IndexOutOfRange {
        line: usize,
        attribute: Attribute,
        index: i64,
        len: usize,
    },

    #[error("face on line {line} has {corners} corners; only triangles are supported")]
    UnsupportedTopology { line: usize, corners: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AssetResult<T> = Result<T, AssetError>;

/// Render a little-endian FourCC as text, replacing unprintable bytes with '.'.
pub(crate) fn four_cc_text(tag: u32) -> String {
    tag.to_le_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_names_raw_tag() {
        let err = AssetError::UnsupportedFormat { tag: 0x3031_4344 };
        let msg = err.to_string();
        assert!(msg.contains("0x30314344"), "{msg}");
        assert!(msg.contains("DC10"), "{msg}");
    }

    #[test]
    fn four_cc_masks_unprintable_bytes() {
        assert_eq!(four_cc_text(0x0000_4144), "DA..");
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let err = AssetError::MalformedLine {
            line: 7,
            reason: "missing z".into(),
        };
        assert_eq!(err.to_string(), "malformed line 7: missing z");
    }
}
