//! Numeric-literal scanner shared by the lexer and `NumberNode`.
//!
//! Grammar: `[+-]? digit+ ('.' digit+)? ([eE] [+-]? digit+)?`

/// Why a numeric literal failed to scan. `offset` is the byte offset of the
/// offending position within the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error("expected digits at offset {offset}")]
    MissingDigits { offset: usize },
    #[error("expected digits after the decimal point at offset {offset}")]
    MissingFraction { offset: usize },
    #[error("expected exponent digits at offset {offset}")]
    MissingExponent { offset: usize },
}

/// Scans the longest numeric literal at the start of `text` and returns its
/// length in bytes.
pub fn scan(text: &str) -> Result<usize, NumberError> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let digits = count_digits(&bytes[pos..]);
    if digits == 0 {
        return Err(NumberError::MissingDigits { offset: pos });
    }
    pos += digits;

    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let fraction = count_digits(&bytes[pos..]);
        if fraction == 0 {
            return Err(NumberError::MissingFraction { offset: pos });
        }
        pos += fraction;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exponent = count_digits(&bytes[pos..]);
        if exponent == 0 {
            return Err(NumberError::MissingExponent { offset: pos });
        }
        pos += exponent;
    }

    Ok(pos)
}

/// True when the whole of `text` is exactly one numeric literal.
pub fn is_literal(text: &str) -> bool {
    matches!(scan(text), Ok(len) if len == text.len())
}

/// True when the literal has neither a fractional part nor an exponent.
pub fn is_integer_literal(text: &str) -> bool {
    is_literal(text) && !text.contains(['.', 'e', 'E'])
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
