//! Wire encoding for command arguments.

use crate::mutf7;
use crate::parser::lexer::is_atom_char;

use super::Arg;

/// Wraps a byte string in IMAP double quotes, escaping `"` and `\`.
#[must_use]
pub fn quote_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    out.push(b'"');
    for &b in data {
        if b == b'"' || b == b'\\' {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b'"');
    out
}

/// Removes IMAP quoting from a quoted string, resolving escapes.
///
/// The inverse of [`quote_bytes`]; expects the surrounding quotes to be
/// present.
#[must_use]
pub fn unquote_bytes(data: &[u8]) -> Option<Vec<u8>> {
    if data.len() < 2 || data[0] != b'"' || data[data.len() - 1] != b'"' {
        return None;
    }
    let mut out = Vec::with_capacity(data.len() - 2);
    let mut escaped = false;
    for &b in &data[1..data.len() - 1] {
        if escaped {
            out.push(b);
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else {
            out.push(b);
        }
    }
    if escaped {
        return None;
    }
    Some(out)
}

/// Encodes an astring: bare atom when every byte is an ATOM-CHAR,
/// quoted string otherwise.
#[must_use]
pub fn astring_bytes(data: &[u8]) -> Vec<u8> {
    if !data.is_empty() && data.iter().all(|&b| is_atom_char(b)) {
        data.to_vec()
    } else {
        quote_bytes(data)
    }
}

/// Encodes a user-supplied string as a quoted string unconditionally.
///
/// LIST/LSUB reference and pattern arguments always travel quoted, after
/// modified UTF-7 encoding.
#[must_use]
pub fn quoted_arg(value: &str) -> Arg {
    Arg::Raw(quote_bytes(mutf7::encode(value).as_bytes()))
}

/// Encodes a mailbox name argument.
///
/// The name goes through modified UTF-7 first. Names that were pure
/// ASCII travel as astrings; names that needed encoding are sent as
/// literals so the exact octets reach the server unmodified.
#[must_use]
pub fn mailbox_arg(name: &str) -> Arg {
    let encoded = mutf7::encode(name);
    if name.is_ascii() {
        Arg::String(encoded)
    } else {
        Arg::Literal(encoded.into_bytes())
    }
}
