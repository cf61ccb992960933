//! IMAP token primitives built on [`ByteStream`].
//!
//! Implements the RFC 3501 lexical grammar: atoms, quoted strings,
//! length-prefixed literals, numbers, flag lists and the mailbox-list
//! production used by LIST/LSUB.

use tokio::io::AsyncRead;

use crate::connection::ByteStream;
use crate::{Error, Result};

/// Maximum accepted literal size, to prevent memory exhaustion.
const MAX_LITERAL_SIZE: usize = 100 * 1024 * 1024; // 100 MB

/// Grammar-level reader over a byte stream.
pub struct Lexer<'a, S> {
    stream: &'a mut ByteStream<S>,
}

impl<'a, S> Lexer<'a, S>
where
    S: AsyncRead + Unpin,
{
    /// Creates a lexer borrowing the given stream.
    pub fn new(stream: &'a mut ByteStream<S>) -> Self {
        Self { stream }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            position: self.stream.offset(),
            message: message.into(),
        }
    }

    /// Reads a `number`: one or more digits parsed as u32.
    ///
    /// Rejects zero-prefixed forms beyond a lone `0`.
    pub async fn read_number(&mut self) -> Result<u32> {
        let digits = self.stream.read_while(|b| b.is_ascii_digit()).await?;
        parse_number(&digits).map_err(|message| self.error(message))
    }

    /// Reads an `atom`: one or more ATOM-CHAR bytes.
    pub async fn read_atom(&mut self) -> Result<String> {
        let data = self.stream.read_while(is_atom_char).await?;
        if data.is_empty() {
            return Err(self.error("expected atom"));
        }
        // ATOM-CHAR is a subset of ASCII.
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Reads an `astring`: atom, quoted string, or literal.
    pub async fn read_astring(&mut self) -> Result<Vec<u8>> {
        match self.stream.peek(1).await?[0] {
            b'"' => self.read_quoted_string().await,
            b'{' => self.read_literal().await,
            _ => {
                let data = self.stream.read_while(is_astring_char).await?;
                if data.is_empty() {
                    Err(self.error("expected astring"))
                } else {
                    Ok(data)
                }
            }
        }
    }

    /// Reads a quoted string, resolving backslash escapes.
    ///
    /// Only `"` and `\` may be escaped; CR and LF are forbidden inside.
    pub async fn read_quoted_string(&mut self) -> Result<Vec<u8>> {
        if !self.stream.skip_byte(b'"').await? {
            return Err(self.error("missing opening quote"));
        }

        let mut data = Vec::new();
        loop {
            let (byte, quoted) = self.read_quoted_char().await?;
            if byte == b'"' && !quoted {
                break;
            }
            data.push(byte);
        }
        Ok(data)
    }

    /// Reads one character of a quoted string.
    ///
    /// Returns the byte and whether it was backslash-escaped.
    pub async fn read_quoted_char(&mut self) -> Result<(u8, bool)> {
        let byte = self.stream.read_exact(1).await?[0];
        if byte == b'\r' || byte == b'\n' {
            return Err(self.error("CR/LF inside quoted string"));
        }
        if byte != b'\\' {
            return Ok((byte, false));
        }

        let escaped = self.stream.read_exact(1).await?[0];
        if is_quoted_special(escaped) {
            Ok((escaped, true))
        } else {
            Err(self.error(format!("invalid escape \\{}", escaped as char)))
        }
    }

    /// Reads a `literal`: `{n}` CRLF followed by exactly n bytes.
    pub async fn read_literal(&mut self) -> Result<Vec<u8>> {
        if !self.stream.skip_byte(b'{').await? {
            return Err(self.error("missing '{' for literal"));
        }

        let count_bytes = self.stream.read_until_and_skip(b"}").await?;
        let count = parse_number(&count_bytes).map_err(|message| self.error(message))? as usize;
        if count > MAX_LITERAL_SIZE {
            return Err(self.error("literal too large"));
        }

        if !self.stream.skip_bytes(b"\r\n").await? {
            return Err(self.error("missing CRLF after literal size"));
        }

        self.stream.read_exact(count).await
    }

    /// Reads a `flag-list`: `(` space-separated atoms `)`, possibly empty.
    ///
    /// Flag atoms keep their leading backslash (`\Seen`).
    pub async fn read_flag_list(&mut self) -> Result<Vec<String>> {
        if !self.stream.skip_byte(b'(').await? {
            return Err(self.error("missing '(' for flag list"));
        }

        let mut flags = Vec::new();
        loop {
            if self.stream.skip_byte(b')').await? {
                break;
            }
            if !flags.is_empty() && !self.stream.skip_byte(b' ').await? {
                return Err(self.error("missing space in flag list"));
            }

            let backslash = self.stream.skip_byte(b'\\').await?;
            let atom = self
                .stream
                .read_while(|b| is_atom_char(b) || b == b'*')
                .await?;
            if atom.is_empty() && !backslash {
                return Err(self.error("expected flag atom"));
            }
            let mut flag = String::with_capacity(atom.len() + 1);
            if backslash {
                flag.push('\\');
            }
            flag.push_str(&String::from_utf8_lossy(&atom));
            flags.push(flag);
        }

        Ok(flags)
    }

    /// Reads a `mailbox-list` body: flag-list SP delimiter SP astring.
    ///
    /// The delimiter is a single quoted character or the exact token
    /// `NIL`. The name is returned still modified-UTF-7 encoded.
    pub async fn read_mailbox_list(&mut self) -> Result<(Vec<String>, Option<char>, Vec<u8>)> {
        let flags = self.read_flag_list().await?;

        if !self.stream.skip_byte(b' ').await? {
            return Err(self.error("missing space after mailbox flags"));
        }

        // `NIL` is case-sensitive per the ABNF.
        let delimiter = if self.stream.skip_bytes(b"NIL").await? {
            None
        } else {
            if !self.stream.skip_byte(b'"').await? {
                return Err(self.error("missing quote for hierarchy delimiter"));
            }
            let (byte, _) = self.read_quoted_char().await?;
            if !self.stream.skip_byte(b'"').await? {
                return Err(self.error("missing closing quote for hierarchy delimiter"));
            }
            Some(byte as char)
        };

        if !self.stream.skip_byte(b' ').await? {
            return Err(self.error("missing space after hierarchy delimiter"));
        }

        let name = self.read_astring().await?;
        Ok((flags, delimiter, name))
    }

    /// Requires and consumes the line-terminating CRLF.
    pub async fn expect_crlf(&mut self) -> Result<()> {
        if self.stream.skip_bytes(b"\r\n").await? {
            Ok(())
        } else {
            Err(self.error("expected CRLF"))
        }
    }
}

/// Parses a digit run as u32, rejecting zero-prefixed forms beyond `0`.
pub(crate) fn parse_number(digits: &[u8]) -> std::result::Result<u32, String> {
    if digits.is_empty() {
        return Err("expected number".to_string());
    }
    if digits.len() > 1 && digits[0] == b'0' {
        return Err("zero-prefixed number".to_string());
    }
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| "number out of range".to_string())
}

/// CHAR: 7-bit ASCII.
pub const fn is_char(b: u8) -> bool {
    b < 0x80
}

/// CTL: control characters.
pub const fn is_ctl(b: u8) -> bool {
    b < 0x20 || b == 0x7f
}

/// list-wildcards: `%` and `*`.
pub const fn is_list_wildcard(b: u8) -> bool {
    b == b'%' || b == b'*'
}

/// quoted-specials: `"` and `\`.
pub const fn is_quoted_special(b: u8) -> bool {
    b == b'"' || b == b'\\'
}

/// resp-specials: `]`.
pub const fn is_resp_special(b: u8) -> bool {
    b == b']'
}

/// ATOM-CHAR: CHAR minus atom-specials.
pub const fn is_atom_char(b: u8) -> bool {
    is_char(b)
        && !(b == b'(' || b == b')' || b == b'{' || b == b' ')
        && !is_ctl(b)
        && !is_list_wildcard(b)
        && !is_quoted_special(b)
        && !is_resp_special(b)
}

/// ASTRING-CHAR: ATOM-CHAR or resp-specials.
pub const fn is_astring_char(b: u8) -> bool {
    is_atom_char(b) || is_resp_special(b)
}
