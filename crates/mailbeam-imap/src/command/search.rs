//! SEARCH key construction (RFC 3501 section 6.4.4).
//!
//! A search key is an ordered sequence of wire tokens. Keys are built
//! either through the typed combinators or by parsing the surface
//! syntax, a whitespace-separated list of tags with double-quoted
//! string arguments and ISO dates.

use crate::{Error, Result};

use super::encode::astring_bytes;

/// English month abbreviations for the IMAP date form. The wire format
/// is `dd-Mon-yyyy` regardless of locale.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar date carried by BEFORE/ON/SINCE and the SENT* keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchDate {
    year: u16,
    month: u8,
    day: u8,
}

impl SearchDate {
    /// Creates a date, validating the month and day ranges.
    ///
    /// # Errors
    ///
    /// Fails when the month or day is out of range.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(Error::InvalidSearchArgument {
                key: "date".to_string(),
                message: format!("invalid date {year:04}-{month:02}-{day:02}"),
            });
        }
        Ok(Self { year, month, day })
    }

    /// Parses an ISO `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Fails when the input does not match the ISO form.
    pub fn from_iso(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidSearchArgument {
            key: "date".to_string(),
            message: format!("invalid date {input:?}"),
        };

        let mut parts = input.splitn(3, '-');
        let year = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let month = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let day = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        Self::new(year, month, day).map_err(|_| invalid())
    }
}

impl std::fmt::Display for SearchDate {
    /// Formats the date in the IMAP wire form, e.g. `05-Feb-2024`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}-{}-{:04}",
            self.day,
            MONTHS[usize::from(self.month) - 1],
            self.year
        )
    }
}

/// An ordered sequence of SEARCH wire tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchKey {
    tokens: Vec<Vec<u8>>,
}

macro_rules! bare_keys {
    ($(($fn_name:ident, $tag:literal)),* $(,)?) => {
        $(
            #[doc = concat!("The `", $tag, "` key.")]
            #[must_use]
            pub fn $fn_name() -> Self {
                Self::atom($tag)
            }
        )*
    };
}

macro_rules! string_keys {
    ($(($fn_name:ident, $tag:literal)),* $(,)?) => {
        $(
            #[doc = concat!("The `", $tag, "` key with a string argument.")]
            #[must_use]
            pub fn $fn_name(value: &str) -> Self {
                let mut key = Self::atom($tag);
                key.tokens.push(astring_bytes(value.as_bytes()));
                key
            }
        )*
    };
}

macro_rules! date_keys {
    ($(($fn_name:ident, $tag:literal)),* $(,)?) => {
        $(
            #[doc = concat!("The `", $tag, "` key with a date argument.")]
            #[must_use]
            pub fn $fn_name(date: SearchDate) -> Self {
                let mut key = Self::atom($tag);
                key.tokens.push(date.to_string().into_bytes());
                key
            }
        )*
    };
}

impl SearchKey {
    fn atom(tag: &str) -> Self {
        Self {
            tokens: vec![tag.as_bytes().to_vec()],
        }
    }

    /// Returns the wire tokens in order.
    #[must_use]
    pub fn tokens(&self) -> &[Vec<u8>] {
        &self.tokens
    }

    bare_keys![
        (all, "ALL"),
        (answered, "ANSWERED"),
        (deleted, "DELETED"),
        (draft, "DRAFT"),
        (flagged, "FLAGGED"),
        (new, "NEW"),
        (old, "OLD"),
        (recent, "RECENT"),
        (seen, "SEEN"),
        (unanswered, "UNANSWERED"),
        (undeleted, "UNDELETED"),
        (undraft, "UNDRAFT"),
        (unflagged, "UNFLAGGED"),
        (unseen, "UNSEEN"),
    ];

    string_keys![
        (bcc, "BCC"),
        (body, "BODY"),
        (cc, "CC"),
        (from, "FROM"),
        (keyword, "KEYWORD"),
        (subject, "SUBJECT"),
        (text, "TEXT"),
        (to, "TO"),
        (unkeyword, "UNKEYWORD"),
    ];

    date_keys![
        (before, "BEFORE"),
        (on, "ON"),
        (since, "SINCE"),
        (sent_before, "SENTBEFORE"),
        (sent_on, "SENTON"),
        (sent_since, "SENTSINCE"),
    ];

    /// The `HEADER` key: messages with `value` in the named header field.
    #[must_use]
    pub fn header(name: &str, value: &str) -> Self {
        let mut key = Self::atom("HEADER");
        key.tokens.push(astring_bytes(name.as_bytes()));
        key.tokens.push(astring_bytes(value.as_bytes()));
        key
    }

    /// The `LARGER` key: messages larger than `size` octets.
    #[must_use]
    pub fn larger(size: u32) -> Self {
        let mut key = Self::atom("LARGER");
        key.tokens.push(size.to_string().into_bytes());
        key
    }

    /// The `SMALLER` key: messages smaller than `size` octets.
    #[must_use]
    pub fn smaller(size: u32) -> Self {
        let mut key = Self::atom("SMALLER");
        key.tokens.push(size.to_string().into_bytes());
        key
    }

    /// The `NOT` key: messages not matching `key`.
    #[must_use]
    pub fn not(key: Self) -> Self {
        let mut out = Self::atom("NOT");
        out.tokens.extend(key.tokens);
        out
    }

    /// The `OR` key: messages matching either argument.
    #[must_use]
    pub fn or(first: Self, second: Self) -> Self {
        let mut out = Self::atom("OR");
        out.tokens.extend(first.tokens);
        out.tokens.extend(second.tokens);
        out
    }

    /// A parenthesized key list, matched as a conjunction.
    #[must_use]
    pub fn list(keys: impl IntoIterator<Item = Self>) -> Self {
        let mut out = Self::atom("(");
        for key in keys {
            out.tokens.extend(key.tokens);
        }
        out.tokens.push(b")".to_vec());
        out
    }

    /// Appends another key, forming a conjunction.
    pub fn push(&mut self, key: Self) {
        self.tokens.extend(key.tokens);
    }

    /// Parses the surface syntax into a key.
    ///
    /// Tags are case-insensitive and whitespace-separated. String
    /// arguments may be double-quoted with backslash escapes for `"`
    /// and `\`. Dates are ISO `YYYY-MM-DD`, re-emitted in the IMAP
    /// form. Empty input means `ALL`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownSearchKey`] for an unrecognized tag,
    /// [`Error::InvalidSearchArgument`] for a malformed argument.
    pub fn parse(input: &str) -> Result<Self> {
        let mut rest = input.trim();
        if rest.is_empty() {
            return Ok(Self::all());
        }

        let mut key = Self::default();
        while !rest.is_empty() {
            let (parsed, remainder) = Self::parse_one(rest)?;
            key.push(parsed);
            rest = remainder.trim_start();
        }
        Ok(key)
    }

    /// Parses a single key (tag plus its arguments) from the input.
    fn parse_one(input: &str) -> Result<(Self, &str)> {
        let (tag, mut rest) = split_token(input.trim_start());
        let tag = tag.to_uppercase();

        let specs: &[ArgSpec] = match tag.as_str() {
            "ALL" | "ANSWERED" | "DELETED" | "DRAFT" | "FLAGGED" | "NEW" | "OLD" | "RECENT"
            | "SEEN" | "UNANSWERED" | "UNDELETED" | "UNDRAFT" | "UNFLAGGED" | "UNSEEN" => &[],
            "BCC" | "BODY" | "CC" | "FROM" | "KEYWORD" | "SUBJECT" | "TEXT" | "TO"
            | "UNKEYWORD" => &[ArgSpec::Str],
            "BEFORE" | "ON" | "SINCE" | "SENTBEFORE" | "SENTON" | "SENTSINCE" => &[ArgSpec::Date],
            "LARGER" | "SMALLER" => &[ArgSpec::Size],
            "HEADER" => &[ArgSpec::Str, ArgSpec::Str],
            "NOT" => &[ArgSpec::Key],
            "OR" => &[ArgSpec::Key, ArgSpec::Key],
            _ => return Err(Error::UnknownSearchKey(tag)),
        };

        let mut key = Self::atom(&tag);
        for spec in specs {
            rest = rest.trim_start();
            if rest.is_empty() {
                return Err(Error::InvalidSearchArgument {
                    key: tag,
                    message: "missing argument".to_string(),
                });
            }
            match spec {
                ArgSpec::Str => {
                    let (value, remainder) = parse_string_argument(rest, &tag)?;
                    key.tokens.push(astring_bytes(value.as_bytes()));
                    rest = remainder;
                }
                ArgSpec::Date => {
                    let (token, remainder) = split_token(rest);
                    let date = SearchDate::from_iso(token).map_err(|_| {
                        Error::InvalidSearchArgument {
                            key: tag.clone(),
                            message: format!("invalid date {token:?}"),
                        }
                    })?;
                    key.tokens.push(date.to_string().into_bytes());
                    rest = remainder;
                }
                ArgSpec::Size => {
                    let (token, remainder) = split_token(rest);
                    let size: u32 =
                        token
                            .parse()
                            .map_err(|_| Error::InvalidSearchArgument {
                                key: tag.clone(),
                                message: format!("invalid size {token:?}"),
                            })?;
                    key.tokens.push(size.to_string().into_bytes());
                    rest = remainder;
                }
                ArgSpec::Key => {
                    let (sub, remainder) = Self::parse_one(rest)?;
                    key.push(sub);
                    rest = remainder;
                }
            }
        }

        Ok((key, rest))
    }
}

impl std::fmt::Display for SearchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&String::from_utf8_lossy(token))?;
        }
        Ok(())
    }
}

/// Expected argument form for a SEARCH key tag.
enum ArgSpec {
    Str,
    Date,
    Size,
    Key,
}

/// Splits the leading whitespace-delimited token from the input.
fn split_token(input: &str) -> (&str, &str) {
    match input.find(|c: char| c == ' ' || c == '\t') {
        Some(idx) => (&input[..idx], &input[idx + 1..]),
        None => (input, ""),
    }
}

/// Parses a string argument: a bare token, or a double-quoted string
/// with backslash escapes for `"` and `\`.
fn parse_string_argument<'a>(input: &'a str, key: &str) -> Result<(String, &'a str)> {
    let bytes = input.as_bytes();
    if bytes[0] != b'"' {
        let (token, rest) = split_token(input);
        return Ok((token.to_string(), rest));
    }

    let mut value = String::new();
    let mut idx = 1;
    loop {
        match bytes.get(idx) {
            None => {
                return Err(Error::InvalidSearchArgument {
                    key: key.to_string(),
                    message: "truncated quoted string".to_string(),
                });
            }
            Some(b'"') => {
                idx += 1;
                break;
            }
            Some(b'\\') => match bytes.get(idx + 1) {
                Some(&(escaped @ (b'"' | b'\\'))) => {
                    value.push(escaped as char);
                    idx += 2;
                }
                _ => {
                    return Err(Error::InvalidSearchArgument {
                        key: key.to_string(),
                        message: "invalid quoted character".to_string(),
                    });
                }
            },
            Some(&b) => {
                value.push(b as char);
                idx += 1;
            }
        }
    }

    Ok((value, &input[idx..]))
}
