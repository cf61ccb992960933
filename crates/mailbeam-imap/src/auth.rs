//! SASL authentication mechanisms for AUTHENTICATE.
//!
//! PLAIN (RFC 4616) sends the credentials in a single response; CRAM-MD5
//! (RFC 2195) answers a base64 challenge with an HMAC-MD5 digest keyed
//! by the password. Mechanism negotiation prefers challenge-response
//! over plaintext.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use md5::Md5;

use crate::{Error, Result};

type HmacMd5 = Hmac<Md5>;

/// A supported SASL mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mechanism {
    /// CRAM-MD5 (RFC 2195), challenge-response.
    CramMd5,
    /// PLAIN (RFC 4616), single-shot credentials.
    Plain,
}

impl Mechanism {
    /// Mechanisms in preference order, most preferred first.
    pub const PREFERENCE: [Self; 2] = [Self::CramMd5, Self::Plain];

    /// Returns the SASL mechanism name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CramMd5 => "CRAM-MD5",
            Self::Plain => "PLAIN",
        }
    }

    /// Resolves a mechanism from its SASL name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "CRAM-MD5" => Some(Self::CramMd5),
            "PLAIN" => Some(Self::Plain),
            _ => None,
        }
    }

    /// Computes the response line for a server continuation prompt.
    ///
    /// The returned bytes are the base64 payload without the CRLF.
    ///
    /// # Errors
    ///
    /// Fails when a CRAM-MD5 challenge is not valid base64.
    pub fn respond(self, prompt: &str, username: &str, password: &str) -> Result<Vec<u8>> {
        match self {
            Self::Plain => Ok(plain_response(username, password)),
            Self::CramMd5 => cram_md5_response(prompt, username, password),
        }
    }
}

impl std::fmt::Display for Mechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// PLAIN response: base64 of NUL authcid NUL password.
///
/// The prompt is ignored; the server's continuation is an empty go-ahead.
fn plain_response(username: &str, password: &str) -> Vec<u8> {
    let credentials = format!("\0{username}\0{password}");
    BASE64.encode(credentials.as_bytes()).into_bytes()
}

/// CRAM-MD5 response: base64 of `username SP lowercase-hex(HMAC-MD5)`.
///
/// The challenge is the base64-decoded continuation prompt; the HMAC key
/// is the password.
fn cram_md5_response(prompt: &str, username: &str, password: &str) -> Result<Vec<u8>> {
    let challenge = BASE64
        .decode(prompt.trim())
        .map_err(|err| Error::Protocol(format!("cannot decode CRAM-MD5 challenge: {err}")))?;

    let mut mac = HmacMd5::new_from_slice(password.as_bytes()).expect("HMAC accepts any key length");
    mac.update(&challenge);
    let digest = hex::encode(mac.finalize().into_bytes());

    let credentials = format!("{username} {digest}");
    Ok(BASE64.encode(credentials.as_bytes()).into_bytes())
}
