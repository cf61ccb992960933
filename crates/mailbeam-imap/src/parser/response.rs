//! Server response parser.
//!
//! Reads exactly one complete response from the stream and returns a
//! typed value. The parser holds no state across responses: after each
//! call the stream is positioned at the first byte of the next response.
//!
//! Dispatch is on the first byte of the line: `+` is a continuation,
//! `*` is untagged (with a six-byte peek for `* BYE ` so the only
//! untagged status sent without a data keyword routes to the status
//! path), anything else is a tagged status.

use tokio::io::AsyncRead;

use crate::connection::ByteStream;
use crate::mutf7;
use crate::types::{Capability, Flag, MailboxAttribute, MailboxListing, ResponseCode};
use crate::{Error, Result};

use super::lexer::{parse_number, Lexer};
use super::types::{DataResponse, Response, ResponseText, StatusKind, StatusResponse};

/// Reads one complete server response.
///
/// # Errors
///
/// [`Error::UnknownResponse`] is recoverable: the offending line has been
/// consumed and the caller may keep reading. All other errors leave the
/// stream in an indeterminate position and poison the connection.
pub async fn read_response<S>(stream: &mut ByteStream<S>) -> Result<Response>
where
    S: AsyncRead + Unpin,
{
    match stream.peek(1).await?[0] {
        b'+' => read_continuation(stream).await,
        b'*' => {
            // `* BYE ` is the only untagged status that must be routed to
            // the status path before the data keyword is known.
            if stream.starts_with(b"* BYE ").await? {
                read_status(stream).await
            } else {
                read_data(stream).await
            }
        }
        _ => read_status(stream).await,
    }
}

/// Reads a continuation request: `+ text CRLF`.
async fn read_continuation<S>(stream: &mut ByteStream<S>) -> Result<Response>
where
    S: AsyncRead + Unpin,
{
    stream.skip(1).await?;
    stream.skip_byte(b' ').await?;
    let text = stream.read_until_and_skip(b"\r\n").await?;
    Ok(Response::Continuation {
        text: String::from_utf8_lossy(&text).into_owned(),
    })
}

/// Reads a status response: tag SP name SP resp-text CRLF.
///
/// Handles both tagged statuses and the untagged `* BYE` form, where the
/// "tag" is the `*` indicator.
async fn read_status<S>(stream: &mut ByteStream<S>) -> Result<Response>
where
    S: AsyncRead + Unpin,
{
    let tag_bytes = stream.read_until_and_skip(b" ").await?;
    let tag_text = String::from_utf8_lossy(&tag_bytes).into_owned();
    let tag = if tag_text == "*" { None } else { Some(tag_text) };

    let name_bytes = stream.read_while(|b| b.is_ascii_uppercase()).await?;
    let name = String::from_utf8_lossy(&name_bytes).into_owned();
    let kind = match name.as_str() {
        "OK" => StatusKind::Ok,
        "NO" => StatusKind::No,
        "BAD" => StatusKind::Bad,
        "BYE" => StatusKind::Bye,
        "PREAUTH" => StatusKind::PreAuth,
        _ => {
            stream.read_until_and_skip(b"\r\n").await?;
            return Err(Error::UnknownResponse(name));
        }
    };

    stream.skip_byte(b' ').await?;
    let text = read_response_text(stream).await?;

    Ok(Response::Status(StatusResponse { tag, kind, text }))
}

/// Reads an untagged data response: `* ` keyword-or-count payload CRLF.
async fn read_data<S>(stream: &mut ByteStream<S>) -> Result<Response>
where
    S: AsyncRead + Unpin,
{
    stream.skip(2).await?;

    let run = stream
        .read_while(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        .await?;
    let token = String::from_utf8_lossy(&run).into_owned();

    if !run.is_empty() && run.iter().all(u8::is_ascii_digit) {
        return read_counted_data(stream, &run).await;
    }

    match token.as_str() {
        // Untagged status conditions travel the data path once the
        // keyword is known; `* BYE ` was already routed before us.
        "OK" | "NO" | "BAD" | "PREAUTH" | "BYE" => {
            let kind = match token.as_str() {
                "OK" => StatusKind::Ok,
                "NO" => StatusKind::No,
                "BAD" => StatusKind::Bad,
                "BYE" => StatusKind::Bye,
                _ => StatusKind::PreAuth,
            };
            stream.skip_byte(b' ').await?;
            let text = read_response_text(stream).await?;
            Ok(Response::Status(StatusResponse {
                tag: None,
                kind,
                text,
            }))
        }
        "CAPABILITY" => {
            let rest = stream.read_until_and_skip(b"\r\n").await?;
            Ok(Response::Data(DataResponse::Capability(parse_capabilities(
                &rest,
            ))))
        }
        "LIST" => {
            let listing = read_listing(stream).await?;
            Ok(Response::Data(DataResponse::List(listing)))
        }
        "LSUB" => {
            let listing = read_listing(stream).await?;
            Ok(Response::Data(DataResponse::LSub(listing)))
        }
        "FLAGS" => {
            if !stream.skip_byte(b' ').await? {
                return Err(parse_error(stream, "missing space after FLAGS"));
            }
            let mut lexer = Lexer::new(stream);
            let atoms = lexer.read_flag_list().await?;
            lexer.expect_crlf().await?;
            let flags = atoms.iter().map(|atom| Flag::parse(atom)).collect();
            Ok(Response::Data(DataResponse::Flags(flags)))
        }
        "SEARCH" => {
            let numbers = read_search_numbers(stream).await?;
            Ok(Response::Data(DataResponse::Search(numbers)))
        }
        _ => {
            stream.read_until_and_skip(b"\r\n").await?;
            Err(Error::UnknownResponse(token))
        }
    }
}

/// Reads `EXISTS`/`RECENT` data where the leading run was a count.
async fn read_counted_data<S>(stream: &mut ByteStream<S>, digits: &[u8]) -> Result<Response>
where
    S: AsyncRead + Unpin,
{
    let count = parse_number(digits).map_err(|message| parse_error(stream, message))?;

    if !stream.skip_byte(b' ').await? {
        return Err(parse_error(stream, "missing space after message count"));
    }

    let keyword_bytes = stream.read_while(|b| b.is_ascii_uppercase()).await?;
    let keyword = String::from_utf8_lossy(&keyword_bytes).into_owned();

    let data = match keyword.as_str() {
        "EXISTS" => DataResponse::Exists(count),
        "RECENT" => DataResponse::Recent(count),
        _ => {
            stream.read_until_and_skip(b"\r\n").await?;
            return Err(Error::UnknownResponse(keyword));
        }
    };

    if !stream.skip_bytes(b"\r\n").await? {
        return Err(parse_error(stream, "expected CRLF after message count data"));
    }
    Ok(Response::Data(data))
}

/// Reads a LIST/LSUB body and decodes the mailbox name.
async fn read_listing<S>(stream: &mut ByteStream<S>) -> Result<MailboxListing>
where
    S: AsyncRead + Unpin,
{
    if !stream.skip_byte(b' ').await? {
        return Err(parse_error(stream, "missing space after LIST keyword"));
    }

    let mut lexer = Lexer::new(stream);
    let (attributes, delimiter, raw_name) = lexer.read_mailbox_list().await?;
    lexer.expect_crlf().await?;

    let encoded = String::from_utf8(raw_name)
        .map_err(|err| Error::MalformedMailboxName(String::from_utf8_lossy(err.as_bytes()).into_owned()))?;
    let name = mutf7::decode(&encoded).map_err(|_| Error::MalformedMailboxName(encoded))?;

    Ok(MailboxListing {
        attributes: attributes
            .iter()
            .map(|atom| MailboxAttribute::parse(atom))
            .collect(),
        delimiter,
        name,
    })
}

/// Reads the number list of a SEARCH response.
async fn read_search_numbers<S>(stream: &mut ByteStream<S>) -> Result<Vec<u32>>
where
    S: AsyncRead + Unpin,
{
    let mut numbers = Vec::new();
    while stream.skip_byte(b' ').await? {
        let mut lexer = Lexer::new(stream);
        numbers.push(lexer.read_number().await?);
    }
    if !stream.skip_bytes(b"\r\n").await? {
        return Err(parse_error(stream, "expected CRLF after SEARCH data"));
    }
    Ok(numbers)
}

/// Reads resp-text: optional `[code]` then free text through CRLF.
///
/// A malformed code payload is reported only after the whole line has
/// been consumed, so the stream stays aligned on the next response and
/// the error can be attributed to the enclosing command.
async fn read_response_text<S>(stream: &mut ByteStream<S>) -> Result<ResponseText>
where
    S: AsyncRead + Unpin,
{
    let code = if stream.skip_byte(b'[').await? {
        let content = stream.read_until_and_skip(b"]").await?;
        stream.skip_byte(b' ').await?;
        Some(parse_response_code(&content))
    } else {
        None
    };

    let text = stream.read_until_and_skip(b"\r\n").await?;
    let code = code.transpose()?;
    Ok(ResponseText {
        code,
        text: String::from_utf8_lossy(&text).into_owned(),
    })
}

/// Re-parses the bracketed code content into a typed value.
fn parse_response_code(content: &[u8]) -> Result<ResponseCode> {
    let (name_bytes, data) = match content.iter().position(|&b| b == b' ') {
        Some(idx) => (&content[..idx], &content[idx + 1..]),
        None => (content, &content[content.len()..]),
    };
    let name = String::from_utf8_lossy(name_bytes).into_owned();

    let code = match name.as_str() {
        "ALERT" => ResponseCode::Alert,
        "PARSE" => ResponseCode::Parse,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "TRYCREATE" => ResponseCode::TryCreate,
        "CAPABILITY" => ResponseCode::Capability(parse_capabilities(data)),
        "PERMANENTFLAGS" => {
            if data.len() < 2 || data[0] != b'(' || data[data.len() - 1] != b')' {
                return Err(Error::MalformedResponseCode(name));
            }
            let inner = &data[1..data.len() - 1];
            let flags = inner
                .split(|&b| b == b' ')
                .filter(|atom| !atom.is_empty())
                .map(|atom| Flag::parse(&String::from_utf8_lossy(atom)))
                .collect();
            ResponseCode::PermanentFlags(flags)
        }
        "UIDNEXT" | "UIDVALIDITY" | "UNSEEN" | "HIGHESTMODSEQ" => {
            let value = parse_number(data).map_err(|_| Error::MalformedResponseCode(name.clone()))?;
            if value == 0 {
                return Err(Error::MalformedResponseCode(name));
            }
            match name.as_str() {
                "UIDNEXT" => ResponseCode::UidNext(value),
                "UIDVALIDITY" => ResponseCode::UidValidity(value),
                "UNSEEN" => ResponseCode::Unseen(value),
                _ => ResponseCode::HighestModSeq(value),
            }
        }
        _ => ResponseCode::Other {
            name,
            data: data.to_vec(),
        },
    };

    Ok(code)
}

/// Splits a capability payload into typed tokens.
fn parse_capabilities(data: &[u8]) -> Vec<Capability> {
    data.split(|&b| b == b' ')
        .filter(|token| !token.is_empty())
        .map(|token| Capability::parse(&String::from_utf8_lossy(token)))
        .collect()
}

fn parse_error<S>(stream: &ByteStream<S>, message: impl Into<String>) -> Error {
    Error::Parse {
        position: stream.offset(),
        message: message.into(),
    }
}
