/*
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! The SLIM wire codec: framing and unframing of [`Entity`] values over a
//! byte stream. [`decode_frame`] is pull-based — it never blocks and never
//! consumes a partial frame, so a connection handler can feed it whatever a
//! socket read happened to return and call it again once more bytes arrive.

use super::entity::Entity;
use super::mem::BufferedScanner;
use std::fmt;

/// Longest a `NNNNNN:` length header is allowed to run before we give up
/// waiting for its terminating colon and call it malformed. Six digits is
/// the normal width; this leaves generous room for longer ones.
const MAX_HEADER_BYTES: usize = 32;

#[derive(Debug, PartialEq, Eq)]
pub enum CodecError {
    BadLength(String),
    ExpectedByte { expected: char, found: char },
    UnexpectedEof,
    InvalidUtf8,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLength(s) => write!(f, "readLength: Could not interpret length '{s}'"),
            Self::ExpectedByte { expected, found } => {
                write!(f, "skipByte: Expected '{expected}' but found '{found}'")
            }
            Self::UnexpectedEof => write!(f, "readExactBytes: Expected more bytes than were available"),
            Self::InvalidUtf8 => write!(f, "readExactBytes: Payload was not valid UTF-8"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Attempts to decode one framed [`Entity`] from the front of `buf`.
///
/// Returns `Ok(None)` when `buf` does not yet hold a complete frame (the
/// caller should read more bytes and retry); `Ok(Some((entity, consumed)))`
/// on success, where `consumed` is the number of leading bytes of `buf` the
/// frame occupied.
pub fn decode_frame(buf: &[u8]) -> Result<Option<(Entity, usize)>, CodecError> {
    let limit = buf.len().min(MAX_HEADER_BYTES);
    let colon = buf[..limit].iter().position(|&b| b == b':');
    let colon = match colon {
        Some(p) => p,
        None if buf.len() < MAX_HEADER_BYTES => return Ok(None),
        None => return Err(CodecError::BadLength(lossy(&buf[..limit]))),
    };
    let digits = &buf[..colon];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(CodecError::BadLength(lossy(digits)));
    }
    let len: usize = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CodecError::BadLength(lossy(digits)))?;
    let header_len = colon + 1;
    if buf.len() < header_len + len {
        return Ok(None);
    }
    let payload = &buf[header_len..header_len + len];
    let entity = parse_payload(payload)?;
    Ok(Some((entity, header_len + len)))
}

fn lossy(b: &[u8]) -> String {
    String::from_utf8_lossy(b).into_owned()
}

/// Interprets a fully-buffered payload slice (the bytes inside a frame's
/// length header) as either a list's bracketed body or a plain string leaf.
fn parse_payload(payload: &[u8]) -> Result<Entity, CodecError> {
    match try_parse_list(payload)? {
        Some(entity) => Ok(entity),
        None => {
            let s = std::str::from_utf8(payload).map_err(|_| CodecError::InvalidUtf8)?;
            Ok(Entity::str(s))
        }
    }
}

fn try_parse_list(payload: &[u8]) -> Result<Option<Entity>, CodecError> {
    let mut scanner = BufferedScanner::new(payload);
    if !scanner.expect_byte(b'[') {
        return Ok(None);
    }
    let count = match scanner.next_decimal() {
        Some(n) => n,
        None => return Ok(None),
    };
    if !scanner.expect_byte(b':') {
        return Ok(None);
    }
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(parse_item(&mut scanner)?);
    }
    expect(&mut scanner, b']')?;
    Ok(Some(Entity::list(items)))
}

fn parse_item(scanner: &mut BufferedScanner<'_>) -> Result<Entity, CodecError> {
    let len = scanner
        .next_decimal()
        .ok_or_else(|| CodecError::BadLength(String::new()))?;
    expect(scanner, b':')?;
    let bytes = scanner
        .next_chunk(len as usize)
        .ok_or(CodecError::UnexpectedEof)?;
    let entity = parse_payload(bytes)?;
    expect(scanner, b':')?;
    Ok(entity)
}

fn expect(scanner: &mut BufferedScanner<'_>, byte: u8) -> Result<(), CodecError> {
    let found = scanner.peek();
    if scanner.expect_byte(byte) {
        Ok(())
    } else {
        Err(CodecError::ExpectedByte {
            expected: byte as char,
            found: found.map(|b| b as char).unwrap_or('\0'),
        })
    }
}

/// Serializes an [`Entity`] into its framed wire form. Lists are
/// double-framed: the bracketed body is built first, then re-framed as if
/// it were a string.
pub fn encode_frame(entity: &Entity) -> String {
    match entity {
        Entity::Str(s) => frame_string(s),
        Entity::List(items) => {
            let mut body = String::new();
            body.push('[');
            body.push_str(&format!("{:06}:", items.len()));
            for item in items {
                body.push_str(&encode_frame(item));
                body.push(':');
            }
            body.push(']');
            frame_string(&body)
        }
    }
}

fn frame_string(s: &str) -> String {
    format!("{:06}:{}", s.len(), s)
}
