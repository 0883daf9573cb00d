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

//! A small error type for failures that terminate the server loop or abort
//! startup, as opposed to per-instruction execution failures (those are
//! surfaced as well-known-token [`crate::engine::entity::Entity`] values and
//! never become a Rust error — see `engine::processor`).

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    Codec(String),
    Io(io::Error),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(msg) => write!(f, "{msg}"),
            Self::Io(e) => write!(f, "{e}"),
            Self::Config(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type SlimResult<T> = Result<T, Error>;

/// Adds a contextual prefix to an error, mirroring the teacher's
/// `ErrorContext` extension trait on `Result`.
pub trait ErrorContext<T> {
    fn context(self, msg: impl Into<String>) -> SlimResult<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> SlimResult<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Config(format!("{}: {inner}", msg.into()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_prefixes_message() {
        let r: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::Other, "boom"));
        let e = r.context("reading config").unwrap_err();
        assert_eq!(e.to_string(), "reading config: boom");
    }
}
