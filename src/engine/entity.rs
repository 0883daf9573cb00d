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

//! The recursive string-or-list value that flows over the wire in both
//! directions. Every SLIM request and response is an [`Entity`].

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Str(String),
    List(Vec<Entity>),
}

impl Entity {
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    pub fn list(items: impl IntoIterator<Item = Entity>) -> Self {
        Self::List(items.into_iter().collect())
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::List(_) => None,
        }
    }
    pub fn as_list(&self) -> Option<&[Entity]> {
        match self {
            Self::List(l) => Some(l),
            Self::Str(_) => None,
        }
    }
    pub fn into_list(self) -> Option<Vec<Entity>> {
        match self {
            Self::List(l) => Some(l),
            Self::Str(_) => None,
        }
    }
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl From<String> for Entity {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for Entity {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<Vec<Entity>> for Entity {
    fn from(v: Vec<Entity>) -> Self {
        Self::List(v)
    }
}

/// Debug-ish textual rendering used when an [`Entity`] needs to be embedded in an
/// error message (e.g. `MALFORMED_INSTRUCTION <x>`), not the wire serialization.
impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}
