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

//! Named storage for string or object values, referenced from instruction
//! arguments as `$Name`.

use super::objtable::ObjectRef;
use std::collections::HashMap;

#[derive(Clone)]
pub enum Symbol {
    Str(String),
    Object(ObjectRef),
}

#[derive(Default)]
pub struct SymbolTable {
    values: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn set(&mut self, name: &str, value: Symbol) -> Result<(), String> {
        if !Self::is_valid_name(name) {
            return Err(format!("Invalid symbol name: {name}"));
        }
        self.values.insert(name.to_owned(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.values.get(name)
    }

    /// Textual substitution of every `$Name` occurrence in `source`. A
    /// reference to an object symbol is rendered via its serialized
    /// (`ToString`) form; an unknown or malformed `$name` is left verbatim.
    pub fn substitute(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        let bytes = source.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                if let Some((name, end)) = scan_symbol_name(&source[i + 1..]) {
                    match self.values.get(name) {
                        Some(Symbol::Str(s)) => {
                            out.push_str(s);
                            i += 1 + end;
                            continue;
                        }
                        Some(Symbol::Object(obj)) => {
                            out.push_str(&obj.lock().serialize());
                            i += 1 + end;
                            continue;
                        }
                        None => {
                            out.push('$');
                            out.push_str(name);
                            i += 1 + end;
                            continue;
                        }
                    }
                }
            }
            // push one char (not necessarily one byte) at position i
            let ch = source[i..].chars().next().unwrap();
            out.push(ch);
            i += ch.len_utf8();
        }
        out
    }
}

/// Scans a valid `[A-Za-z][A-Za-z0-9_]*` symbol name starting at `rest`,
/// returning the name and how many bytes of `rest` it consumed.
fn scan_symbol_name(rest: &str) -> Option<(&str, usize)> {
    let mut chars = rest.char_indices();
    let (_, first) = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    let mut end = first.len_utf8();
    for (idx, c) in chars {
        if c.is_ascii_alphanumeric() || c == '_' {
            end = idx + c.len_utf8();
        } else {
            break;
        }
    }
    Some((&rest[..end], end))
}
