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

//! Rust has no runtime reflection, so coercion and result marshalling work
//! off a small tagged-variant value ([`Arg`]) and a coercion recipe
//! ([`ParamType`]) that fixture authors attach to each declared parameter,
//! instead of inspecting a method's real parameter types at call time.

use super::objtable::ObjectRef;
use super::symtable::{Symbol, SymbolTable};
use std::fmt;

#[derive(Clone)]
pub enum Arg {
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    List(Vec<Arg>),
    Map(Vec<(Arg, Arg)>),
    Object(ObjectRef),
    Void,
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::I64(i) => write!(f, "I64({i})"),
            Self::U64(u) => write!(f, "U64({u})"),
            Self::F64(x) => write!(f, "F64({x})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::List(l) => write!(f, "List({l:?})"),
            Self::Map(m) => write!(f, "Map(len={})", m.len()),
            Self::Object(_) => write!(f, "Object(..)"),
            Self::Void => write!(f, "Void"),
        }
    }
}

impl Arg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// A coercion recipe for a declared parameter (or field, or constructor
/// argument) type, standing in for Go's `reflect.Type` in the original.
#[derive(Clone)]
pub enum ParamType {
    Bool,
    I64,
    U64,
    F64,
    Str,
    ListOf(Box<ParamType>),
    MapOf(Box<ParamType>, Box<ParamType>),
    /// Open / interface type: infer int64 -> uint64 -> float64 -> bool -> string.
    Any,
    /// A user-defined object type whose `Parse(&str)` stands in for Go's
    /// reflection-driven `Parse` method lookup; the fixture author supplies
    /// it directly since there is no runtime type registry to search.
    Custom(fn(&str) -> Result<Arg, String>),
}

/// Coerces one raw instruction-list string into a declared parameter type,
/// applying symbol substitution first. Mirrors `parser.parse` in structure:
/// predefined scalar types substitute symbols textually before parsing;
/// everything else first checks whether the whole argument is a bare
/// `$Name` reference to a non-string (object) symbol, using that value by
/// identity when found.
pub fn coerce(raw: &str, ty: &ParamType, symbols: &SymbolTable) -> Result<Arg, String> {
    match ty {
        ParamType::Bool | ParamType::I64 | ParamType::U64 | ParamType::F64 | ParamType::Str => {
            let resolved = symbols.substitute(raw);
            parse_predefined(&resolved, ty)
        }
        ParamType::Any => {
            if let Some(name) = whole_symbol_ref(raw) {
                if let Some(Symbol::Object(obj)) = symbols.get(name) {
                    return Ok(Arg::Object(obj.clone()));
                }
            }
            let resolved = symbols.substitute(raw);
            Ok(infer(&resolved))
        }
        ParamType::ListOf(_) | ParamType::MapOf(_, _) | ParamType::Custom(_) => {
            if let Some(name) = whole_symbol_ref(raw) {
                if let Some(Symbol::Object(obj)) = symbols.get(name) {
                    // Non-predefined target; an object symbol is used by identity
                    // regardless of assignment-compatibility checks we have no
                    // static means to express here.
                    return Ok(Arg::Object(obj.clone()));
                }
            }
            let resolved = symbols.substitute(raw);
            match ty {
                ParamType::ListOf(elem) => parse_list(&resolved, elem, symbols),
                ParamType::MapOf(k, v) => parse_map(&resolved, k, v, symbols),
                ParamType::Custom(parse_fn) => parse_fn(&resolved),
                _ => unreachable!(),
            }
        }
    }
}

fn whole_symbol_ref(raw: &str) -> Option<&str> {
    let name = raw.strip_prefix('$')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic()) {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(name)
}

fn parse_predefined(input: &str, ty: &ParamType) -> Result<Arg, String> {
    let type_name = |t: &ParamType| match t {
        ParamType::Bool => "bool",
        ParamType::I64 => "int",
        ParamType::U64 => "uint",
        ParamType::F64 => "float",
        ParamType::Str => "string",
        _ => "?",
    };
    match ty {
        ParamType::Bool => parse_bool_literal(input)
            .map(Arg::Bool)
            .ok_or_else(|| format!("Could not convert '{input}' to type '{}'", type_name(ty))),
        ParamType::I64 => parse_int_literal(input)
            .map(Arg::I64)
            .ok_or_else(|| format!("Could not convert '{input}' to type '{}'", type_name(ty))),
        ParamType::U64 => parse_uint_literal(input)
            .map(Arg::U64)
            .ok_or_else(|| format!("Could not convert '{input}' to type '{}'", type_name(ty))),
        ParamType::F64 => input
            .parse::<f64>()
            .map(Arg::F64)
            .map_err(|_| format!("Could not convert '{input}' to type '{}'", type_name(ty))),
        ParamType::Str => Ok(Arg::Str(input.to_owned())),
        _ => unreachable!(),
    }
}

fn parse_bool_literal(input: &str) -> Option<bool> {
    match input.to_ascii_lowercase().as_str() {
        "true" | "1" | "t" => Some(true),
        "false" | "0" | "f" => Some(false),
        _ => None,
    }
}

fn parse_int_literal(input: &str) -> Option<i64> {
    if let Some(rest) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        return i64::from_str_radix(rest, 16).ok();
    }
    if let Some(rest) = input.strip_prefix("0o").or_else(|| input.strip_prefix("0O")) {
        return i64::from_str_radix(rest, 8).ok();
    }
    if let Some(rest) = input.strip_prefix("0b").or_else(|| input.strip_prefix("0B")) {
        return i64::from_str_radix(rest, 2).ok();
    }
    input.parse().ok()
}

fn parse_uint_literal(input: &str) -> Option<u64> {
    if let Some(rest) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        return u64::from_str_radix(rest, 16).ok();
    }
    if let Some(rest) = input.strip_prefix("0o").or_else(|| input.strip_prefix("0O")) {
        return u64::from_str_radix(rest, 8).ok();
    }
    if let Some(rest) = input.strip_prefix("0b").or_else(|| input.strip_prefix("0B")) {
        return u64::from_str_radix(rest, 2).ok();
    }
    input.parse().ok()
}

fn infer(input: &str) -> Arg {
    if let Some(i) = parse_int_literal(input) {
        return Arg::I64(i);
    }
    if let Some(u) = parse_uint_literal(input) {
        return Arg::U64(u);
    }
    if let Ok(f) = input.parse::<f64>() {
        return Arg::F64(f);
    }
    if let Some(b) = parse_bool_literal(input) {
        return Arg::Bool(b);
    }
    Arg::Str(input.to_owned())
}

/// Parses a bracketed, comma-space-separated list: `[a, b, c]`, with
/// support for nested `[...]` when `elem` is itself a `ListOf`.
fn parse_list(input: &str, elem: &ParamType, symbols: &SymbolTable) -> Result<Arg, String> {
    let trimmed = input.trim();
    let Some(body) = trimmed.strip_prefix('[') else {
        return Err(format!("'{input}' is not an array"));
    };
    let (inner, rest) = matching_close_bracket(body)?;
    if !rest.trim().is_empty() {
        return Err(format!("'{input}' is not an array"));
    }
    let mut items = Vec::new();
    let mut remainder = inner;
    loop {
        let piece = remainder.trim_start();
        if piece.is_empty() {
            break;
        }
        if let Some(nested_body) = piece.strip_prefix('[') {
            let (nested_inner, after) = matching_close_bracket(nested_body)?;
            let nested = parse_list(&format!("[{nested_inner}]"), elem, symbols)?;
            items.push(nested);
            remainder = split_on_comma(after).1;
        } else {
            let (entry, after) = split_on_comma(piece);
            let value = coerce(entry, elem, symbols)
                .map_err(|_| format!("Can't parse '{entry}' as element for slice"))?;
            items.push(value);
            remainder = after;
        }
    }
    Ok(Arg::List(items))
}

fn matching_close_bracket(input: &str) -> Result<(&str, &str), String> {
    let mut nesting = 0i32;
    for (i, ch) in input.char_indices() {
        match ch {
            ']' if nesting == 0 => return Ok((&input[..i], &input[i + 1..])),
            ']' => nesting -= 1,
            '[' => nesting += 1,
            _ => {}
        }
    }
    Err(format!("Could not find matching ']' in '[{input}'"))
}

fn split_on_comma(input: &str) -> (&str, &str) {
    match input.find(", ") {
        Some(pos) => (&input[..pos], &input[pos + 2..]),
        None => (input, ""),
    }
}

/// Parses the HTML hash-table fragment SLIM uses for maps:
/// `<table>...<tr><td>k</td><td>v</td></tr>...</table>`.
fn parse_map(input: &str, key_ty: &ParamType, val_ty: &ParamType, symbols: &SymbolTable) -> Result<Arg, String> {
    let rows = parse_html_table(input)
        .map_err(|_| format!("'{input}' is not a valid specification for a map"))?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() != 2 {
            return Err(format!("row '{row:?}' in hash does not have two cells"));
        }
        let key = coerce(&row[0], key_ty, symbols)
            .map_err(|_| format!("Could not parse key '{}' in hash", row[0]))?;
        let value = coerce(&row[1], val_ty, symbols)
            .map_err(|_| format!("Could not parse value '{}' in hash", row[1]))?;
        out.push((key, value));
    }
    Ok(Arg::Map(out))
}

/// A deliberately small HTML-table cell scanner: enough to pull `<td>...</td>`
/// text out of `<tr>` rows the way the reference implementation's tokenizer
/// does, without pulling in a full HTML parser for one wire format.
fn parse_html_table(input: &str) -> Result<Vec<Vec<String>>, String> {
    let trimmed = input.trim();
    if !trimmed.starts_with("<table") {
        return Err("not a table".to_owned());
    }
    let mut rows = Vec::new();
    let mut rest = trimmed;
    while let Some(row_start) = rest.find("<tr") {
        let after_open = &rest[row_start..];
        let Some(row_body_start) = after_open.find('>') else {
            break;
        };
        let Some(row_end) = after_open.find("</tr>") else {
            break;
        };
        let row_body = &after_open[row_body_start + 1..row_end];
        let mut cells = Vec::new();
        let mut cell_rest = row_body;
        while let Some(td_start) = cell_rest.find("<td") {
            let after = &cell_rest[td_start..];
            let Some(body_start) = after.find('>') else {
                break;
            };
            let Some(td_end) = after.find("</td>") else {
                break;
            };
            cells.push(after[body_start + 1..td_end].trim().to_owned());
            cell_rest = &after[td_end + 5..];
        }
        if !cells.is_empty() {
            rows.push(cells);
        }
        rest = &after_open[row_end + 5..];
    }
    Ok(rows)
}

/// Coerces a full argument-list against a method/constructor's declared
/// parameter types, honoring a trailing variadic slot the way
/// `matchParamType` does.
pub fn coerce_args(
    raw_args: &[String],
    params: &[ParamType],
    variadic: bool,
    symbols: &SymbolTable,
) -> Result<Vec<Arg>, String> {
    let count_ok = if variadic {
        raw_args.len() + 1 >= params.len()
    } else {
        raw_args.len() == params.len()
    };
    if !count_ok {
        return Err(format!(
            "Expected {} parameter(s) but got {}",
            params.len(),
            raw_args.len()
        ));
    }
    let mut out = Vec::with_capacity(raw_args.len());
    for (i, raw) in raw_args.iter().enumerate() {
        let ty = if variadic && i >= params.len() - 1 {
            params.last().unwrap()
        } else {
            &params[i]
        };
        out.push(coerce(raw, ty, symbols)?);
    }
    Ok(out)
}

/// Renders a map result as the SLIM hash-table HTML fragment.
pub fn render_hash_table(pairs: &[(String, String)]) -> String {
    let mut rows = String::new();
    for (k, v) in pairs {
        rows.push_str(&format!(
            "  <tr class=\"hash_row\">\n    <td class=\"hash_key\">{k}</td>\n    <td class=\"hash_value\">{v}</td>\n  </tr>\n"
        ));
    }
    format!("<table class=\"hash_table\">\n{rows}</table>")
}
