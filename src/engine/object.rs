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

//! The Rust-native replacement for the source's runtime reflection: a
//! fixture type implements [`FixtureObject`] and exposes a static table of
//! [`MethodSig`]/[`FieldSig`] descriptors. Member resolution walks that
//! table the way the reference's reflection-driven dispatcher walks a
//! struct's exported methods and fields.

use super::objtable::ObjectRef;
use super::symtable::SymbolTable;
use super::value::{coerce, coerce_args, Arg, ParamType};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// A callable member. `call` downcasts `&mut dyn Any` to the concrete
/// fixture type and invokes the real method; it stands in for a
/// `reflect.Value` method handle.
pub struct MethodSig {
    pub name: &'static str,
    pub params: &'static [ParamType],
    pub variadic: bool,
    pub call: fn(&mut dyn Any, Vec<Arg>) -> Result<Vec<Arg>, String>,
}

pub struct FieldSig {
    pub name: &'static str,
    pub ty: ParamType,
    pub get: fn(&dyn Any) -> Arg,
    pub set: fn(&mut dyn Any, Arg) -> Result<(), String>,
}

pub trait FixtureObject: Any + Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn type_name(&self) -> &'static str;
    fn methods(&self) -> &'static [MethodSig];
    fn fields(&self) -> &'static [FieldSig];
    /// A fresh instance holding a snapshot of this object's current state,
    /// used by the standard library's `pushFixture`/`popFixture`/`cloneSymbol`.
    fn clone_instance(&self) -> ObjectRef;

    /// Reborrows this (statically sized) instance as a trait object; lets
    /// default methods below recurse through [`invoke_member`] without
    /// requiring `Self: Sized` on the trait itself.
    fn as_fixture_object_mut(&mut self) -> &mut dyn FixtureObject;

    /// Renders this object for the wire: its own `ToString` member if it
    /// has one, otherwise its type name.
    fn serialize(&mut self) -> String {
        let symbols = SymbolTable::new();
        let type_name = self.type_name();
        let obj = self.as_fixture_object_mut();
        match invoke_member(obj, "ToString", &[], &symbols) {
            Ok(Marshalled::Str(s)) => s,
            _ => type_name.to_owned(),
        }
    }
}

#[derive(Debug)]
pub enum DispatchError {
    NotFound,
    Panic(String),
}

/// The result of a member dispatch, before any wire serialization: objects
/// are kept by identity rather than flattened to a string immediately, the
/// way the source keeps a `reflect.Value` around until it truly has to
/// cross the wire.
pub enum Marshalled {
    Str(String),
    List(Vec<Marshalled>),
    Object(ObjectRef),
}

pub const VOID_TOKEN: &str = "/__VOID__/";

/// Titlecases the first character; tolerates the camelCase convention FitNesse
/// callers use while requiring exported (capitalized) member names.
fn titlecase_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn alternative_name(name: &str, prefix: &str) -> String {
    if name.len() > prefix.len()
        && name.starts_with(prefix)
        && name[prefix.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase())
    {
        name[prefix.len()..].to_owned()
    } else {
        format!("{prefix}{name}")
    }
}

fn candidate_names(member_name: &str, arg_count: usize) -> Vec<String> {
    let titled = titlecase_first(member_name);
    let mut names = vec![titled.clone()];
    match arg_count {
        0 => names.push(alternative_name(&titled, "Get")),
        1 => names.push(alternative_name(&titled, "Set")),
        _ => {}
    }
    names
}

/// Resolves and invokes `member_name` with `raw_args` (instruction-list
/// argument strings, not yet coerced) on a single instance. Tries methods
/// first, then fields, per the candidate name list.
pub fn invoke_member(
    obj: &mut dyn FixtureObject,
    member_name: &str,
    raw_args: &[String],
    symbols: &SymbolTable,
) -> Result<Marshalled, DispatchError> {
    let names = candidate_names(member_name, raw_args.len());

    for candidate in &names {
        if let Some(sig) = obj.methods().iter().find(|m| m.name == *candidate) {
            return invoke_method(obj, sig, raw_args, symbols);
        }
    }
    for candidate in &names {
        if let Some(sig) = obj.fields().iter().find(|f| f.name == *candidate) {
            return dispatch_field(obj, sig, raw_args, symbols);
        }
    }
    Err(DispatchError::NotFound)
}

fn invoke_method(
    obj: &mut dyn FixtureObject,
    sig: &MethodSig,
    raw_args: &[String],
    symbols: &SymbolTable,
) -> Result<Marshalled, DispatchError> {
    let args = coerce_args(raw_args, sig.params, sig.variadic, symbols)
        .map_err(DispatchError::Panic)?;
    let call = sig.call;
    let any = obj.as_any_mut();
    let result = panic::catch_unwind(AssertUnwindSafe(|| call(any, args)));
    match result {
        Ok(Ok(values)) => Ok(marshal_results(values)),
        Ok(Err(msg)) => Err(DispatchError::Panic(msg)),
        Err(payload) => Err(DispatchError::Panic(panic_message(payload))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

fn dispatch_field(
    obj: &mut dyn FixtureObject,
    sig: &FieldSig,
    raw_args: &[String],
    symbols: &SymbolTable,
) -> Result<Marshalled, DispatchError> {
    match raw_args.len() {
        0 => {
            let value = (sig.get)(obj.as_any());
            Ok(marshal_results(vec![value]))
        }
        1 => {
            let value = coerce(&raw_args[0], &sig.ty, symbols)
                .map_err(|_| DispatchError::Panic(format!("Can't set value for '{}'", sig.name)))?;
            (sig.set)(obj.as_any_mut(), value)
                .map_err(|_| DispatchError::Panic(format!("Can't set value for '{}'", sig.name)))?;
            Ok(Marshalled::Str(VOID_TOKEN.to_owned()))
        }
        _ => Err(DispatchError::NotFound),
    }
}

fn marshal_results(values: Vec<Arg>) -> Marshalled {
    match values.len() {
        0 => Marshalled::Str(VOID_TOKEN.to_owned()),
        1 => marshal_arg(values.into_iter().next().unwrap()),
        _ => Marshalled::List(values.into_iter().map(marshal_arg).collect()),
    }
}

fn marshal_arg(arg: Arg) -> Marshalled {
    match arg {
        Arg::Bool(b) => Marshalled::Str(b.to_string()),
        Arg::I64(i) => Marshalled::Str(i.to_string()),
        Arg::U64(u) => Marshalled::Str(u.to_string()),
        Arg::F64(f) => Marshalled::Str(format_float(f)),
        Arg::Str(s) => Marshalled::Str(s),
        Arg::List(items) => Marshalled::List(items.into_iter().map(marshal_arg).collect()),
        Arg::Map(pairs) => {
            let rendered: Vec<(String, String)> = pairs
                .into_iter()
                .map(|(k, v)| (stringify_scalar(k), stringify_scalar(v)))
                .collect();
            Marshalled::Str(super::value::render_hash_table(&rendered))
        }
        Arg::Object(obj) => Marshalled::Object(obj),
        Arg::Void => Marshalled::Str(VOID_TOKEN.to_owned()),
    }
}

fn stringify_scalar(arg: Arg) -> String {
    match marshal_arg(arg) {
        Marshalled::Str(s) => s,
        _ => String::new(),
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}
