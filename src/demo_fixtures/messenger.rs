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

//! Illustrates both dispatch paths on one fixture: a method pair
//! (`SetMessage`/`Message`) and an exported field (`MessageField`) reached
//! through its `Get`/`Set` accessor prefixes.

use parking_lot::Mutex;
use slimd::engine::object::{FieldSig, FixtureObject, MethodSig};
use slimd::engine::objtable::ObjectRef;
use slimd::engine::registry::ConstructorSig;
use slimd::engine::value::{Arg, ParamType};
use std::any::Any;
use std::sync::Arc;

pub struct Messenger {
    message: String,
    message_field: String,
}

fn set_message(any: &mut dyn Any, mut args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let this = any.downcast_mut::<Messenger>().unwrap();
    match args.pop() {
        Some(Arg::Str(s)) => {
            this.message = s;
            Ok(vec![])
        }
        _ => Err("Could not convert argument to type 'string'".to_owned()),
    }
}

fn message(any: &mut dyn Any, _args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let this = any.downcast_ref::<Messenger>().unwrap();
    Ok(vec![Arg::Str(this.message.clone())])
}

fn get_message_field(any: &dyn Any) -> Arg {
    Arg::Str(any.downcast_ref::<Messenger>().unwrap().message_field.clone())
}

fn set_message_field(any: &mut dyn Any, value: Arg) -> Result<(), String> {
    match value {
        Arg::Str(s) => {
            any.downcast_mut::<Messenger>().unwrap().message_field = s;
            Ok(())
        }
        _ => Err("Can't set value for 'MessageField'".to_owned()),
    }
}

static METHODS: &[MethodSig] = &[
    MethodSig {
        name: "SetMessage",
        params: &[ParamType::Str],
        variadic: false,
        call: set_message,
    },
    MethodSig {
        name: "Message",
        params: &[],
        variadic: false,
        call: message,
    },
];

static FIELDS: &[FieldSig] = &[FieldSig {
    name: "MessageField",
    ty: ParamType::Str,
    get: get_message_field,
    set: set_message_field,
}];

impl FixtureObject for Messenger {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn as_fixture_object_mut(&mut self) -> &mut dyn FixtureObject {
        self
    }
    fn type_name(&self) -> &'static str {
        "Messenger"
    }
    fn methods(&self) -> &'static [MethodSig] {
        METHODS
    }
    fn fields(&self) -> &'static [FieldSig] {
        FIELDS
    }
    fn clone_instance(&self) -> ObjectRef {
        Arc::new(Mutex::new(Messenger {
            message: self.message.clone(),
            message_field: self.message_field.clone(),
        }))
    }
}

fn build(_args: Vec<Arg>) -> Result<ObjectRef, String> {
    Ok(Arc::new(Mutex::new(Messenger {
        message: String::new(),
        message_field: String::new(),
    })))
}

pub fn constructor_sig() -> ConstructorSig {
    ConstructorSig {
        params: &[],
        variadic: false,
        build,
    }
}
