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

//! Blocks the calling thread for a given number of milliseconds, used to
//! exercise the interpreter's instruction timeout. Dispatch runs on a
//! `spawn_blocking` task, so a genuine `std::thread::sleep` here is a
//! faithful stand-in for a long-running fixture call.

use parking_lot::Mutex;
use slimd::engine::object::{FieldSig, FixtureObject, MethodSig};
use slimd::engine::objtable::ObjectRef;
use slimd::engine::registry::ConstructorSig;
use slimd::engine::value::{Arg, ParamType};
use std::any::Any;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct Waiter;

fn wait(_any: &mut dyn Any, mut args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let millis = match args.pop() {
        Some(Arg::I64(n)) if n >= 0 => n as u64,
        Some(Arg::I64(_)) => return Err("Could not convert argument to type 'uint'".to_owned()),
        _ => return Err("Expected 1 parameter(s) but got 0".to_owned()),
    };
    thread::sleep(Duration::from_millis(millis));
    Ok(vec![])
}

static METHODS: &[MethodSig] = &[MethodSig {
    name: "Wait",
    params: &[ParamType::I64],
    variadic: false,
    call: wait,
}];

impl FixtureObject for Waiter {
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
        "Waiter"
    }
    fn methods(&self) -> &'static [MethodSig] {
        METHODS
    }
    fn fields(&self) -> &'static [FieldSig] {
        &[]
    }
    fn clone_instance(&self) -> ObjectRef {
        Arc::new(Mutex::new(Waiter))
    }
}

fn build(_args: Vec<Arg>) -> Result<ObjectRef, String> {
    Ok(Arc::new(Mutex::new(Waiter)))
}

pub fn constructor_sig() -> ConstructorSig {
    ConstructorSig {
        params: &[],
        variadic: false,
        build,
    }
}
