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

//! The built-in `libraryStandard` fixture: `echo`, `getFixture`,
//! `pushFixture`, `popFixture`, `cloneSymbol`.

use super::object::{FieldSig, FixtureObject, MethodSig};
use super::objtable::{ActorStack, ObjectRef, ObjectTable, ACTOR_NAME};
use super::value::{Arg, ParamType};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

pub struct StandardLibrary {
    objects: Arc<Mutex<ObjectTable>>,
    actors: Arc<Mutex<ActorStack>>,
}

impl StandardLibrary {
    pub fn new(objects: Arc<Mutex<ObjectTable>>, actors: Arc<Mutex<ActorStack>>) -> Self {
        Self { objects, actors }
    }
}

fn echo(_any: &mut dyn Any, mut args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    Ok(vec![args.pop().unwrap_or(Arg::Void)])
}

fn get_fixture(any: &mut dyn Any, _args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let this = any.downcast_mut::<StandardLibrary>().unwrap();
    let actor = this
        .objects
        .lock()
        .get(ACTOR_NAME)
        .ok_or_else(|| "No current actor".to_owned())?;
    Ok(vec![Arg::Object(actor)])
}

fn push_fixture(any: &mut dyn Any, _args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let this = any.downcast_mut::<StandardLibrary>().unwrap();
    let current = this
        .objects
        .lock()
        .get(ACTOR_NAME)
        .ok_or_else(|| "No current actor".to_owned())?;
    let cloned = current.lock().clone_instance();
    this.actors.lock().push(current);
    this.objects.lock().insert(ACTOR_NAME, cloned);
    Ok(vec![])
}

fn pop_fixture(any: &mut dyn Any, _args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let this = any.downcast_mut::<StandardLibrary>().unwrap();
    match this.actors.lock().pop() {
        Some(prior) => {
            this.objects.lock().insert(ACTOR_NAME, prior);
            Ok(vec![])
        }
        None => Ok(vec![Arg::Str(
            "__EXCEPTION__:message:<<Actor stack empty>>".to_owned(),
        )]),
    }
}

fn clone_symbol(_any: &mut dyn Any, mut args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let value = args.pop().unwrap_or(Arg::Void);
    let cloned = match value {
        Arg::Object(obj) => Arg::Object(obj.lock().clone_instance()),
        other => other,
    };
    Ok(vec![cloned])
}

static METHODS: &[MethodSig] = &[
    MethodSig {
        name: "Echo",
        params: &[ParamType::Any],
        variadic: false,
        call: echo,
    },
    MethodSig {
        name: "GetFixture",
        params: &[],
        variadic: false,
        call: get_fixture,
    },
    MethodSig {
        name: "PushFixture",
        params: &[],
        variadic: false,
        call: push_fixture,
    },
    MethodSig {
        name: "PopFixture",
        params: &[],
        variadic: false,
        call: pop_fixture,
    },
    MethodSig {
        name: "CloneSymbol",
        params: &[ParamType::Any],
        variadic: false,
        call: clone_symbol,
    },
];

impl FixtureObject for StandardLibrary {
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
        "StandardLibrary"
    }
    fn methods(&self) -> &'static [MethodSig] {
        METHODS
    }
    fn fields(&self) -> &'static [FieldSig] {
        &[]
    }
    fn clone_instance(&self) -> ObjectRef {
        Arc::new(Mutex::new(StandardLibrary {
            objects: self.objects.clone(),
            actors: self.actors.clone(),
        }))
    }
}
