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

//! A fixture with no members at all, used to exercise the
//! `NO_METHOD_IN_CLASS` path.

use parking_lot::Mutex;
use slimd::engine::object::{FieldSig, FixtureObject, MethodSig};
use slimd::engine::objtable::ObjectRef;
use slimd::engine::registry::ConstructorSig;
use slimd::engine::value::Arg;
use std::any::Any;
use std::sync::Arc;

pub struct Order;

impl FixtureObject for Order {
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
        "Order"
    }
    fn methods(&self) -> &'static [MethodSig] {
        &[]
    }
    fn fields(&self) -> &'static [FieldSig] {
        &[]
    }
    fn clone_instance(&self) -> ObjectRef {
        Arc::new(Mutex::new(Order))
    }
}

fn build(_args: Vec<Arg>) -> Result<ObjectRef, String> {
    Ok(Arc::new(Mutex::new(Order)))
}

pub fn constructor_sig() -> ConstructorSig {
    ConstructorSig {
        params: &[],
        variadic: false,
        build,
    }
}
