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

//! The registry of named live instances. Instances whose name begins with
//! `library` are consulted as dispatch fallbacks once per-instance lookup
//! on `call` misses.

use super::object::FixtureObject;
use parking_lot::Mutex;
use std::sync::Arc;

pub type ObjectRef = Arc<Mutex<dyn FixtureObject>>;

pub const LIBRARY_PREFIX: &str = "library";
pub const ACTOR_NAME: &str = "scriptTableActor";

#[derive(Default)]
pub struct ObjectTable {
    entries: Vec<(String, ObjectRef)>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `obj` under `name`. Re-registration overwrites the value
    /// but keeps the original insertion slot, so library dispatch order
    /// stays stable across a `make` that re-targets an existing name.
    pub fn insert(&mut self, name: impl Into<String>, obj: ObjectRef) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = obj;
        } else {
            self.entries.push((name, obj));
        }
    }

    pub fn get(&self, name: &str) -> Option<ObjectRef> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, o)| o.clone())
    }

    /// All `library*`-prefixed instances, in the order they were first
    /// inserted — the fallback search order for `call`.
    pub fn libraries(&self) -> impl Iterator<Item = &ObjectRef> {
        self.entries
            .iter()
            .filter(|(n, _)| n.starts_with(LIBRARY_PREFIX))
            .map(|(_, o)| o)
    }
}

/// LIFO of prior `scriptTableActor` values, used by the standard library's
/// `pushFixture`/`popFixture`.
#[derive(Default)]
pub struct ActorStack {
    stack: Vec<ObjectRef>,
}

impl ActorStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, prior: ObjectRef) {
        self.stack.push(prior);
    }

    pub fn pop(&mut self) -> Option<ObjectRef> {
        self.stack.pop()
    }
}
