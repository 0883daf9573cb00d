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

//! The fixture constructor catalog. Constructors are registered once at
//! startup under a fully qualified name (e.g. `demo_fixtures.Order`);
//! `import` lets a client address them by bare name thereafter.

use super::objtable::ObjectRef;
use super::value::{Arg, ParamType};
use std::collections::HashMap;

pub struct ConstructorSig {
    pub params: &'static [ParamType],
    pub variadic: bool,
    pub build: fn(Vec<Arg>) -> Result<ObjectRef, String>,
}

#[derive(Default)]
pub struct FixtureRegistry {
    constructors: HashMap<String, ConstructorSig>,
    namespaces: Vec<String>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructors are immutable once registered: this is only ever called
    /// during startup bootstrap, never in response to a protocol instruction.
    pub fn register(&mut self, qualified_name: impl Into<String>, sig: ConstructorSig) {
        self.constructors.insert(qualified_name.into(), sig);
    }

    /// Appends `namespace` to the search list unless it is already present.
    pub fn import_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        if !self.namespaces.iter().any(|n| *n == namespace) {
            self.namespaces.push(namespace);
        }
    }

    /// Searches the bare name first, then each imported namespace in
    /// insertion order, prefixed as `namespace.name`.
    pub fn fixture_named(&self, name: &str) -> Option<&ConstructorSig> {
        if let Some(sig) = self.constructors.get(name) {
            return Some(sig);
        }
        for ns in &self.namespaces {
            let qualified = format!("{ns}.{name}");
            if let Some(sig) = self.constructors.get(&qualified) {
                return Some(sig);
            }
        }
        None
    }
}
