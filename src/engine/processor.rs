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

//! The statement processor: the state holding the fixture registry, object
//! table, symbol table and standard library, and the five commands
//! (`make`, `call`, `callAndAssign`, `import`, `assign`) built on top of
//! them.

use super::entity::Entity;
use super::object::{invoke_member, DispatchError, Marshalled};
use super::objtable::{ActorStack, ObjectRef, ObjectTable};
use super::registry::{ConstructorSig, FixtureRegistry};
use super::stdlib::StandardLibrary;
use super::symtable::{Symbol, SymbolTable};
use super::tokens;
use super::value::coerce_args;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub struct StatementProcessor {
    registry: Mutex<FixtureRegistry>,
    objects: Arc<Mutex<ObjectTable>>,
    actors: Arc<Mutex<ActorStack>>,
    symbols: Mutex<SymbolTable>,
}

impl StatementProcessor {
    pub fn new() -> Self {
        let objects = Arc::new(Mutex::new(ObjectTable::new()));
        let actors = Arc::new(Mutex::new(ActorStack::new()));
        let stdlib = Arc::new(Mutex::new(StandardLibrary::new(objects.clone(), actors.clone())));
        objects.lock().insert("libraryStandard", stdlib);
        Self {
            registry: Mutex::new(FixtureRegistry::new()),
            objects,
            actors,
            symbols: Mutex::new(SymbolTable::new()),
        }
    }

    pub fn has_library(&self, name: &str) -> bool {
        self.objects.lock().get(name).is_some()
    }

    pub fn register_fixture(&self, qualified_name: impl Into<String>, sig: ConstructorSig) {
        self.registry.lock().register(qualified_name, sig);
    }

    pub fn do_import(&self, path: &str) -> Entity {
        self.registry.lock().import_namespace(path);
        tokens::ok()
    }

    pub fn set_symbol(&self, symbol_name: &str, value: &str) -> Entity {
        let mut symbols = self.symbols.lock();
        match symbols.set(symbol_name, Symbol::Str(value.to_owned())) {
            Ok(()) => tokens::ok(),
            Err(msg) => tokens::exception(&msg),
        }
    }

    pub fn do_make(&self, instance_name: &str, fixture_name: &str) -> Entity {
        self.do_make_with_args(instance_name, fixture_name, &[])
    }

    /// `make` with constructor arguments, threaded through separately from
    /// [`Self::do_make`] since most instructions in practice construct a
    /// fixture with no arguments.
    pub fn do_make_with_args(&self, instance_name: &str, fixture_name: &str, raw_args: &[String]) -> Entity {
        if let Some(name) = fixture_name.strip_prefix('$') {
            if let Some(Symbol::Object(obj)) = self.symbols.lock().get(name) {
                self.objects.lock().insert(instance_name, obj.clone());
                return tokens::ok();
            }
        }
        let resolved = self.symbols.lock().substitute(fixture_name);
        let sig_params;
        let sig_variadic;
        let build;
        {
            let registry = self.registry.lock();
            let Some(sig) = registry.fixture_named(&resolved) else {
                return tokens::no_class(&resolved);
            };
            sig_params = sig.params;
            sig_variadic = sig.variadic;
            build = sig.build;
        }
        let args = match coerce_args(raw_args, sig_params, sig_variadic, &self.symbols.lock()) {
            Ok(args) => args,
            Err(reason) => return tokens::could_not_invoke_constructor(fixture_name, &reason),
        };
        let built = panic::catch_unwind(AssertUnwindSafe(|| build(args)));
        match built {
            Ok(Ok(obj)) => {
                self.objects.lock().insert(instance_name, obj);
                tokens::ok()
            }
            Ok(Err(reason)) => tokens::could_not_invoke_constructor(fixture_name, &reason),
            Err(payload) => {
                let reason = format!("Panic: {}", panic_message(payload));
                tokens::could_not_invoke_constructor(fixture_name, &reason)
            }
        }
    }

    pub fn do_call(&self, instance_name: &str, method_name: &str, raw_args: &[String]) -> Entity {
        let instance = self.objects.lock().get(instance_name);
        let symbols = self.symbols.lock();

        if let Some(obj) = &instance {
            match invoke_member(&mut *obj.lock(), method_name, raw_args, &symbols) {
                Ok(marshalled) => return self.serialize_objects_in(marshalled),
                Err(DispatchError::Panic(msg)) => return tokens::exception(&msg),
                Err(DispatchError::NotFound) => {}
            }
        }

        let libraries: Vec<ObjectRef> = self
            .objects
            .lock()
            .libraries()
            .filter(|library| !instance.as_ref().is_some_and(|i| Arc::ptr_eq(i, library)))
            .cloned()
            .collect();
        for library in &libraries {
            match invoke_member(&mut *library.lock(), method_name, raw_args, &symbols) {
                Ok(marshalled) => return self.serialize_objects_in(marshalled),
                Err(DispatchError::Panic(msg)) => return tokens::exception(&msg),
                Err(DispatchError::NotFound) => continue,
            }
        }

        match instance {
            None => tokens::no_instance(instance_name),
            Some(obj) => {
                let type_name = obj.lock().type_name().to_owned();
                tokens::no_method_in_class(method_name, raw_args.len(), &type_name)
            }
        }
    }

    pub fn do_call_and_assign(
        &self,
        symbol_name: &str,
        instance_name: &str,
        method_name: &str,
        raw_args: &[String],
    ) -> Entity {
        let instance = self.objects.lock().get(instance_name);
        let symbols_snapshot_result = {
            let symbols = self.symbols.lock();
            if let Some(obj) = &instance {
                match invoke_member(&mut *obj.lock(), method_name, raw_args, &symbols) {
                    Ok(m) => Some(Ok(m)),
                    Err(DispatchError::Panic(msg)) => Some(Err(msg)),
                    Err(DispatchError::NotFound) => None,
                }
            } else {
                None
            }
        };

        let outcome = match symbols_snapshot_result {
            Some(Ok(marshalled)) => Ok(marshalled),
            Some(Err(msg)) => return tokens::exception(&msg),
            None => self.dispatch_via_libraries(method_name, raw_args),
        };

        match outcome {
            Ok(marshalled) => {
                self.bind_result_symbol(symbol_name, &marshalled);
                self.serialize_objects_in(marshalled)
            }
            Err(None) => match instance {
                None => tokens::no_instance(instance_name),
                Some(obj) => {
                    let type_name = obj.lock().type_name().to_owned();
                    tokens::no_method_in_class(method_name, raw_args.len(), &type_name)
                }
            },
            Err(Some(msg)) => tokens::exception(&msg),
        }
    }

    fn dispatch_via_libraries(
        &self,
        method_name: &str,
        raw_args: &[String],
    ) -> Result<Marshalled, Option<String>> {
        let libraries: Vec<ObjectRef> = self.objects.lock().libraries().cloned().collect();
        let symbols = self.symbols.lock();
        for library in &libraries {
            match invoke_member(&mut *library.lock(), method_name, raw_args, &symbols) {
                Ok(m) => return Ok(m),
                Err(DispatchError::Panic(msg)) => return Err(Some(msg)),
                Err(DispatchError::NotFound) => continue,
            }
        }
        Err(None)
    }

    fn bind_result_symbol(&self, symbol_name: &str, marshalled: &Marshalled) {
        let mut symbols = self.symbols.lock();
        match marshalled {
            Marshalled::Object(obj) => {
                let _ = symbols.set(symbol_name, Symbol::Object(obj.clone()));
            }
            other => {
                let _ = symbols.set(symbol_name, Symbol::Str(render_text(other)));
            }
        }
    }

    /// Recursively replaces live objects in a dispatch result with their
    /// serialized form, the point at which an object finally crosses into
    /// the wire-bound [`Entity`] tree.
    fn serialize_objects_in(&self, marshalled: Marshalled) -> Entity {
        match marshalled {
            Marshalled::Str(s) => Entity::str(s),
            Marshalled::List(items) => {
                Entity::list(items.into_iter().map(|m| self.serialize_objects_in(m)))
            }
            Marshalled::Object(obj) => Entity::str(obj.lock().serialize()),
        }
    }
}

fn render_text(marshalled: &Marshalled) -> String {
    match marshalled {
        Marshalled::Str(s) => s.clone(),
        Marshalled::List(items) => {
            let rendered: Vec<String> = items.iter().map(render_text).collect();
            format!("[{}]", rendered.join(", "))
        }
        Marshalled::Object(_) => String::new(),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

impl Default for StatementProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_library_is_present_immediately() {
        let processor = StatementProcessor::new();
        assert!(processor.has_library("libraryStandard"));
    }

    #[test]
    fn unknown_fixture_reports_no_class() {
        let processor = StatementProcessor::new();
        let result = processor.do_make("x", "Nonexistent");
        assert_eq!(result.to_string(), "__EXCEPTION__:message:<<NO_CLASS Nonexistent>>");
    }

    #[test]
    fn call_on_unknown_instance_reports_no_instance() {
        let processor = StatementProcessor::new();
        let result = processor.do_call("ghost", "DoThing", &[]);
        assert_eq!(result.to_string(), "__EXCEPTION__:message:<<NO_INSTANCE ghost>>");
    }

    #[test]
    fn import_then_call_is_ok() {
        let processor = StatementProcessor::new();
        let result = processor.do_import("demo_fixtures");
        assert_eq!(result.to_string(), "OK");
    }

    #[test]
    fn assign_then_call_echo_on_standard_library_substitutes() {
        let processor = StatementProcessor::new();
        assert_eq!(processor.set_symbol("greeting", "hi").to_string(), "OK");
        let result = processor.do_call("libraryStandard", "echo", &["$greeting".to_owned()]);
        assert_eq!(result.to_string(), "hi");
    }

    #[test]
    fn invalid_symbol_name_is_reported() {
        let processor = StatementProcessor::new();
        let result = processor.set_symbol("9bad", "x");
        assert!(result.to_string().starts_with("__EXCEPTION__"));
    }
}
