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

//! End-to-end scenarios driving [`slimd::engine::processor::StatementProcessor`]
//! and [`slimd::engine::interpreter::Interpreter`] directly, the way the
//! binary's demo fixtures are exercised by a connected test runner but
//! without opening a socket. The illustration fixtures themselves live only
//! in the `slimd` binary, so each scenario here registers the small
//! stand-in fixture it needs through the public engine API.

use parking_lot::Mutex;
use slimd::engine::codec::{decode_frame, encode_frame};
use slimd::engine::entity::Entity;
use slimd::engine::interpreter::Interpreter;
use slimd::engine::object::{FieldSig, FixtureObject, MethodSig};
use slimd::engine::objtable::ObjectRef;
use slimd::engine::processor::StatementProcessor;
use slimd::engine::registry::ConstructorSig;
use slimd::engine::value::{Arg, ParamType};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

fn instr(parts: &[&str]) -> Entity {
    Entity::list(parts.iter().map(|p| Entity::str(*p)))
}

fn response_at(response: &Entity, index: usize) -> String {
    response.as_list().unwrap()[index].as_list().unwrap()[1].to_string()
}

// Scenario 1: a frame carrying a multibyte payload round-trips through the
// codec byte for byte.
#[test]
fn scenario_1_codec_round_trip_with_multibyte_payload() {
    let entity = Entity::list([Entity::str("Hi JRÜ€©")]);
    let framed = encode_frame(&entity);
    let (decoded, consumed) = decode_frame(framed.as_bytes()).unwrap().unwrap();
    assert_eq!(consumed, framed.len());
    assert_eq!(decoded, entity);
}

#[test]
fn scenario_1_decode_frame_waits_for_more_bytes() {
    let entity = Entity::str("hello");
    let framed = encode_frame(&entity);
    let partial = &framed.as_bytes()[..framed.len() - 2];
    assert_eq!(decode_frame(partial).unwrap(), None);
}

// --- Scenario 2: TemperatureConverter ---------------------------------

struct Temperature {
    kelvin: f64,
}

const ABSOLUTE_ZERO_CELSIUS: f64 = -273.15;
const ABSOLUTE_ZERO_FAHRENHEIT: f64 = -459.67;

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

fn parse_temperature(input: &str) -> Result<Arg, String> {
    if input.is_empty() {
        return Err(format!("Panic: Expected float with suffix F, C or K but got '{input}'"));
    }
    let (base, scale) = input.split_at(input.len() - 1);
    let value: f64 = base
        .trim()
        .parse()
        .map_err(|_| format!("Panic: Expected float with suffix F, C or K but got '{input}'"))?;
    let kelvin = match scale {
        "F" => round4((value - ABSOLUTE_ZERO_FAHRENHEIT) * 5.0 / 9.0),
        "C" => value - ABSOLUTE_ZERO_CELSIUS,
        "K" => value,
        _ => return Err(format!("Panic: Expected float with suffix F, C or K but got '{input}'")),
    };
    Ok(Arg::Object(Arc::new(Mutex::new(Temperature { kelvin }))))
}

impl FixtureObject for Temperature {
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
        "Temperature"
    }
    fn methods(&self) -> &'static [MethodSig] {
        &[]
    }
    fn fields(&self) -> &'static [FieldSig] {
        &[]
    }
    fn clone_instance(&self) -> ObjectRef {
        Arc::new(Mutex::new(Temperature { kelvin: self.kelvin }))
    }
}

struct TemperatureConverter;

fn convert_to(_any: &mut dyn Any, mut args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let scale = match args.pop() {
        Some(Arg::Str(s)) => s,
        _ => return Err("Panic: Could not convert scale argument".to_owned()),
    };
    let temperature = match args.pop() {
        Some(Arg::Object(obj)) => obj,
        _ => return Err("Panic: Could not convert temperature argument".to_owned()),
    };
    let guard = temperature.lock();
    let this = guard.as_any().downcast_ref::<Temperature>().unwrap();
    let celsius = this.kelvin + ABSOLUTE_ZERO_CELSIUS;
    let value = match scale.to_ascii_uppercase().as_str() {
        "C" => celsius,
        "K" => this.kelvin,
        "F" => round4(this.kelvin * 9.0 / 5.0 + ABSOLUTE_ZERO_FAHRENHEIT),
        _ => return Err(format!("Panic: Unrecognized temperature scale: {scale}")),
    };
    Ok(vec![Arg::F64(value)])
}

static CONVERTER_METHODS: &[MethodSig] = &[MethodSig {
    name: "ConvertTo",
    params: &[ParamType::Custom(parse_temperature), ParamType::Str],
    variadic: false,
    call: convert_to,
}];

impl FixtureObject for TemperatureConverter {
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
        "TemperatureConverter"
    }
    fn methods(&self) -> &'static [MethodSig] {
        CONVERTER_METHODS
    }
    fn fields(&self) -> &'static [FieldSig] {
        &[]
    }
    fn clone_instance(&self) -> ObjectRef {
        Arc::new(Mutex::new(TemperatureConverter))
    }
}

fn build_converter(_args: Vec<Arg>) -> Result<ObjectRef, String> {
    Ok(Arc::new(Mutex::new(TemperatureConverter)))
}

#[tokio::test]
async fn scenario_2_temperature_converter_sequence() {
    let processor = Arc::new(StatementProcessor::new());
    processor.register_fixture(
        "demo_fixtures.TemperatureConverter",
        ConstructorSig {
            params: &[],
            variadic: false,
            build: build_converter,
        },
    );
    processor.do_import("demo_fixtures");
    let interpreter = Interpreter::new(processor, Duration::from_secs(5));

    let request = Entity::list([
        instr(&["1", "make", "converter", "demo_fixtures.TemperatureConverter"]),
        instr(&["2", "call", "converter", "ConvertTo", "68 F", "C"]),
        instr(&["3", "call", "converter", "ConvertTo", "68 F", "C"]),
        instr(&["4", "call", "converter", "ConvertTo", "", "K"]),
    ]);
    let response = interpreter.process(&request).await;

    assert_eq!(response_at(&response, 0), "OK");
    assert_eq!(response_at(&response, 1), "20");
    assert_eq!(response_at(&response, 2), "20");
    assert_eq!(
        response_at(&response, 3),
        "__EXCEPTION__:message:<<Panic: Expected float with suffix F, C or K but got ''>>"
    );
}

// --- Scenario 3: instruction timeout -----------------------------------

struct Waiter;

fn wait(_any: &mut dyn Any, mut args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let millis = match args.pop() {
        Some(Arg::I64(n)) if n >= 0 => n as u64,
        _ => return Err("Expected 1 parameter(s) but got 0".to_owned()),
    };
    std::thread::sleep(Duration::from_millis(millis));
    Ok(vec![])
}

static WAITER_METHODS: &[MethodSig] = &[MethodSig {
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
        WAITER_METHODS
    }
    fn fields(&self) -> &'static [FieldSig] {
        &[]
    }
    fn clone_instance(&self) -> ObjectRef {
        Arc::new(Mutex::new(Waiter))
    }
}

fn build_waiter(_args: Vec<Arg>) -> Result<ObjectRef, String> {
    Ok(Arc::new(Mutex::new(Waiter)))
}

#[tokio::test]
async fn scenario_3_instruction_times_out_without_failing_the_connection() {
    let processor = Arc::new(StatementProcessor::new());
    processor.register_fixture(
        "demo_fixtures.Waiter",
        ConstructorSig {
            params: &[],
            variadic: false,
            build: build_waiter,
        },
    );
    processor.do_import("demo_fixtures");
    let interpreter = Interpreter::new(processor, Duration::from_nanos(1));

    let request = Entity::list([
        instr(&["1", "make", "waiter", "demo_fixtures.Waiter"]),
        instr(&["2", "call", "waiter", "Wait", "200"]),
    ]);
    let response = interpreter.process(&request).await;

    assert_eq!(response_at(&response, 0), "OK");
    assert_eq!(response_at(&response, 1), "__EXCEPTION__:message:<<TIMED_OUT 0>>");
}

// --- Scenario 4/5: symbol substitution and member resolution -----------

struct Messenger {
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
    Ok(vec![Arg::Str(any.downcast_ref::<Messenger>().unwrap().message.clone())])
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

static MESSENGER_METHODS: &[MethodSig] = &[
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

static MESSENGER_FIELDS: &[FieldSig] = &[FieldSig {
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
        MESSENGER_METHODS
    }
    fn fields(&self) -> &'static [FieldSig] {
        MESSENGER_FIELDS
    }
    fn clone_instance(&self) -> ObjectRef {
        Arc::new(Mutex::new(Messenger {
            message: self.message.clone(),
            message_field: self.message_field.clone(),
        }))
    }
}

fn build_messenger(_args: Vec<Arg>) -> Result<ObjectRef, String> {
    Ok(Arc::new(Mutex::new(Messenger {
        message: String::new(),
        message_field: String::new(),
    })))
}

#[tokio::test]
async fn scenario_4_symbol_holds_an_object_by_identity() {
    let processor = Arc::new(StatementProcessor::new());
    processor.register_fixture(
        "demo_fixtures.Messenger",
        ConstructorSig {
            params: &[],
            variadic: false,
            build: build_messenger,
        },
    );
    processor.do_import("demo_fixtures");
    let interpreter = Interpreter::new(processor, Duration::from_secs(5));

    let request = Entity::list([
        instr(&["1", "make", "inst1", "demo_fixtures.Messenger"]),
        instr(&["2", "callAndAssign", "fixture", "inst1", "Message"]),
        instr(&["3", "call", "inst1", "SetMessage", "hello"]),
        instr(&["4", "call", "inst1", "Message"]),
    ]);
    let response = interpreter.process(&request).await;
    assert_eq!(response_at(&response, 0), "OK");
    assert_eq!(response_at(&response, 3), "hello");
}

#[tokio::test]
async fn scenario_5_field_resolves_through_get_set_accessor_prefixes() {
    let processor = Arc::new(StatementProcessor::new());
    processor.register_fixture(
        "demo_fixtures.Messenger",
        ConstructorSig {
            params: &[],
            variadic: false,
            build: build_messenger,
        },
    );
    processor.do_import("demo_fixtures");
    let interpreter = Interpreter::new(processor, Duration::from_secs(5));

    let request = Entity::list([
        instr(&["1", "make", "inst1", "demo_fixtures.Messenger"]),
        instr(&["2", "call", "inst1", "SetMessageField", "abc"]),
        instr(&["3", "call", "inst1", "GetMessageField"]),
        instr(&["4", "call", "inst1", "MessageField"]),
    ]);
    let response = interpreter.process(&request).await;
    assert_eq!(response_at(&response, 0), "OK");
    assert_eq!(response_at(&response, 2), "abc");
    assert_eq!(response_at(&response, 3), "abc");
}

// --- Scenario 6: unknown member reports NO_METHOD_IN_CLASS -------------

struct Order;

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

fn build_order(_args: Vec<Arg>) -> Result<ObjectRef, String> {
    Ok(Arc::new(Mutex::new(Order)))
}

#[tokio::test]
async fn scenario_6_unknown_member_reports_no_method_in_class() {
    let processor = Arc::new(StatementProcessor::new());
    processor.register_fixture(
        "demo_fixtures.Order",
        ConstructorSig {
            params: &[],
            variadic: false,
            build: build_order,
        },
    );
    processor.do_import("demo_fixtures");
    let interpreter = Interpreter::new(processor, Duration::from_secs(5));

    let request = Entity::list([
        instr(&["1", "make", "order1", "demo_fixtures.Order"]),
        instr(&["2", "call", "order1", "Nonexisting"]),
    ]);
    let response = interpreter.process(&request).await;
    assert_eq!(response_at(&response, 0), "OK");
    assert_eq!(
        response_at(&response, 1),
        "__EXCEPTION__:message:<<NO_METHOD_IN_CLASS Nonexisting[0] Order>>"
    );
}

// --- Boundary and invariant checks from the wire contract ---------------

#[tokio::test]
async fn standard_library_is_reachable_without_any_import() {
    let processor = Arc::new(StatementProcessor::new());
    let interpreter = Interpreter::new(processor, Duration::from_secs(5));
    let request = Entity::list([instr(&["1", "call", "libraryStandard", "echo", "hi"])]);
    let response = interpreter.process(&request).await;
    assert_eq!(response_at(&response, 0), "hi");
}

#[tokio::test]
async fn empty_instruction_list_yields_a_single_malformed_response() {
    let processor = Arc::new(StatementProcessor::new());
    let interpreter = Interpreter::new(processor, Duration::from_secs(5));
    let response = interpreter.process(&Entity::list([])).await;
    let items = response.as_list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].to_string(), "__EXCEPTION__:message:<<MALFORMED_INSTRUCTION []>>");
}

#[tokio::test]
async fn symbol_set_then_substituted_round_trips() {
    let processor = Arc::new(StatementProcessor::new());
    let interpreter = Interpreter::new(processor, Duration::from_secs(5));
    let request = Entity::list([
        instr(&["1", "assign", "name", "world"]),
        instr(&["2", "call", "libraryStandard", "echo", "hello $name"]),
    ]);
    let response = interpreter.process(&request).await;
    assert_eq!(response_at(&response, 0), "OK");
    assert_eq!(response_at(&response, 1), "hello world");
}

#[test]
fn fixture_search_order_prefers_bare_name_over_namespace() {
    let processor = StatementProcessor::new();
    processor.register_fixture(
        "demo_fixtures.Order",
        ConstructorSig {
            params: &[],
            variadic: false,
            build: build_order,
        },
    );
    assert_eq!(
        processor.do_make("x", "Order").to_string(),
        "__EXCEPTION__:message:<<NO_CLASS Order>>"
    );
    processor.do_import("demo_fixtures");
    assert_eq!(processor.do_make("x", "Order").to_string(), "OK");
}
