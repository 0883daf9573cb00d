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

//! Illustrates parsable object parameters: `Temperature` parses a string
//! like `"68 F"` into an internal Kelvin value, and `TemperatureConverter`
//! takes a `Temperature` and a target scale.

use parking_lot::Mutex;
use slimd::engine::object::{invoke_member, FieldSig, FixtureObject, MethodSig};
use slimd::engine::objtable::ObjectRef;
use slimd::engine::registry::ConstructorSig;
use slimd::engine::symtable::SymbolTable;
use slimd::engine::value::{Arg, ParamType};
use std::any::Any;
use std::sync::Arc;

const ABSOLUTE_ZERO_CELSIUS: f64 = -273.15;
const ABSOLUTE_ZERO_FAHRENHEIT: f64 = -459.67;

pub struct Temperature {
    kelvin: f64,
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

impl Temperature {
    fn parse_str(input: &str) -> Result<f64, String> {
        if input.is_empty() {
            return Err(format!("Panic: Expected float with suffix F, C or K but got '{input}'"));
        }
        let (base, scale) = input.split_at(input.len() - 1);
        let base = base.trim();
        let value: f64 = base
            .parse()
            .map_err(|_| format!("Panic: Expected float with suffix F, C or K but got '{input}'"))?;
        let kelvin = match scale {
            "F" => round4((value - ABSOLUTE_ZERO_FAHRENHEIT) * 5.0 / 9.0),
            "C" => value - ABSOLUTE_ZERO_CELSIUS,
            "K" => value,
            _ => return Err(format!("Panic: Expected float with suffix F, C or K but got '{input}'")),
        };
        Ok(kelvin)
    }

    pub fn value_in(&self, scale: &str) -> Result<f64, String> {
        let first = scale
            .chars()
            .next()
            .ok_or_else(|| format!("Panic: Unrecognized temperature scale: {scale}"))?;
        match first.to_ascii_uppercase() {
            'F' => Ok(round4(self.kelvin * 9.0 / 5.0 + ABSOLUTE_ZERO_FAHRENHEIT)),
            'C' => Ok(self.kelvin + ABSOLUTE_ZERO_CELSIUS),
            'K' => Ok(self.kelvin),
            _ => Err(format!("Panic: Unrecognized temperature scale: {scale}")),
        }
    }
}

fn temperature_to_string(any: &mut dyn Any, _args: Vec<Arg>) -> Result<Vec<Arg>, String> {
    let this = any.downcast_ref::<Temperature>().unwrap();
    Ok(vec![Arg::Str(format!("{} K", this.kelvin))])
}

static TEMPERATURE_METHODS: &[MethodSig] = &[MethodSig {
    name: "ToString",
    params: &[],
    variadic: false,
    call: temperature_to_string,
}];

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
        TEMPERATURE_METHODS
    }
    fn fields(&self) -> &'static [FieldSig] {
        &[]
    }
    fn clone_instance(&self) -> ObjectRef {
        Arc::new(Mutex::new(Temperature { kelvin: self.kelvin }))
    }
}

/// The [`ParamType::Custom`] coercion recipe for a `Temperature` parameter:
/// constructs a fresh value and parses the raw argument into it, the same
/// path a user-defined `Parse(string)` member takes.
fn parse_temperature_arg(input: &str) -> Result<Arg, String> {
    let kelvin = Temperature::parse_str(input)?;
    let obj: ObjectRef = Arc::new(Mutex::new(Temperature { kelvin }));
    Ok(Arg::Object(obj))
}

pub struct TemperatureConverter;

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
    let this = guard.as_any().downcast_ref::<Temperature>().ok_or_else(|| "Panic: not a Temperature".to_owned())?;
    let value = this.value_in(&scale)?;
    Ok(vec![Arg::F64(value)])
}

static CONVERTER_METHODS: &[MethodSig] = &[MethodSig {
    name: "ConvertTo",
    params: &[ParamType::Custom(parse_temperature_arg), ParamType::Str],
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

fn build_temperature_converter(_args: Vec<Arg>) -> Result<ObjectRef, String> {
    Ok(Arc::new(Mutex::new(TemperatureConverter)))
}

pub fn constructor_sig() -> ConstructorSig {
    ConstructorSig {
        params: &[],
        variadic: false,
        build: build_temperature_converter,
    }
}
