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

//! The protocol's well-known response tokens (§6/§7 of the wire contract).
//! These are stable identifiers that downstream test reports match on
//! verbatim, so every formatting function here is a single source of truth
//! rather than an ad hoc `format!` scattered through the processor.

use super::entity::Entity;

pub const OK: &str = "OK";
pub const NULL: &str = "null";
pub const VOID: &str = "/__VOID__/";
pub const BANNER: &str = "Slim -- V0.5\n";

pub fn ok() -> Entity {
    Entity::str(OK)
}

/// Wraps a raw exception message in the protocol's envelope, detecting the
/// case-insensitive `AbortTest:`/`AbortSuite:` prefixes user code uses to
/// signal a per-test or per-suite abort.
pub fn exception(message: &str) -> Entity {
    if let Some(rest) = strip_ci_prefix(message, "AbortTest:") {
        return Entity::str(format!("__EXCEPTION__:ABORT_SLIM_TEST:message:<<{rest}>>"));
    }
    if let Some(rest) = strip_ci_prefix(message, "AbortSuite:") {
        return Entity::str(format!("__EXCEPTION__:ABORT_SLIM_SUITE:message:<<{rest}>>"));
    }
    Entity::str(format!("__EXCEPTION__:message:<<{message}>>"))
}

fn strip_ci_prefix<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    if input.len() >= prefix.len() && input[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&input[prefix.len()..])
    } else {
        None
    }
}

pub fn malformed_instruction(instruction: &str) -> Entity {
    exception(&format!("MALFORMED_INSTRUCTION {instruction}"))
}

pub fn no_class(fixture_name: &str) -> Entity {
    exception(&format!("NO_CLASS {fixture_name}"))
}

pub fn no_instance(instance_name: &str) -> Entity {
    exception(&format!("NO_INSTANCE {instance_name}"))
}

pub fn no_method_in_class(method_name: &str, arg_count: usize, type_name: &str) -> Entity {
    exception(&format!(
        "NO_METHOD_IN_CLASS {method_name}[{arg_count}] {type_name}"
    ))
}

pub fn could_not_invoke_constructor(fixture_name: &str, reason: &str) -> Entity {
    let joined = format!("{fixture_name}:{reason}").replace(' ', "_");
    exception(&format!("COULD_NOT_INVOKE_CONSTRUCTOR {joined}"))
}

/// Reserved per the wire contract's token table; no path in this server
/// currently emits it (constructor lookup failure is `NO_CLASS`, not a
/// missing-constructor-on-an-otherwise-known-fixture case).
pub fn no_constructor(fixture_name: &str) -> Entity {
    exception(&format!("NO_CONSTRUCTOR {fixture_name}"))
}

pub fn timed_out(seconds: u64) -> Entity {
    exception(&format!("TIMED_OUT {seconds}"))
}
