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

//! Instruction dispatch with a per-instruction timeout. Each instruction in
//! a request list is raced against the configured deadline; a straggler
//! that misses its deadline is left to finish on its own task rather than
//! being forcibly cancelled.

use super::entity::Entity;
use super::processor::StatementProcessor;
use super::tokens;
use std::sync::Arc;
use std::time::Duration;

pub struct Interpreter {
    processor: Arc<StatementProcessor>,
    instruction_timeout: Duration,
}

impl Interpreter {
    pub fn new(processor: Arc<StatementProcessor>, instruction_timeout: Duration) -> Self {
        Self {
            processor,
            instruction_timeout,
        }
    }

    /// Runs every instruction in `instructions` and returns the `[id,
    /// result]` response list, in input order.
    pub async fn process(&self, instructions: &Entity) -> Entity {
        let Some(items) = instructions.as_list() else {
            return Entity::list([tokens::malformed_instruction(&instructions.to_string())]);
        };
        let mut responses = Vec::with_capacity(items.len());
        for instruction in items {
            responses.push(self.process_one(instruction).await);
        }
        Entity::list(responses)
    }

    async fn process_one(&self, instruction: &Entity) -> Entity {
        let Some(fields) = instruction.as_list() else {
            return tokens::malformed_instruction(&instruction.to_string());
        };
        match fields.len() {
            0 => Entity::list([tokens::malformed_instruction("[]")]),
            1 => Entity::list([fields[0].clone(), tokens::malformed_instruction(&instruction.to_string())]),
            _ => {
                let id = fields[0].clone();
                let result = self.dispatch_with_timeout(fields).await;
                Entity::list([id, result])
            }
        }
    }

    async fn dispatch_with_timeout(&self, fields: &[Entity]) -> Entity {
        let processor = self.processor.clone();
        let owned: Vec<String> = fields.iter().map(|e| e.to_string()).collect();
        let handle = tokio::task::spawn_blocking(move || dispatch(&processor, &owned));
        match tokio::time::timeout(self.instruction_timeout, handle).await {
            Ok(Ok(entity)) => entity,
            Ok(Err(_join_error)) => tokens::exception("Panic: instruction task aborted"),
            Err(_elapsed) => tokens::timed_out(self.instruction_timeout.as_secs()),
        }
    }
}

/// Dispatches one already-stringified instruction (`fields[1]` is the
/// command name, `fields[0]` the id, consumed by the caller) to the
/// matching statement-processor operation.
fn dispatch(processor: &StatementProcessor, fields: &[String]) -> Entity {
    let command = fields[1].as_str();
    match command {
        "make" if fields.len() >= 4 => {
            let instance_name = &fields[2];
            let fixture_name = &fields[3];
            let args = &fields[4..];
            processor.do_make_with_args(instance_name, fixture_name, args)
        }
        "call" if fields.len() >= 4 => {
            let instance_name = &fields[2];
            let method_name = &fields[3];
            let args = &fields[4..];
            processor.do_call(instance_name, method_name, args)
        }
        "callAndAssign" if fields.len() >= 5 => {
            let symbol_name = &fields[2];
            let instance_name = &fields[3];
            let method_name = &fields[4];
            let args = &fields[5..];
            processor.do_call_and_assign(symbol_name, instance_name, method_name, args)
        }
        "import" if fields.len() >= 3 => processor.do_import(&fields[2]),
        "assign" if fields.len() >= 4 => processor.set_symbol(&fields[2], &fields[3]),
        _ => tokens::malformed_instruction(&Entity::list(fields.iter().map(|s| Entity::str(s.as_str()))).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(parts: &[&str]) -> Entity {
        Entity::list(parts.iter().map(|p| Entity::str(*p)))
    }

    #[tokio::test]
    async fn empty_list_yields_single_malformed_entry() {
        let interpreter = Interpreter::new(Arc::new(StatementProcessor::new()), Duration::from_secs(1));
        let response = interpreter.process(&Entity::list([])).await;
        let items = response.as_list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].to_string(), "__EXCEPTION__:message:<<MALFORMED_INSTRUCTION []>>");
    }

    #[tokio::test]
    async fn one_element_instruction_echoes_id_with_malformed() {
        let interpreter = Interpreter::new(Arc::new(StatementProcessor::new()), Duration::from_secs(1));
        let request = Entity::list([instr(&["id1"])]);
        let response = interpreter.process(&request).await;
        let items = response.as_list().unwrap();
        assert_eq!(items.len(), 1);
        let pair = items[0].as_list().unwrap();
        assert_eq!(pair[0].to_string(), "id1");
        assert!(pair[1].to_string().starts_with("__EXCEPTION__"));
    }

    #[tokio::test]
    async fn assign_then_call_roundtrip() {
        let interpreter = Interpreter::new(Arc::new(StatementProcessor::new()), Duration::from_secs(1));
        let request = Entity::list([
            instr(&["1", "assign", "greeting", "hi"]),
            instr(&["2", "call", "libraryStandard", "echo", "$greeting"]),
        ]);
        let response = interpreter.process(&request).await;
        let items = response.as_list().unwrap();
        assert_eq!(items[0].as_list().unwrap()[1].to_string(), "OK");
        assert_eq!(items[1].as_list().unwrap()[1].to_string(), "hi");
    }

    #[tokio::test]
    async fn non_list_instruction_is_malformed() {
        let interpreter = Interpreter::new(Arc::new(StatementProcessor::new()), Duration::from_secs(1));
        let request = Entity::list([Entity::str("bye")]);
        let response = interpreter.process(&request).await;
        let items = response.as_list().unwrap();
        assert!(items[0].to_string().starts_with("__EXCEPTION__:message:<<MALFORMED_INSTRUCTION"));
    }
}
