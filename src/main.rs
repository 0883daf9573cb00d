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

//! `slimd` is a SLIM protocol server: it reflectively instantiates
//! test-authored fixtures and dispatches method/field calls on them for an
//! acceptance-test runner connected over a pipe or TCP socket.

mod demo_fixtures;

use env_logger::{Builder, Target};
use log::{error, info};
use slimd::config;
use slimd::engine::interpreter::Interpreter;
use slimd::engine::net::{serve_pipe, serve_tcp};
use slimd::engine::processor::StatementProcessor;
use std::env;
use std::fs::OpenOptions;
use std::process;
use std::sync::Arc;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = match config::parse(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
    };

    let mut builder = Builder::new();
    builder.parse_filters(&env::var("SLIM_LOG").unwrap_or_else(|_| "info".to_owned()));
    match OpenOptions::new().create(true).append(true).open(&config.log_path) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!("could not open log file '{}': {e}", config.log_path),
    }
    builder.init();

    let processor = Arc::new(StatementProcessor::new());
    demo_fixtures::register_all(&processor);
    processor.do_import("demo_fixtures");

    let interpreter = Interpreter::new(processor, config.instruction_timeout);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("slimd")
        .enable_all()
        .build()
        .expect("failed to start the async runtime");

    let result = if config.is_pipe_mode() {
        let tag = |prefix: &str, message: &str| println!("{prefix} : {message}");
        tag("SOUT", "starting in pipe mode");
        runtime.block_on(serve_pipe(config.connection_timeout, interpreter))
    } else {
        info!("starting on port {}", config.port);
        runtime.block_on(serve_tcp(config.port, config.connection_timeout, interpreter))
    };

    if let Err(e) = result {
        if config.is_pipe_mode() {
            println!("SERR : {e}");
        } else {
            error!("server loop ended with error: {e}");
        }
        process::exit(1);
    }
}
