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

//! Command-line configuration: `[-s INSTRUCTION_TIMEOUT] [-t CONNECTION_TIMEOUT] [-log PATH] PORT`.
//! Fatal errors use the protocol's own stable wording since test harnesses
//! match on them.

use crate::engine::error::{Error, SlimResult};
use std::time::Duration;

const DEFAULT_INSTRUCTION_TIMEOUT_SECS: f64 = 10.0;
const DEFAULT_CONNECTION_TIMEOUT_SECS: f64 = 30.0;
const DEFAULT_LOG_PATH: &str = "slim4go.log";
pub const PIPE_MODE_PORT: u16 = 1;

#[derive(Debug, PartialEq)]
pub struct Config {
    pub port: u16,
    pub instruction_timeout: Duration,
    pub connection_timeout: Duration,
    pub log_path: String,
}

impl Config {
    pub fn is_pipe_mode(&self) -> bool {
        self.port == PIPE_MODE_PORT
    }
}

/// Parses `argv` (excluding the program name). Returns the fatal message on
/// failure verbatim as specified — callers print it to stderr and exit
/// before the banner is ever sent.
pub fn parse(args: &[String]) -> SlimResult<Config> {
    let mut instruction_timeout_secs = DEFAULT_INSTRUCTION_TIMEOUT_SECS;
    let mut connection_timeout_secs = DEFAULT_CONNECTION_TIMEOUT_SECS;
    let mut log_path = DEFAULT_LOG_PATH.to_owned();
    let mut port_arg: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-s" => {
                i += 1;
                let value = args.get(i).ok_or_else(|| Error::Config("Missing value for -s".to_owned()))?;
                instruction_timeout_secs = value
                    .parse()
                    .map_err(|_| Error::Config(format!("timeout '{value}' should be numerical")))?;
            }
            "-t" => {
                i += 1;
                let value = args.get(i).ok_or_else(|| Error::Config("Missing value for -t".to_owned()))?;
                connection_timeout_secs = value
                    .parse()
                    .map_err(|_| Error::Config(format!("timeout '{value}' should be numerical")))?;
            }
            "-log" => {
                i += 1;
                log_path = args
                    .get(i)
                    .ok_or_else(|| Error::Config("Missing value for -log".to_owned()))?
                    .clone();
            }
            other => port_arg = Some(other),
        }
        i += 1;
    }

    let port_arg = port_arg.ok_or_else(|| {
        Error::Config("Missing port specification. Expected params [-s timeout] port".to_owned())
    })?;
    let port: i64 = port_arg
        .parse()
        .map_err(|_| Error::Config(format!("port '{port_arg}' should be numerical")))?;
    if port < 0 {
        return Err(Error::Config(format!("port '{port_arg}' should be non-negative")));
    }
    let port: u16 = port
        .try_into()
        .map_err(|_| Error::Config(format!("port '{port_arg}' should be non-negative")))?;

    Ok(Config {
        port,
        instruction_timeout: Duration::from_secs_f64(instruction_timeout_secs.max(0.0)),
        connection_timeout: Duration::from_secs_f64(connection_timeout_secs.max(0.0)),
        log_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_port_is_fatal() {
        let err = parse(&args(&[])).unwrap_err();
        assert_eq!(err.to_string(), "Missing port specification. Expected params [-s timeout] port");
    }

    #[test]
    fn non_numerical_port_is_fatal() {
        let err = parse(&args(&["a"])).unwrap_err();
        assert_eq!(err.to_string(), "port 'a' should be numerical");
    }

    #[test]
    fn negative_port_is_fatal() {
        let err = parse(&args(&["-5"])).unwrap_err();
        assert_eq!(err.to_string(), "port '-5' should be non-negative");
    }

    #[test]
    fn defaults_apply_when_only_port_given() {
        let config = parse(&args(&["8085"])).unwrap();
        assert_eq!(config.port, 8085);
        assert_eq!(config.instruction_timeout, Duration::from_secs(10));
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
        assert_eq!(config.log_path, "slim4go.log");
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&args(&["-s", "0.001", "-t", "5", "-log", "custom.log", "8085"])).unwrap();
        assert_eq!(config.instruction_timeout, Duration::from_secs_f64(0.001));
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
        assert_eq!(config.log_path, "custom.log");
    }

    #[test]
    fn port_one_is_pipe_mode() {
        let config = parse(&args(&["1"])).unwrap();
        assert!(config.is_pipe_mode());
    }
}
