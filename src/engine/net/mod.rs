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

//! Transport entry points: a TCP listener for ordinary ports, and a pipe
//! adapter over stdin/stdout for `PORT=1`.

pub mod protocol;

use crate::engine::error::{ErrorContext, SlimResult};
use crate::engine::interpreter::Interpreter;
use log::{error, info};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;

pub use protocol::ConnectionHandler;

/// One client at a time, per spec: accept, run the connection to
/// completion, accept again.
pub async fn serve_tcp(port: u16, connection_timeout: Duration, interpreter: Interpreter) -> SlimResult<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .context(format!("binding tcp listener on port {port}"))?;
    info!("listening on port {port}");
    loop {
        let (socket, peer) = match timeout(connection_timeout, listener.accept()).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                error!("accept failed: {e}");
                return Err(e).context("accepting tcp connection");
            }
            Err(_) => {
                info!("accept timed out, still listening");
                continue;
            }
        };
        info!("accepted connection from {peer}");
        let handler = ConnectionHandler::new(socket, connection_timeout);
        if let Err(e) = handler.run(&interpreter).await {
            error!("connection with {peer} ended: {e}");
        }
    }
}

/// Pipe mode: a single session over stdin/stdout, used when `PORT=1`.
pub async fn serve_pipe(connection_timeout: Duration, interpreter: Interpreter) -> SlimResult<()> {
    let stream = tokio::io::join(tokio::io::stdin(), tokio::io::stdout());
    let handler = ConnectionHandler::new(stream, connection_timeout);
    handler.run(&interpreter).await.context("running pipe connection")
}
