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

//! The connection handler: banner, framed request/response cycle,
//! termination on `bye`. Generalizes the teacher's `ConnectionHandler`
//! query loop (accumulate into a growable buffer, hand the decoder
//! incremental slices, write back) to SLIM's single-client, single-request
//! shape.

use crate::engine::codec::{decode_frame, encode_frame, CodecError};
use crate::engine::entity::Entity;
use crate::engine::interpreter::Interpreter;
use crate::engine::tokens;
use bytes::BytesMut;
use log::{error, info, trace};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout, Duration};

const READ_CHUNK: usize = 4096;

pub struct ConnectionHandler<S> {
    stream: S,
    buffer: BytesMut,
    connection_timeout: Duration,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, connection_timeout: Duration) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            connection_timeout,
        }
    }

    /// Runs the connection to completion: banner, then request/response
    /// loop until `bye`, EOF, or a read/write error.
    pub async fn run(mut self, interpreter: &Interpreter) -> io::Result<()> {
        self.write_raw(tokens::BANNER.as_bytes()).await?;
        loop {
            let entity = match self.read_frame().await {
                Ok(Some(entity)) => entity,
                Ok(None) => {
                    info!("connection closed by peer");
                    return Ok(());
                }
                Err(e) => {
                    error!("frame decode failed: {e}");
                    return Err(io::Error::new(io::ErrorKind::InvalidData, e.to_string()));
                }
            };
            trace!("received: {entity}");
            if entity.as_str() == Some("bye") {
                info!("received bye, closing connection");
                return Ok(());
            }
            let response = if entity.is_list() {
                interpreter.process(&entity).await
            } else {
                tokens::exception(&format!("Encountered unexpected command '{entity}'"))
            };
            trace!("responding: {response}");
            self.write_frame(&response).await?;
        }
    }

    async fn read_frame(&mut self) -> Result<Option<Entity>, CodecError> {
        loop {
            match decode_frame(&self.buffer)? {
                Some((entity, consumed)) => {
                    let _ = self.buffer.split_to(consumed);
                    return Ok(Some(entity));
                }
                None => {
                    let mut chunk = [0u8; READ_CHUNK];
                    let read = match timeout(self.connection_timeout, self.stream.read(&mut chunk)).await {
                        Ok(Ok(n)) => n,
                        Ok(Err(_)) | Err(_) => 0,
                    };
                    if read == 0 {
                        return Ok(None);
                    }
                    self.buffer.extend_from_slice(&chunk[..read]);
                }
            }
        }
    }

    async fn write_frame(&mut self, entity: &Entity) -> io::Result<()> {
        self.write_raw(encode_frame(entity).as_bytes()).await
    }

    async fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        match timeout(self.connection_timeout, self.stream.write_all(bytes)).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out")),
        }
    }
}
