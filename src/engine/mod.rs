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

//! The SLIM server core: wire codec, reflective dispatch, statement
//! processor, interpreter, and transport.

pub mod codec;
pub mod entity;
pub mod error;
pub mod interpreter;
pub mod mem;
pub mod net;
pub mod object;
pub mod objtable;
pub mod processor;
pub mod registry;
pub mod stdlib;
pub mod symtable;
pub mod tokens;
pub mod value;
