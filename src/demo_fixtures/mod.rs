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

//! Illustration fixtures shipped alongside the server, registered only by
//! the `main` binary under the `demo_fixtures` namespace. Nothing in
//! `slimd::engine` depends on this module.

mod messenger;
mod order;
mod temperature;
mod waiter;

use slimd::engine::processor::StatementProcessor;

pub fn register_all(processor: &StatementProcessor) {
    processor.register_fixture("demo_fixtures.TemperatureConverter", temperature::constructor_sig());
    processor.register_fixture("demo_fixtures.Messenger", messenger::constructor_sig());
    processor.register_fixture("demo_fixtures.Order", order::constructor_sig());
    processor.register_fixture("demo_fixtures.Waiter", waiter::constructor_sig());
}
