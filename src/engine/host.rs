/*
 *  engine/host.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Host facts the engine displays (network address)
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

/// Supplies the text shown by the `showip` override.
pub trait AddressSource: Send {
    fn address(&self) -> String;
}

/// Always reports the same address.
#[derive(Debug, Clone)]
pub struct FixedAddress(pub String);

impl AddressSource for FixedAddress {
    fn address(&self) -> String {
        self.0.clone()
    }
}
