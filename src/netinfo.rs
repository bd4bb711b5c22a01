/*
 *  netinfo.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Host network address and the show-IP switch
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

use local_ip_address::local_ip;
use log::{info, warn};

use crate::engine::AddressSource;

/// Shown when no address can be found.
pub const NO_IP: &str = "NO IP";

/// Address of the interface that would route outbound traffic.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAddress;

impl AddressSource for LocalAddress {
    fn address(&self) -> String {
        match local_ip() {
            Ok(ip) => ip.to_string(),
            Err(e) => {
                warn!("no local IP address: {}", e);
                NO_IP.to_string()
            }
        }
    }
}

/// True when the show-IP switch on `pin` (BCM numbering) is pulled low.
/// Read once at startup.
#[cfg(feature = "gpio")]
pub fn show_ip_switch(pin: u8) -> bool {
    use rppal::gpio::Gpio;

    let state = Gpio::new()
        .and_then(|gpio| gpio.get(pin))
        .map(|p| p.into_input_pullup().is_low());
    match state {
        Ok(low) => {
            if low {
                info!("GPIO pin {} is low, showing IP", pin);
            }
            low
        }
        Err(e) => {
            warn!("Failed to read GPIO pin {}: {}", pin, e);
            false
        }
    }
}

#[cfg(not(feature = "gpio"))]
pub fn show_ip_switch(pin: u8) -> bool {
    info!("built without GPIO support, ignoring show-IP switch on pin {}", pin);
    false
}
