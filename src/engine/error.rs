/*
 *  engine/error.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Engine error taxonomy
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

use thiserror::Error;

/// Reasons a command is rejected by the engine.
///
/// A rejected command never mutates engine state; the tick loop carries on
/// as if it had not been sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Out-of-range number, malformed time, bad count/length.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Hex string of the wrong shape or a name missing from the color table.
    #[error("unknown color: {0}")]
    UnknownColor(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidArgument(msg.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
