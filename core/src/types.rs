//! Domain types for the BMC API.
//!
//! # Design
//! Node and power-state arguments are validated into newtypes before any
//! request is built, so an out-of-range value can never reach the wire.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Firmware and network details reported by `opt=get&type=other`.
///
/// Values are passed through verbatim; the BMC reports `"Unknown"` for
/// fields it cannot determine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherInfo {
    pub api: String,
    pub build_version: String,
    pub buildroot: String,
    pub buildtime: String,
    pub ip: String,
    pub mac: String,
    pub version: String,
}

impl OtherInfo {
    pub(crate) fn from_map(mut map: HashMap<String, String>) -> Self {
        let mut take = |key: &str| map.remove(key).unwrap_or_default();
        Self {
            api: take("api"),
            build_version: take("build_version"),
            buildroot: take("buildroot"),
            buildtime: take("buildtime"),
            ip: take("ip"),
            mac: take("mac"),
            version: take("version"),
        }
    }
}

/// Power state of every node, keyed as the BMC names them (`node1`..`node4`).
pub type PowerStatus = HashMap<String, String>;

/// One of the four compute module slots, indexed 0 through 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node(u8);

impl Node {
    pub const COUNT: u8 = 4;

    pub fn new(index: u8) -> Result<Self, Error> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(Error::Validation("node number must be between 0 and 3"))
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Node {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Node::new(index)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Requested power state for `set_power`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Off = 0,
    On = 1,
}

impl TryFrom<u8> for PowerState {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PowerState::Off),
            1 => Ok(PowerState::On),
            _ => Err(Error::Validation("power state must be 0 (off) or 1 (on)")),
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_accepts_zero_through_three() {
        for n in 0..=3u8 {
            assert_eq!(Node::new(n).unwrap().index(), n);
        }
    }

    #[test]
    fn node_rejects_everything_else() {
        for n in 4..=u8::MAX {
            assert!(matches!(Node::new(n), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn power_state_round_trips_through_display() {
        assert_eq!(PowerState::try_from(0).unwrap().to_string(), "0");
        assert_eq!(PowerState::try_from(1).unwrap().to_string(), "1");
        assert!(matches!(PowerState::try_from(2), Err(Error::Validation(_))));
    }

    #[test]
    fn other_info_missing_keys_are_empty() {
        let mut map = HashMap::new();
        map.insert("api".to_string(), "1.1".to_string());
        map.insert("unrelated".to_string(), "x".to_string());
        let info = OtherInfo::from_map(map);
        assert_eq!(info.api, "1.1");
        assert_eq!(info.version, "");
        assert_eq!(info.mac, "");
    }
}
