//
// Copyright (c) 2023 ZettaScale Technology
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ZettaScale Zenoh Team, <zenoh@zettascale.tech>
//
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::result::KResult;

kconfigurable! {
    pub(crate) static ref API_DATA_RECEPTION_CHANNEL_SIZE: usize = 256;
    pub(crate) static ref API_QUERY_RECEPTION_CHANNEL_SIZE: usize = 256;
    pub(crate) static ref API_REPLY_EMISSION_CHANNEL_SIZE: usize = 256;
    pub(crate) static ref API_REPLY_RECEPTION_CHANNEL_SIZE: usize = 256;
}

/// The configuration of a [`Session`](crate::Session).
///
/// Every field has a default, so `Config::default()` is a valid
/// configuration. The channel size defaults can be overridden at build time
/// through environment variables named after the corresponding
/// `API_*_CHANNEL_SIZE` constants.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The session identifier, as an hexadecimal string. A random one is
    /// generated when unset.
    pub id: Option<String>,
    /// Capacity of each subscriber's sample channel.
    pub data_reception_channel_size: usize,
    /// Capacity of each queryable's query channel.
    pub query_reception_channel_size: usize,
    /// Capacity of the channel carrying replies from queryables to the
    /// consolidation task.
    pub reply_emission_channel_size: usize,
    /// Capacity of the reply channel handed back by `get`.
    pub reply_reception_channel_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            id: None,
            data_reception_channel_size: *API_DATA_RECEPTION_CHANNEL_SIZE,
            query_reception_channel_size: *API_QUERY_RECEPTION_CHANNEL_SIZE,
            reply_emission_channel_size: *API_REPLY_EMISSION_CHANNEL_SIZE,
            reply_reception_channel_size: *API_REPLY_RECEPTION_CHANNEL_SIZE,
        }
    }
}

impl Config {
    /// Loads a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> KResult<Config> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| kerror!(e => "Unable to read configuration file {:?}", path))?;
        content.parse()
    }

    /// Sets the value at a `/`-separated key path, e.g.
    /// `insert_json("data_reception_channel_size", "64")`. The value must be
    /// valid JSON and the resulting document must still be a valid
    /// configuration.
    pub fn insert_json(&mut self, key: &str, value: &str) -> KResult<()> {
        let value: serde_json::Value = serde_json::from_str(value)
            .map_err(|e| kerror!(e => "Unable to parse `{}` as JSON", value))?;
        let mut doc = serde_json::to_value(&*self)
            .map_err(|e| kerror!(e => "Unable to serialize the configuration"))?;
        let mut target = &mut doc;
        for segment in key.split('/').filter(|s| !s.is_empty()) {
            target = match target {
                serde_json::Value::Object(map) => {
                    map.entry(segment).or_insert(serde_json::Value::Null)
                }
                _ => bail!("Unable to set `{}`: not an object path", key),
            };
        }
        *target = value;
        *self = serde_json::from_value(doc)
            .map_err(|e| kerror!(e => "Invalid configuration value for `{}`", key))?;
        Ok(())
    }
}

impl FromStr for Config {
    type Err = crate::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
            .map_err(|e| kerror!(e => "Unable to parse the configuration").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert!(config.id.is_none());
        assert_eq!(
            config.data_reception_channel_size,
            *API_DATA_RECEPTION_CHANNEL_SIZE
        );
    }

    #[test]
    fn config_parsing() {
        let config: Config = "{}".parse().unwrap();
        assert_eq!(config, Config::default());

        let config: Config = r#"{"id": "ab01", "data_reception_channel_size": 16}"#
            .parse()
            .unwrap();
        assert_eq!(config.id.as_deref(), Some("ab01"));
        assert_eq!(config.data_reception_channel_size, 16);
        assert_eq!(
            config.reply_reception_channel_size,
            Config::default().reply_reception_channel_size
        );

        assert!("{not json}".parse::<Config>().is_err());
        assert!(r#"{"unknown_field": 1}"#.parse::<Config>().is_err());
    }

    #[test]
    fn config_insert_json() {
        let mut config = Config::default();
        config.insert_json("query_reception_channel_size", "32").unwrap();
        assert_eq!(config.query_reception_channel_size, 32);
        config.insert_json("id", "\"cafe\"").unwrap();
        assert_eq!(config.id.as_deref(), Some("cafe"));

        // Unknown keys and type mismatches leave the value rejected.
        assert!(config.insert_json("no_such_knob", "1").is_err());
        assert!(config
            .insert_json("data_reception_channel_size", "\"many\"")
            .is_err());
    }
}
