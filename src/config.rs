//! This module provides the generator configuration and utilities for loading it from TOML files.
//!
//! It defines the `GeneratorConfig` struct, which names the shell pairs to dispatch and
//! differentiate, the storage strategy of each generated class, the auxiliary orders and the
//! recursion directions. Shell-pair keys may be written either as shell labels (`"DP"`) or as
//! degree tuples (`"2,1"`), so hand-written configuration files stay readable.

use super::error::GenError;
use crate::types::{ShellPair, Side};
use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

/// Requested storage strategy for a shell pair, before budget checks.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPreference {
    /// Full register storage when the class fits the register budget, global store otherwise.
    #[default]
    Auto,
    FullRegister,
    PartialRegister,
    GlobalStore,
}

/// Build configuration of one generation run.
///
/// Everything here influences the emitted kernels. Purely cosmetic emission choices (function
/// qualifier, scalar type name) live in `EmitOptions` instead.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Emit `DEBUG_OEI`-guarded print statements and the debug stream.
    #[serde(default)]
    pub debug: bool,

    /// Dimension of the store buffer (`STOREDIM`).
    ///
    /// Must cover every global component index of every generated shell.
    #[serde(default = "default_store_dim")]
    pub store_dim: usize,

    /// Largest number of named values a full-register class may hold.
    #[serde(default = "default_register_budget")]
    pub register_budget: usize,

    /// Strategy for shell pairs without an explicit entry in `strategies`.
    #[serde(default)]
    pub default_strategy: StrategyPreference,

    /// Shell pairs that receive a branch in the integral assembly dispatcher.
    #[serde(default, deserialize_with = "deserialize_pair_list")]
    pub dispatch: Vec<ShellPair>,

    /// Shell pairs that receive a branch in the gradient assembler.
    #[serde(default, deserialize_with = "deserialize_pair_list")]
    pub gradient: Vec<ShellPair>,

    /// Explicit storage strategy per shell pair.
    #[serde(default, deserialize_with = "deserialize_pair_map")]
    pub strategies: HashMap<ShellPair, StrategyPreference>,

    /// Explicit maximum auxiliary order per shell pair.
    ///
    /// Pairs not listed get exactly the order their consumers require.
    #[serde(default, deserialize_with = "deserialize_pair_map")]
    pub max_auxiliary_order: HashMap<ShellPair, u32>,

    /// Recursion direction overrides per shell pair.
    #[serde(default, deserialize_with = "deserialize_pair_map")]
    pub raise_side: HashMap<ShellPair, Side>,
}

fn default_store_dim() -> usize {
    35
}

fn default_register_budget() -> usize {
    36
}

impl GeneratorConfig {
    /// Loads a generator configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the TOML file containing the configuration.
    ///
    /// # Errors
    ///
    /// Returns a `GenError::IoError` if the file cannot be read, or a
    /// `GenError::DeserializationError` if the TOML content is invalid or contains
    /// unrecognized shell-pair keys.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use oeigen::GeneratorConfig;
    /// use std::path::Path;
    ///
    /// let config = GeneratorConfig::load_from_file(Path::new("oeigen.toml")).unwrap();
    /// ```
    pub fn load_from_file(path: &Path) -> Result<Self, GenError> {
        let content = std::fs::read_to_string(path).map_err(|io_error| GenError::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })?;

        Self::load_from_str(&content)
    }

    /// Parses a generator configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `GenError::DeserializationError` if the TOML content is invalid or contains
    /// unrecognized shell-pair keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use oeigen::GeneratorConfig;
    ///
    /// let toml_data = r#"
    /// dispatch = ["PS", "1,1"]
    ///
    /// [strategies]
    /// PP = "global_store"
    /// "#;
    ///
    /// let config = GeneratorConfig::load_from_str(toml_data).unwrap();
    /// assert_eq!(config.dispatch.len(), 2);
    /// assert_eq!(config.store_dim, 35);
    /// ```
    pub fn load_from_str(toml_str: &str) -> Result<Self, GenError> {
        toml::from_str(toml_str).map_err(GenError::from)
    }

    /// Creates a configuration that requests nothing, with default limits.
    pub fn new() -> Self {
        GeneratorConfig {
            debug: false,
            store_dim: default_store_dim(),
            register_budget: default_register_budget(),
            default_strategy: StrategyPreference::Auto,
            dispatch: Vec::new(),
            gradient: Vec::new(),
            strategies: HashMap::new(),
            max_auxiliary_order: HashMap::new(),
            raise_side: HashMap::new(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a shell-pair key: either two shell letters (`"DP"`) or two degrees (`"2,1"`).
pub fn parse_pair_key(key: &str) -> Option<ShellPair> {
    let key = key.trim();
    if let Some((bra, ket)) = key.split_once(',') {
        let bra = bra.trim().parse::<u8>().ok()?;
        let ket = ket.trim().parse::<u8>().ok()?;
        return ShellPair::from_degrees(bra, ket).ok();
    }
    ShellPair::from_label(key)
}

fn pair_key<E: de::Error>(key: &str) -> Result<ShellPair, E> {
    parse_pair_key(key).ok_or_else(|| E::custom(format!("invalid shell pair key: '{}'", key)))
}

/// Deserializes a list of shell-pair keys.
fn deserialize_pair_list<'de, D>(deserializer: D) -> Result<Vec<ShellPair>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairListVisitor;

    impl<'de> Visitor<'de> for PairListVisitor {
        type Value = Vec<ShellPair>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a list of shell pairs such as \"DP\" or \"2,1\"")
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(key) = seq.next_element::<String>()? {
                pairs.push(pair_key::<S::Error>(&key)?);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_seq(PairListVisitor)
}

/// Deserializes a table keyed by shell pairs.
fn deserialize_pair_map<'de, D, V>(deserializer: D) -> Result<HashMap<ShellPair, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct PairMapVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for PairMapVisitor<V> {
        type Value = HashMap<ShellPair, V>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map from shell pair to value")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut entries = HashMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                entries.insert(pair_key::<M::Error>(&key)?, value);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(PairMapVisitor(PhantomData))
}
