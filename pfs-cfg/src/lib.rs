//! Runtime configuration for the `pfs` crates.
//!
//! A [`Config`] is a named, documented setting with a compile time default. Crates declare
//! their configs as `static`s and register them into a [`ConfigSetBuilder`]; the resulting
//! [`ConfigSet`] is cheap to clone and every clone observes updates made through any other.
//!
//! Values can be changed three ways: programmatically with [`ConfigSet::update`], from text
//! with [`ConfigSet::try_update`], or from the environment with
//! [`ConfigSet::apply_env_overrides`], which reads `PFS_<NAME>` for every registered config.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use compact_str::CompactString;
use pfs_ore::assert_none;

/// A single configuration setting.
pub struct Config<V: ConfigDefault> {
    name: &'static str,
    desc: &'static str,
    default: V,
}

impl<V: ConfigDefault> Config<V> {
    /// Define a new [`Config`] with a default value.
    pub const fn new(name: &'static str, desc: &'static str, default: V) -> Self {
        Config {
            name,
            desc,
            default,
        }
    }

    /// Name of this config, also the suffix of its environment override.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the current value of this [`Config`] from `set`.
    ///
    /// # Panics
    /// * If this [`Config`] was never registered with `set`.
    pub fn read(&self, set: &ConfigSet) -> V::Stored {
        let Some(entry) = set.configs.get(self.name) else {
            panic!("tried to read unregistered config {}", self.name);
        };
        V::load(&entry.value)
    }
}

/// A thread-safe, shareable set of [`Config`]s.
#[derive(Clone, Debug)]
pub struct ConfigSet {
    configs: Arc<BTreeMap<CompactString, ConfigSetEntry>>,
}

impl ConfigSet {
    /// Returns a new [`ConfigSetBuilder`].
    pub fn builder() -> ConfigSetBuilder {
        ConfigSetBuilder::default()
    }

    /// Set `config` to `value`.
    ///
    /// # Panics
    /// * If `config` was not registered with the [`ConfigSetBuilder`] this set came from.
    pub fn update<V: ConfigDefault>(&self, config: &'static Config<V>, value: V) {
        let entry = self
            .configs
            .get(config.name)
            .expect("tried to update unregistered config");
        entry.value.store(value.to_value());
    }

    /// Set the config named `name` by parsing `value`.
    ///
    /// # Errors
    ///
    /// * If no config named `name` exists in this set.
    /// * If `value` can't be parsed as the type of the config.
    pub fn try_update(&self, name: &str, value: &str) -> Result<(), anyhow::Error> {
        let entry = self
            .configs
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("no config named '{name}'"))?;
        entry.value.parse_and_store(value)?;
        Ok(())
    }

    /// Overlay every registered config with its `PFS_<NAME>` environment variable, if set.
    ///
    /// Booleans are `false` if [`pfs_ore::env::is_falsey`], everything else is parsed like
    /// [`ConfigSet::try_update`].
    ///
    /// # Errors
    ///
    /// * If a variable is set but can't be parsed, or isn't valid unicode.
    pub fn apply_env_overrides(&self) -> Result<(), anyhow::Error> {
        for (name, entry) in self.configs.iter() {
            let var = pfs_ore::env::override_var(name);
            let Some(raw) = std::env::var_os(&var) else {
                continue;
            };

            match &entry.value {
                SharedValue::Bool(shared) => {
                    let value = !pfs_ore::env::is_falsey(&raw);
                    shared.store(value, Ordering::SeqCst);
                }
                other => {
                    let raw = raw
                        .into_string()
                        .map_err(|raw| anyhow::anyhow!("{var} is not unicode: {raw:?}"))?;
                    other.parse_and_store(&raw)?;
                }
            }
            tracing::debug!(%name, %var, "applied environment override");
        }
        Ok(())
    }
}

impl fmt::Display for ConfigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, entry) in &*self.configs {
            writeln!(f, "{} => {}\n\t└─ '{}'", name, entry.value, entry.desc)?;
        }
        Ok(())
    }
}

/// Single entry within a [`ConfigSet`].
#[derive(Clone, Debug)]
struct ConfigSetEntry {
    value: SharedValue,
    desc: &'static str,
}

/// A builder for a [`ConfigSet`].
#[derive(Default, Debug)]
pub struct ConfigSetBuilder {
    configs: BTreeMap<CompactString, (Value, &'static str)>,
}

impl ConfigSetBuilder {
    /// Register `config` with its default value.
    ///
    /// # Panics
    /// * If a config with the same name was already registered.
    pub fn register<V: ConfigDefault>(&mut self, config: &'static Config<V>) -> &mut Self {
        let value = config.default.to_value();
        let prev = self
            .configs
            .insert(CompactString::const_new(config.name), (value, config.desc));
        assert_none!(prev, "config '{}' registered more than once", config.name);
        self
    }

    /// Consume this builder, producing a [`ConfigSet`].
    pub fn build(self) -> ConfigSet {
        let configs = self
            .configs
            .into_iter()
            .map(|(name, (value, desc))| {
                let entry = ConfigSetEntry {
                    value: value.into_shared(),
                    desc,
                };
                (name, entry)
            })
            .collect();
        ConfigSet {
            configs: Arc::new(configs),
        }
    }
}

/// Types that can be the value of a [`Config`].
pub trait ConfigDefault {
    /// What [`Config::read`] hands back.
    type Stored;

    fn to_value(&self) -> Value;
    fn load(shared: &SharedValue) -> Self::Stored;
}

impl ConfigDefault for bool {
    type Stored = bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn load(shared: &SharedValue) -> bool {
        let SharedValue::Bool(val) = shared else {
            panic!("programming error, found {shared:?} for bool")
        };
        val.load(Ordering::SeqCst)
    }
}

impl ConfigDefault for u64 {
    type Stored = u64;

    fn to_value(&self) -> Value {
        Value::U64(*self)
    }

    fn load(shared: &SharedValue) -> u64 {
        let SharedValue::U64(val) = shared else {
            panic!("programming error, found {shared:?} for u64")
        };
        val.load(Ordering::SeqCst)
    }
}

impl ConfigDefault for &str {
    type Stored = CompactString;

    fn to_value(&self) -> Value {
        Value::String(CompactString::new(self))
    }

    fn load(shared: &SharedValue) -> CompactString {
        let SharedValue::String(val) = shared else {
            panic!("programming error, found {shared:?} for string")
        };
        let read_lock = val.read().expect("SharedValue::String lock poisoned");
        read_lock.clone()
    }
}

/// "Type erased" configuration value.
#[derive(Debug)]
pub enum Value {
    Bool(bool),
    U64(u64),
    String(CompactString),
}

impl Value {
    fn into_shared(self) -> SharedValue {
        match self {
            Value::Bool(val) => SharedValue::Bool(Arc::new(AtomicBool::new(val))),
            Value::U64(val) => SharedValue::U64(Arc::new(AtomicU64::new(val))),
            Value::String(val) => SharedValue::String(Arc::new(RwLock::new(val))),
        }
    }
}

/// Shareable storage for a [`Value`].
#[derive(Clone, Debug)]
pub enum SharedValue {
    Bool(Arc<AtomicBool>),
    U64(Arc<AtomicU64>),
    String(Arc<RwLock<CompactString>>),
}

impl SharedValue {
    fn store(&self, value: Value) {
        match (self, value) {
            (SharedValue::Bool(shared), Value::Bool(val)) => shared.store(val, Ordering::SeqCst),
            (SharedValue::U64(shared), Value::U64(val)) => shared.store(val, Ordering::SeqCst),
            (SharedValue::String(shared), Value::String(val)) => {
                let mut write_lock = shared.write().expect("SharedValue::String lock poisoned");
                *write_lock = val;
            }
            (shared, val) => unreachable!("tried to update shared {shared:?} with {val:?}"),
        }
    }

    fn parse_and_store(&self, value: &str) -> Result<(), anyhow::Error> {
        match self {
            SharedValue::Bool(shared) => {
                let val: bool = value.parse()?;
                shared.store(val, Ordering::SeqCst);
            }
            SharedValue::U64(shared) => {
                let val: u64 = value.parse()?;
                shared.store(val, Ordering::SeqCst);
            }
            SharedValue::String(shared) => {
                let mut write_lock = shared.write().expect("SharedValue::String lock poisoned");
                write_lock.clear();
                write_lock.push_str(value);
            }
        }
        Ok(())
    }
}

impl fmt::Display for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharedValue::Bool(val) => write!(f, "{}", val.load(Ordering::SeqCst)),
            SharedValue::U64(val) => write!(f, "{}", val.load(Ordering::SeqCst)),
            SharedValue::String(val) => {
                let read_lock = val.read().expect("SharedValue::String lock poisoned");
                write!(f, "'{}'", *read_lock)
            }
        }
    }
}
