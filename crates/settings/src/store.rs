use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ron::value::{Map as RonMap, Value as RonValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{Settings, SettingsError};

fn to_ron_value<T: Serialize>(value: &T) -> Result<RonValue, SettingsError> {
    let s = ron::to_string(value)?;
    ron::from_str(&s).map_err(|_| SettingsError::Invalid("parse ron value (internal)"))
}

fn from_ron_value<T: DeserializeOwned>(value: &RonValue) -> Result<T, SettingsError> {
    value
        .clone()
        .into_rust()
        .map_err(|_| SettingsError::Invalid("deserialize section"))
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, SettingsError> {
    lock.read().map_err(|_| SettingsError::Poisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, SettingsError> {
    lock.write().map_err(|_| SettingsError::Poisoned)
}

/// Merge default + delta recursively (maps only).
fn merge_maps(default: &RonMap, delta: &RonMap) -> RonMap {
    let mut merged = default.clone();
    for (k, v_delta) in delta.iter() {
        let next = match (merged.get(k), v_delta) {
            (Some(RonValue::Map(def_m)), RonValue::Map(delta_m)) => {
                RonValue::Map(merge_maps(def_m, delta_m))
            }
            _ => v_delta.clone(),
        };
        merged.insert(k.clone(), next);
    }
    merged
}

/// Recursive diff (new vs default). Keys equal to their default are dropped.
fn diff_map(new_m: &RonMap, def_m: &RonMap) -> RonMap {
    let mut out = RonMap::new();
    for (k, new_v) in new_m.iter() {
        match (new_v, def_m.get(k)) {
            (RonValue::Map(new_sub), Some(RonValue::Map(def_sub))) => {
                let sub = diff_map(new_sub, def_sub);
                if !sub.is_empty() {
                    out.insert(k.clone(), RonValue::Map(sub));
                }
            }
            (_, Some(def_v)) if def_v == new_v => {}
            _ => {
                out.insert(k.clone(), new_v.clone());
            }
        }
    }
    out
}

fn load_deltas(path: &Path) -> Result<HashMap<String, RonValue>, SettingsError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    ron::from_str(&content).map_err(|e| SettingsError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Builder for `SettingsStore` (single delta file).
#[derive(Default)]
pub struct SettingsStoreBuilder {
    settings_file: Option<PathBuf>,
}

impl SettingsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SettingsStore, SettingsError> {
        let file_path = self
            .settings_file
            .ok_or(SettingsError::Invalid("settings file not specified"))?;

        if let Some(dir) = file_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let deltas = load_deltas(&file_path)?;
        debug!(file = %file_path.display(), sections = deltas.len(), "settings loaded");

        Ok(SettingsStore {
            file_path,
            deltas: RwLock::new(deltas),
            defaults: RwLock::new(HashMap::new()),
            values: RwLock::new(HashMap::new()),
        })
    }
}

/// Settings store (thread-safe).
///
/// Sections are registered with their `Default`; the file only ever holds
/// the recursive delta against it.
pub struct SettingsStore {
    file_path: PathBuf,
    deltas: RwLock<HashMap<String, RonValue>>,
    defaults: RwLock<HashMap<&'static str, RonMap>>,
    values: RwLock<HashMap<&'static str, RonValue>>,
}

impl SettingsStore {
    pub fn builder() -> SettingsStoreBuilder {
        SettingsStoreBuilder::new()
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }

    pub fn is_registered<T: Settings>(&self) -> bool {
        read(&self.values)
            .map(|values| values.contains_key(T::name()))
            .unwrap_or(false)
    }

    /// Register a section type (loads defaults and applies an existing delta if present).
    pub fn register<T>(&self) -> Result<(), SettingsError>
    where
        T: Settings + Default + Serialize + DeserializeOwned,
    {
        let section = T::name();
        if read(&self.values)?.contains_key(section) {
            return Err(SettingsError::AlreadyRegistered(section));
        }

        let RonValue::Map(default_map) = to_ron_value(&T::default())? else {
            return Err(SettingsError::Invalid("default must serialize to map"));
        };

        let merged = match read(&self.deltas)?.get(section) {
            Some(RonValue::Map(delta)) => RonValue::Map(merge_maps(&default_map, delta)),
            Some(_) => {
                warn!(section, "ignoring non-map settings delta");
                RonValue::Map(default_map.clone())
            }
            None => RonValue::Map(default_map.clone()),
        };

        // A delta that no longer fits the struct falls back to defaults.
        let merged = if from_ron_value::<T>(&merged).is_ok() {
            merged
        } else {
            warn!(section, "stored settings do not match section, using defaults");
            RonValue::Map(default_map.clone())
        };

        write(&self.defaults)?.insert(section, default_map);
        write(&self.values)?.insert(section, merged);
        Ok(())
    }

    /// Snapshot get (Arc).
    pub fn get<T>(&self) -> Result<Arc<T>, SettingsError>
    where
        T: Settings + DeserializeOwned,
    {
        let values = read(&self.values)?;
        let value = values.get(T::name()).ok_or(SettingsError::NotRegistered)?;
        Ok(Arc::new(from_ron_value(value)?))
    }

    /// Optional variant: None if not registered.
    pub fn try_get<T>(&self) -> Result<Option<Arc<T>>, SettingsError>
    where
        T: Settings + DeserializeOwned,
    {
        let values = read(&self.values)?;
        values
            .get(T::name())
            .map(|value| from_ron_value(value).map(Arc::new))
            .transpose()
    }

    /// Update via mutable closure. Only the delta (recursive) is persisted.
    pub fn update<T, F>(&self, mutator: F) -> Result<(), SettingsError>
    where
        T: Settings + Default + Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let section = T::name();

        let mut current: T = {
            let values = read(&self.values)?;
            from_ron_value(values.get(section).ok_or(SettingsError::NotRegistered)?)?
        };
        mutator(&mut current);

        let RonValue::Map(new_map) = to_ron_value(&current)? else {
            return Err(SettingsError::Invalid("updated must serialize to map"));
        };

        let diff = {
            let defaults = read(&self.defaults)?;
            let default_map = defaults.get(section).ok_or(SettingsError::NotRegistered)?;
            diff_map(&new_map, default_map)
        };

        write(&self.values)?.insert(section, RonValue::Map(new_map));
        {
            let mut deltas = write(&self.deltas)?;
            if diff.is_empty() {
                deltas.remove(section);
            } else {
                deltas.insert(section.to_string(), RonValue::Map(diff));
            }
        }

        self.persist_deltas()
    }

    /// Reset a section back to its defaults and drop its delta.
    pub fn reset<T>(&self) -> Result<(), SettingsError>
    where
        T: Settings + Default + Serialize + DeserializeOwned,
    {
        self.update::<T, _>(|value| *value = T::default())
    }

    /// Reload deltas from disk and re-merge all registered sections.
    pub fn reload(&self) -> Result<(), SettingsError> {
        let new_deltas = load_deltas(&self.file_path)?;
        *write(&self.deltas)? = new_deltas;

        let defaults = read(&self.defaults)?;
        let deltas = read(&self.deltas)?;
        let mut values = write(&self.values)?;
        for (section, default_map) in defaults.iter() {
            let merged = match deltas.get(*section) {
                Some(RonValue::Map(delta)) => RonValue::Map(merge_maps(default_map, delta)),
                _ => RonValue::Map(default_map.clone()),
            };
            values.insert(*section, merged);
        }
        Ok(())
    }

    fn persist_deltas(&self) -> Result<(), SettingsError> {
        let clean: HashMap<String, RonValue> = read(&self.deltas)?
            .iter()
            .filter(|(_, v)| !matches!(v, RonValue::Map(m) if m.is_empty()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let ron_string = ron::ser::to_string_pretty(&clean, ron::ser::PrettyConfig::default())?;

        let tmp = self.file_path.with_extension("tmp");
        fs::write(&tmp, ron_string)?;
        fs::rename(&tmp, &self.file_path)?;
        debug!(file = %self.file_path.display(), "settings persisted");
        Ok(())
    }
}
