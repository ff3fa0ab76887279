//! Home Assistant configuration discovery.
//!
//! Reads `configuration.yaml` with the custom tags Home Assistant adds to
//! YAML and extracts the recorder database URL from it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{
    self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Number, Value};
use tracing::{debug, warn};

use super::url::DatabaseUrl;
use crate::error::ConfigError;

/// Name of the main configuration file.
pub const CONFIGURATION_FILE: &str = "configuration.yaml";

/// Name of the secrets file resolved by `!secret`.
pub const SECRETS_FILE: &str = "secrets.yaml";

/// Default SQLite recorder database inside the config directory.
pub const DEFAULT_DATABASE_FILE: &str = "home-assistant_v2.db";

/// Config directory inside a Supervisor-managed install.
pub const HASSIO_CONFIG_DIR: &str = "/config";

/// Tags that are accepted but not expanded.
const STUB_TAGS: [&str; 5] = [
    "env_var",
    "include_dir_list",
    "include_dir_merge_list",
    "include_dir_named",
    "include_dir_merge_named",
];

/// `%APPDATA%/.homeassistant` on Windows, `~/.homeassistant` elsewhere.
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    let base = if cfg!(windows) {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        dirs::home_dir()
    };
    base.map(|dir| dir.join(".homeassistant"))
}

/// Locate the Home Assistant config directory of this machine.
///
/// # Errors
/// Returns [`ConfigError::HassConfigNotFound`] when no directory exists.
pub fn find_config_dir() -> Result<PathBuf, ConfigError> {
    resolve_config_dir(
        std::env::var_os("HASSIO_TOKEN").is_some(),
        default_config_dir(),
    )
}

fn resolve_config_dir(hassio: bool, default: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if hassio {
        return Ok(PathBuf::from(HASSIO_CONFIG_DIR));
    }
    default
        .filter(|dir| dir.is_dir())
        .ok_or(ConfigError::HassConfigNotFound)
}

/// Load a YAML file, expanding Home Assistant tags.
///
/// # Errors
/// Returns an error if the file or an included file cannot be read or
/// parsed, or a secret cannot be resolved.
pub fn load_yaml(path: &Path) -> Result<Value, ConfigError> {
    let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
    YamlLoader::new(root).load(path)
}

/// Load `configuration.yaml` from a config directory.
///
/// # Errors
/// See [`load_yaml`].
pub fn load_hass_config(config_dir: &Path) -> Result<Value, ConfigError> {
    YamlLoader::new(config_dir.to_path_buf()).load(&config_dir.join(CONFIGURATION_FILE))
}

/// Recorder database URL of a config directory.
///
/// Uses `recorder.db_url` when set, otherwise the default SQLite file if it
/// exists.
///
/// # Errors
/// Returns [`ConfigError::DatabaseUrlNotFound`] when neither is available.
pub fn db_url_from_config_dir(config_dir: &Path) -> Result<DatabaseUrl, ConfigError> {
    let config = load_hass_config(config_dir)?;
    let configured = config
        .get("recorder")
        .and_then(|recorder| recorder.get("db_url"))
        .and_then(Value::as_str);
    if let Some(url) = configured {
        debug!(config_dir = %config_dir.display(), "using recorder.db_url");
        return DatabaseUrl::parse(url);
    }

    let default_path = config_dir.join(DEFAULT_DATABASE_FILE);
    if default_path.is_file() {
        return Ok(DatabaseUrl::sqlite_file(&default_path));
    }
    Err(ConfigError::DatabaseUrlNotFound {
        path: config_dir.display().to_string(),
    })
}

/// Expands `!secret`, `!include` and the stubbed directory tags.
struct YamlLoader {
    root: PathBuf,
    warned: HashSet<String>,
}

impl YamlLoader {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            warned: HashSet::new(),
        }
    }

    fn load(&mut self, path: &Path) -> Result<Value, ConfigError> {
        let value = read_yaml(path)?;
        self.resolve(value, path)
    }

    fn resolve(&mut self, value: Value, file: &Path) -> Result<Value, ConfigError> {
        match value {
            Value::Mapping(mapping) => {
                let mut resolved = Mapping::with_capacity(mapping.len());
                for (key, value) in mapping {
                    resolved.insert(key, self.resolve(value, file)?);
                }
                Ok(Value::Mapping(resolved))
            }
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| self.resolve(item, file))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence),
            Value::Tagged(tagged) => {
                let tag = tagged.tag.to_string();
                let name = tag.trim_start_matches('!');
                let argument = tagged.value.as_str().unwrap_or_default().trim().to_string();
                match name {
                    "secret" => self.secret(&argument, file),
                    "include" => {
                        let target = file.parent().unwrap_or(Path::new("")).join(&argument);
                        self.load(&target)
                    }
                    stub if STUB_TAGS.contains(&stub) => {
                        if self.warned.insert(tag.clone()) {
                            warn!(tag = %tag, "YAML tag is not supported");
                        }
                        Ok(Value::Mapping(Mapping::new()))
                    }
                    _ => Err(ConfigError::UnsupportedTag { tag: tag.clone() }),
                }
            }
            other => Ok(other),
        }
    }

    /// Look up a secret in `secrets.yaml`, starting next to `file` and
    /// walking up to the config root.
    fn secret(&self, name: &str, file: &Path) -> Result<Value, ConfigError> {
        let mut found_file = false;
        let mut dir = file.parent();
        while let Some(current) = dir {
            let candidate = current.join(SECRETS_FILE);
            if candidate.is_file() {
                found_file = true;
                if let Some(value) = read_yaml(&candidate)?.get(name) {
                    return Ok(value.clone());
                }
            }
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            dir = current.parent();
        }

        if found_file {
            Err(ConfigError::SecretNotFound {
                name: name.to_string(),
            })
        } else {
            let nearest = file.parent().unwrap_or(Path::new("")).join(SECRETS_FILE);
            Err(ConfigError::SecretsFileNotFound {
                path: nearest.display().to_string(),
            })
        }
    }
}

fn read_yaml(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
    if content.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    let LastKeyWins(value) =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
    Ok(match value {
        Value::Null => Value::Mapping(Mapping::new()),
        other => other,
    })
}

/// YAML document in which a repeated mapping key keeps its last value,
/// as Home Assistant does.
struct LastKeyWins(Value);

impl<'de> Deserialize<'de> for LastKeyWins {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LastKeyWinsVisitor).map(LastKeyWins)
    }
}

struct LastKeyWinsVisitor;

impl<'de> Visitor<'de> for LastKeyWinsVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        LastKeyWins::deserialize(deserializer).map(|LastKeyWins(value)| value)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(LastKeyWins(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut mapping = Mapping::new();
        while let Some((LastKeyWins(key), LastKeyWins(value))) = map.next_entry()? {
            if mapping.insert(key, value).is_some() {
                debug!("duplicate YAML key replaced by its last value");
            }
        }
        Ok(Value::Mapping(mapping))
    }

    fn visit_enum<A>(self, data: A) -> Result<Value, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (tag, contents) = data.variant::<String>()?;
        let LastKeyWins(value) = contents.newtype_variant()?;
        Ok(Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(tag),
            value,
        })))
    }
}
