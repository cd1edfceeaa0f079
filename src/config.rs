use crate::{LoaderError, LoaderResult};
use config::{Config, File, FileFormat, Map, Source, Value};
use std::collections::BTreeMap;
use std::path::Path;

const URL_KEYS: &[&str] = &["url", "jdbc.url"];
const USER_KEYS: &[&str] = &["user", "username", "jdbc.user", "jdbc.username"];
const PASSWORD_KEYS: &[&str] = &["password", "jdbc.password"];
const DRIVER_KEYS: &[&str] = &["driver", "jdbc.driver"];

// Key/value settings needed to open one database connection.
// Keys are lower-case and dotted (jdbc.url), values are kept verbatim.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionParameters {
    values: BTreeMap<String, String>,
}

impl ConnectionParameters {
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into().to_lowercase(), v.into()))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.first_of(URL_KEYS)
    }

    pub fn user(&self) -> Option<&str> {
        self.first_of(USER_KEYS)
    }

    pub fn password(&self) -> Option<&str> {
        self.first_of(PASSWORD_KEYS)
    }

    pub fn driver(&self) -> Option<&str> {
        self.first_of(DRIVER_KEYS)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.values.get(*k))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

// Passwords stay out of logs
impl std::fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.values {
            if key.contains("password") {
                map.entry(key, &"***");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

// Reads connection properties files. The format follows the extension:
// yaml/yml, toml and json are read as such, anything else as key=value lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyLoader;

impl PropertyLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_properties(&self, path: &Path) -> LoaderResult<ConnectionParameters> {
        let config_error = |message: String| LoaderError::Configuration {
            path: path.to_path_buf(),
            message,
        };

        if !path.is_file() {
            return Err(config_error("file not found".to_string()));
        }

        let config = Config::builder()
            .add_source(File::from(path).format(format_for(path)).required(true))
            .build()
            .map_err(|e| config_error(e.to_string()))?;
        let table = config.collect().map_err(|e| config_error(e.to_string()))?;

        let mut values = BTreeMap::new();
        flatten("", table, &mut values);
        tracing::debug!(path = %path.display(), keys = values.len(), "loaded connection properties");

        Ok(ConnectionParameters { values })
    }
}

fn format_for(path: &Path) -> FileFormat {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "yaml" | "yml" => FileFormat::Yaml,
        "toml" => FileFormat::Toml,
        "json" => FileFormat::Json,
        _ => FileFormat::Ini,
    }
}

// Nested tables come back as dotted keys so jdbc.url survives either layout
fn flatten(prefix: &str, table: Map<String, Value>, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key.to_lowercase()
        } else {
            format!("{}.{}", prefix, key.to_lowercase())
        };

        match value.clone().into_table() {
            Ok(nested) => flatten(&key, nested, out),
            Err(_) => match value.into_string() {
                Ok(s) => {
                    out.insert(key, s);
                }
                Err(e) => tracing::debug!(%key, error = %e, "skipping non-scalar property"),
            },
        }
    }
}
