//! Configuration access port trait.

use crate::domain::error::EngineError;

/// Sectioned key/value configuration. Implementors supply raw strings; the
/// typed getters parse them and treat a blank value as absent.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, EngineError> {
        typed(self.get_string(section, key), section, key, "an integer", |v| {
            v.parse().ok()
        })
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, EngineError> {
        typed(self.get_string(section, key), section, key, "a finite number", |v| {
            v.parse::<f64>().ok().filter(|x| x.is_finite())
        })
    }

    /// Accepts true/yes/on/1 and false/no/off/0, any case.
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, EngineError> {
        typed(self.get_string(section, key), section, key, "a boolean", |v| {
            match v.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            }
        })
    }
}

fn typed<T>(
    raw: Option<String>,
    section: &str,
    key: &str,
    expected: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, EngineError> {
    let Some(raw) = raw else { return Ok(None) };
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse(value).map(Some).ok_or_else(|| EngineError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("expected {}, got '{}'", expected, value),
    })
}
