//! `${VAR}` expansion in path-like configuration values.

use std::env::VarError;

use crate::ConfigError;

/// Variable referenced by a configuration value but not set.
struct UnsetVar(String);

fn lookup(name: &str) -> Result<Option<String>, UnsetVar> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent | VarError::NotUnicode(_)) => Err(UnsetVar(name.to_owned())),
    }
}

/// Expand `${VAR}` and `${VAR:-default}` in an optional setting, in place.
///
/// Values without `${` are kept as written, so a bare `$VAR` stays literal.
/// `field` names the setting in the error.
pub(crate) fn expand_field(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    let Some(raw) = value.as_deref().filter(|raw| raw.contains("${")) else {
        return Ok(());
    };

    let expanded = shellexpand::env_with_context(raw, lookup)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        })?
        .into_owned();
    *value = Some(expanded);
    Ok(())
}
