use anyhow::Result;
use regex::Regex;
use std::env;
use std::sync::OnceLock;
use tracing::{debug, warn};

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{(\w+)(?::-([^}]*))?\}|\$(\w+)").expect("placeholder pattern is valid")
    })
}

/// Substitute environment variables written as `${VAR}`, `${VAR:-default}` or `$VAR`.
///
/// Unset variables without a default keep their placeholder so the validator
/// can report them.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let mut missing_vars = Vec::new();

    let result = placeholder_re().replace_all(content, |caps: &regex::Captures| {
        let placeholder = caps.get(0).map_or("", |m| m.as_str());
        let Some(var_name) = caps.get(1).or_else(|| caps.get(3)).map(|m| m.as_str()) else {
            return placeholder.to_string();
        };

        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {}", var_name);
                value
            }
            Err(_) => match caps.get(2) {
                Some(default) => {
                    debug!("Environment variable '{}' not set, using inline default", var_name);
                    default.as_str().to_string()
                }
                None => {
                    warn!("Environment variable '{}' not set", var_name);
                    missing_vars.push(var_name.to_string());
                    placeholder.to_string()
                }
            },
        }
    });

    if !missing_vars.is_empty() {
        debug!("Unresolved environment variables: {:?}", missing_vars);
    }

    Ok(result.into_owned())
}

/// Check if a string still contains environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    placeholder_re().is_match(content)
}
