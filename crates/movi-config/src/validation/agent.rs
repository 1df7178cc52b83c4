//! Validation for the `[agent]` section.

use crate::schema::MoviConfig;

use super::helpers::{validate_http_url, validate_range};

pub(crate) fn validate_agent(errors: &mut Vec<String>, config: &MoviConfig) {
    let agent = &config.agent;
    validate_http_url(errors, "agent.base_url", &agent.base_url);

    for (name, path) in [
        ("agent.invoke_path", &agent.invoke_path),
        ("agent.health_path", &agent.health_path),
    ] {
        if !path.starts_with('/') {
            errors.push(format!("{name} = {path:?} must start with '/'"));
        }
    }

    validate_range(
        errors,
        "agent.connect_timeout_secs",
        agent.connect_timeout_secs.into(),
        1,
        60,
    );
    validate_range(
        errors,
        "agent.request_timeout_secs",
        agent.request_timeout_secs.into(),
        1,
        600,
    );
    if agent.connect_timeout_secs > agent.request_timeout_secs {
        errors.push(format!(
            "agent.connect_timeout_secs = {} exceeds agent.request_timeout_secs = {}",
            agent.connect_timeout_secs, agent.request_timeout_secs
        ));
    }
}
