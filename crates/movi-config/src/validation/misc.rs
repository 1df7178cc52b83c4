//! Validation for the smaller sections: session, speech and routing.

use crate::schema::MoviConfig;

use super::helpers::{validate_http_url, validate_not_blank, validate_range};

const OSRM_PROFILES: &[&str] = &["driving", "walking", "cycling"];

pub(crate) fn validate_session(errors: &mut Vec<String>, config: &MoviConfig) {
    validate_not_blank(errors, "session.default_page", &config.session.default_page);
    validate_range(
        errors,
        "session.max_image_bytes",
        config.session.max_image_bytes,
        1024,
        20 * 1024 * 1024,
    );
}

pub(crate) fn validate_speech(errors: &mut Vec<String>, config: &MoviConfig) {
    validate_range(errors, "speech.rate", config.speech.rate.into(), 80, 450);
    validate_not_blank(errors, "speech.whisper_model", &config.speech.whisper_model);
    validate_http_url(errors, "speech.whisper_url", &config.speech.whisper_url);
}

pub(crate) fn validate_routing(errors: &mut Vec<String>, config: &MoviConfig) {
    validate_http_url(errors, "routing.osrm_url", &config.routing.osrm_url);
    if !OSRM_PROFILES.contains(&config.routing.profile.as_str()) {
        errors.push(format!(
            "routing.profile = {:?} must be one of {}",
            config.routing.profile,
            OSRM_PROFILES.join(", ")
        ));
    }
    validate_range(
        errors,
        "routing.timeout_secs",
        config.routing.timeout_secs.into(),
        1,
        60,
    );
}
