//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Movi Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[agent]
# base_url = "http://127.0.0.1:8000"   # overridden by MOVI_AGENT_URL
# invoke_path = "/invoke_agent"
# health_path = "/health"
# connect_timeout_secs = 10            # 1-60
# request_timeout_secs = 120           # 1-600

[session]
# greeting = "👋 Hi! I'm Movi. You can now upload images for context. How can I help?"
# default_page = "busDashboard"
# max_image_bytes = 5242880            # 1024-20971520

[speech]
# tts_enabled = false
# synthesizer = ""                     # empty = auto-detect (say, espeak-ng, espeak, spd-say)
# voice = ""
# rate = 175                           # 80-450 words per minute
# recognition_language = "en-US"
# whisper_model = "whisper-1"          # API key read from OPENAI_API_KEY
# whisper_url = "https://api.openai.com/v1/audio/transcriptions"

[routing]
# osrm_url = "https://router.project-osrm.org"
# profile = "driving"                  # driving, walking, cycling
# timeout_secs = 10                    # 1-60

[logging]
# level = "INFO"                       # TRACE, DEBUG, INFO, WARNING, ERROR
"##
}
