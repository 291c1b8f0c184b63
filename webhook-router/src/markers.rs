//! Response markers returned as JSON-encoded strings by the event endpoints.

pub const SUCCESS: &str = "Success";
pub const MALFORMED_REQUEST: &str = "Malformed request";
pub const NO_SUCH_ENDPOINT: &str = "No such endpoint";
pub const SLACK_UNREACHABLE: &str = "Slack unreachable";
