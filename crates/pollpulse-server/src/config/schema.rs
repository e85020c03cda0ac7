use serde::Deserialize;

use pollpulse_core::{PollError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub poll: PollSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerSection::default(),
            poll: PollSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PollError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.server.validate()?;
        self.poll.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound on concurrently open poll sessions. Requests beyond the
    /// bound get 503 instead of a session.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.max_sessions == 0 {
            return Err(PollError::BadRequest(
                "server.max_sessions must be positive".into(),
            ));
        }
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(PollError::BadRequest(
                "server.listen must be a valid socket address".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSection {
    /// Applied when `timeout` is absent or unparsable.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Applied when `interval` is absent, unparsable, or zero.
    #[serde(default = "default_interval_ms")]
    pub default_interval_ms: u64,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            default_interval_ms: default_interval_ms(),
        }
    }
}

impl PollSection {
    pub fn validate(&self) -> Result<()> {
        if self.default_interval_ms == 0 {
            return Err(PollError::BadRequest(
                "poll.default_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn default_version() -> u32 {
    1
}
fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_max_sessions() -> usize {
    1024
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_interval_ms() -> u64 {
    500
}
