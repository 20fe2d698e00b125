//! Request headers supplied to each fetch

use crate::config::HeaderConfig;
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Supplies the headers for one request
pub trait HeaderSource: Send + Sync {
    fn headers(&self) -> HeaderMap;
}

/// Fixed headers for every request
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders(pub HeaderMap);

impl HeaderSource for StaticHeaders {
    fn headers(&self) -> HeaderMap {
        self.0.clone()
    }
}

/// Cycles through a pool of user agents, one per request
#[derive(Debug)]
pub struct UserAgentRotation {
    agents: Vec<HeaderValue>,
    next: AtomicUsize,
}

impl UserAgentRotation {
    pub fn new(agents: Vec<HeaderValue>) -> Result<Self, ConfigError> {
        if agents.is_empty() {
            return Err(ConfigError::Validation(
                "user agent pool cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            agents,
            next: AtomicUsize::new(0),
        })
    }

    pub fn from_config(config: &HeaderConfig) -> Result<Self, ConfigError> {
        let agents = config
            .user_agents
            .iter()
            .map(|agent| {
                HeaderValue::from_str(agent)
                    .map_err(|_| ConfigError::InvalidHeader(format!("user agent '{}'", agent)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(agents)
    }
}

impl HeaderSource for UserAgentRotation {
    fn headers(&self) -> HeaderMap {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.agents.len();

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.agents[index].clone());
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers
    }
}
