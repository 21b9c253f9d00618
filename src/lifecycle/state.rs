//! Service lifecycle states.
//!
//! ```text
//! Idle → Starting → Running → Stopping → Idle
//!            └──────(failure)──────────→ Idle
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
}

impl ServiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Idle => "idle",
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::Stopping => "stopping",
        }
    }

    /// Whether `start` may begin from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, ServiceState::Idle)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_can_start() {
        assert!(ServiceState::Idle.can_start());
        for state in [ServiceState::Starting, ServiceState::Running, ServiceState::Stopping] {
            assert!(!state.can_start(), "{state} must not start");
        }
    }

    #[test]
    fn default_is_idle() {
        assert_eq!(ServiceState::default(), ServiceState::Idle);
        assert_eq!(ServiceState::default().to_string(), "idle");
    }
}
