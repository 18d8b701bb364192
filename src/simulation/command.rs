use crate::ccp::waterfall::WaterfallReport;
use crate::core::entity::EntityId;
use crate::simulation::clock::ClockState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator actions accepted between ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "entity", rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    /// Push an alerted entity into default.
    Crash(EntityId),
    /// Run the CCP waterfall on a defaulted entity.
    Recover(EntityId),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Start => write!(f, "start"),
            Command::Pause => write!(f, "pause"),
            Command::Crash(id) => write!(f, "crash({})", id),
            Command::Recover(id) => write!(f, "recover({})", id),
        }
    }
}

/// What an accepted command changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Clock {
        previous: ClockState,
        current: ClockState,
    },
    Defaulted {
        entity: EntityId,
    },
    Recovered {
        report: WaterfallReport,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        assert_eq!(Command::Crash(EntityId::new("NanoMed")).to_string(), "crash(NanoMed)");
        assert_eq!(Command::Start.to_string(), "start");
    }

    #[test]
    fn test_command_json_shape() {
        let cmd: Command =
            serde_json::from_str(r#"{ "command": "recover", "entity": "TechCorp" }"#).unwrap();
        assert_eq!(cmd, Command::Recover(EntityId::new("TechCorp")));

        let start: Command = serde_json::from_str(r#"{ "command": "start" }"#).unwrap();
        assert_eq!(start, Command::Start);
    }
}
