//! Player-facing messages produced by commands and ticks.

use std::fmt;

use bevy_ecs::prelude::*;
use serde::Serialize;
use sim_econ::format_amount;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Flash {
        text: String,
    },
    EventStarted {
        id: String,
        name: String,
        desc: String,
        duration_secs: u32,
    },
    EventEnded {
        name: String,
    },
    RunComplete {
        year: u32,
        total_gained: f64,
        prestige_gain: u64,
    },
    AchievementUnlocked {
        id: &'static str,
        name: &'static str,
        desc: &'static str,
    },
}

impl Notice {
    pub fn flash(text: impl Into<String>) -> Self {
        Self::Flash { text: text.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flash { text } => f.write_str(text),
            Self::EventStarted {
                name,
                desc,
                duration_secs,
                ..
            } => write!(f, "Event: {name}. {desc} ({duration_secs}s)"),
            Self::EventEnded { name } => write!(f, "Event ended: {name}"),
            Self::RunComplete {
                year,
                total_gained,
                prestige_gain,
            } => write!(
                f,
                "Run complete: year {year} reached with {} GDP gained. Prestige for +{prestige_gain} influence.",
                format_amount(*total_gained)
            ),
            Self::AchievementUnlocked { name, desc, .. } => {
                write!(f, "Achievement unlocked: {name} ({desc})")
            }
        }
    }
}

/// Anything that collects notices.
pub trait NoticeSink {
    fn push(&mut self, notice: Notice);
}

impl NoticeSink for Vec<Notice> {
    fn push(&mut self, notice: Notice) {
        Vec::push(self, notice);
    }
}

/// Notices queued since the last drain.
#[derive(Resource, Debug, Default)]
pub struct NoticeLog(pub Vec<Notice>);

impl NoticeSink for NoticeLog {
    fn push(&mut self, notice: Notice) {
        self.0.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_run_complete() {
        let n = Notice::RunComplete {
            year: 2020,
            total_gained: 4_000_000.0,
            prestige_gain: 2,
        };
        assert_eq!(
            n.to_string(),
            "Run complete: year 2020 reached with 4.00M GDP gained. Prestige for +2 influence."
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let v = serde_json::to_value(Notice::flash("Save imported.")).unwrap();
        assert_eq!(v["kind"], "flash");
        assert_eq!(v["text"], "Save imported.");
    }
}
