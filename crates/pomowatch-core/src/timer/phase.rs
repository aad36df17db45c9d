use serde::{Deserialize, Serialize};

/// Which kind of rest a break phase is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Short,
    Long,
}

impl BreakKind {
    /// Pick the break that follows a finished work phase.
    ///
    /// Long exactly when `completed_cycles` is a positive multiple of
    /// `threshold`. A zero threshold never yields a long break.
    pub fn after(completed_cycles: u32, threshold: u32) -> Self {
        if threshold > 0 && completed_cycles > 0 && completed_cycles % threshold == 0 {
            BreakKind::Long
        } else {
            BreakKind::Short
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BreakKind::Short => "Short Break",
            BreakKind::Long => "Long Break",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "break", rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Work,
    Break(BreakKind),
}

impl Phase {
    pub fn is_work(self) -> bool {
        matches!(self, Phase::Work)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Focus",
            Phase::Break(kind) => kind.label(),
        }
    }
}
