// src/persona/mod.rs — Personas and the keyword handoff table
//
// The conversation starts in the router persona. A handoff moves it to a
// specialist and is one-way: specialists have no rows in HANDOFFS, so nothing
// can move the conversation out of them.

pub mod catalog;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Router: detects which specialist, if any, should take over.
    Conductor,
    GdprExpert,
    Nis2Expert,
}

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::Conductor, Persona::GdprExpert, Persona::Nis2Expert];

    /// Key of this persona in the prompt catalog and in session metadata.
    pub fn key(&self) -> &'static str {
        match self {
            Persona::Conductor => "conductor",
            Persona::GdprExpert => "gdpr_expert",
            Persona::Nis2Expert => "nis2_expert",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }

    pub fn is_router(&self) -> bool {
        *self == Persona::Conductor
    }

    /// Handoffs available from this persona, in priority order.
    pub fn handoffs(&self) -> impl Iterator<Item = &'static Handoff> + '_ {
        HANDOFFS.iter().filter(move |h| h.from == *self)
    }

    /// First handoff whose trigger occurs in `input` (case-insensitive).
    pub fn detect_handoff(&self, input: &str) -> Option<&'static Handoff> {
        let lowered = input.to_lowercase();
        self.handoffs().find(|h| lowered.contains(h.trigger))
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One row of the transition table.
#[derive(Debug, PartialEq, Eq)]
pub struct Handoff {
    pub from: Persona,
    /// Lower-case keyword matched as a substring of the lowered input.
    pub trigger: &'static str,
    pub to: Persona,
    /// Shown to the user as an assistant message before the prompt swap.
    pub announcement: &'static str,
}

/// Checked top to bottom; the first matching trigger wins.
pub static HANDOFFS: &[Handoff] = &[
    Handoff {
        from: Persona::Conductor,
        trigger: "gdpr",
        to: Persona::GdprExpert,
        announcement: "Excellent. Connecting you to our GDPR specialist now...",
    },
    Handoff {
        from: Persona::Conductor,
        trigger: "nis2",
        to: Persona::Nis2Expert,
        announcement: "Understood. Connecting you to our NIS 2 specialist now...",
    },
];

/// Run the handoff table over a sequence of user inputs and return where the
/// conversation ends up. Used to recover persona state from old logs.
pub fn replay<'a>(inputs: impl IntoIterator<Item = &'a str>) -> Persona {
    inputs
        .into_iter()
        .fold(Persona::Conductor, |persona, input| {
            persona
                .detect_handoff(input)
                .map(|h| h.to)
                .unwrap_or(persona)
        })
}
