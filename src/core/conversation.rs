// src/core/conversation.rs — Conversation controller
//
// Owns the message sequence, the active persona and the session metadata for
// one chat session. Each user turn may hand the conversation off from the
// router to a specialist, then sends the whole sequence to the model.

use crate::infra::errors::ScribeError;
use crate::persona::catalog::{initial_system_prompt, ProjectContext, PromptCatalog};
use crate::persona::{self, Handoff, Persona};
use crate::provider::{ChatRequest, Message, ModelProvider, Role, TokenUsage};
use crate::session::{SessionLog, SessionMetadata};

pub const GREETING: &str = "Greetings! I am The Scribe. I have loaded your project context. \
     Does this look correct, or would you like to add more detail?";

/// Result of one user turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Set when this turn moved the conversation to a specialist.
    pub handoff: Option<&'static Handoff>,
    pub reply: String,
    pub usage: TokenUsage,
}

#[derive(Debug)]
pub struct Conversation {
    catalog: PromptCatalog,
    messages: Vec<Message>,
    persona: Persona,
    metadata: SessionMetadata,
}

impl Conversation {
    /// Fresh session: router persona, context-bearing system message, greeting.
    pub fn new(
        catalog: PromptCatalog,
        context: &ProjectContext,
        model_name: impl Into<String>,
    ) -> Self {
        let messages = vec![
            Message::system(initial_system_prompt(&catalog, context)),
            Message::assistant(GREETING),
        ];
        Self {
            catalog,
            messages,
            persona: Persona::Conductor,
            metadata: SessionMetadata::new(model_name),
        }
    }

    /// Continue a saved session.
    ///
    /// The persona comes from `metadata.persona` when the log has it, and
    /// otherwise from replaying the handoff table over the saved user
    /// messages. A specialist's system prompt is re-inserted right after its
    /// handoff announcement, or at the end if the announcement is missing.
    pub fn resume(catalog: PromptCatalog, context: &ProjectContext, log: SessionLog) -> Self {
        let SessionLog { metadata, history } = log;

        let persona = metadata.persona.unwrap_or_else(|| {
            persona::replay(
                history
                    .iter()
                    .filter(|m| m.role == Role::User)
                    .map(|m| m.content.as_str()),
            )
        });

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(initial_system_prompt(&catalog, context)));
        if history.is_empty() {
            messages.push(Message::assistant(GREETING));
        }
        messages.extend(history);

        if !persona.is_router() {
            let swap = Message::system(catalog.prompt(persona));
            let announcement = persona::HANDOFFS
                .iter()
                .find(|h| h.to == persona)
                .map(|h| h.announcement);
            let at = announcement.and_then(|text| {
                messages
                    .iter()
                    .position(|m| m.role == Role::Assistant && m.content == text)
            });
            match at {
                Some(i) => messages.insert(i + 1, swap),
                None => messages.push(swap),
            }
        }

        tracing::debug!(
            model = %metadata.model_name,
            persona = %persona,
            messages = messages.len(),
            "resumed session"
        );

        Self {
            catalog,
            messages,
            persona,
            metadata,
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn model_name(&self) -> &str {
        &self.metadata.model_name
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Everything the model sees, SYSTEM messages included.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// What the user sees.
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_system())
    }

    /// Append the user message and, if it triggers one, perform the handoff.
    fn accept_input(&mut self, input: &str) -> Option<&'static Handoff> {
        self.messages.push(Message::user(input));

        let handoff = self.persona.detect_handoff(input)?;
        tracing::info!(from = %handoff.from, to = %handoff.to, trigger = handoff.trigger, "persona handoff");

        self.messages.push(Message::assistant(handoff.announcement));
        self.messages
            .push(Message::system(self.catalog.prompt(handoff.to)));
        self.persona = handoff.to;
        Some(handoff)
    }

    /// Run one user turn: handoff check, then a single completion over the
    /// full sequence. On a model error the user message (and any handoff)
    /// stays in the log and no reply is appended.
    pub async fn turn(
        &mut self,
        provider: &dyn ModelProvider,
        input: &str,
    ) -> Result<TurnOutcome, ScribeError> {
        let handoff = self.accept_input(input);

        let request = ChatRequest {
            model: self.metadata.model_name.clone(),
            messages: self.messages.clone(),
        };
        let response = provider.chat(request).await?;

        self.messages.push(Message::assistant(response.content.clone()));

        Ok(TurnOutcome {
            handoff,
            reply: response.content,
            usage: response.usage,
        })
    }

    /// Snapshot for saving: SYSTEM messages stripped, current persona recorded.
    pub fn transcript(&self) -> SessionLog {
        let mut metadata = self.metadata.clone();
        metadata.persona = Some(self.persona);
        SessionLog {
            metadata,
            history: self.visible_messages().cloned().collect(),
        }
    }
}
