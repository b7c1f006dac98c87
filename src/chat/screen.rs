use super::{Conversation, Draft, Message, MessageId};

/// A send handed to the network layer after the optimistic append.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub id: MessageId,
    pub text: String,
}

/// How a send resolved. `Failed` carries the text to show the user.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Reply(String),
    Failed(String),
}

/// View state of the chat screen: transcript, draft and the busy flag.
///
/// At most one send is pending. `submit` refuses to start another until
/// `complete` resolves the current one, and a completion for any other id is
/// dropped.
#[derive(Debug, Default)]
pub struct ChatScreen {
    conversation: Conversation,
    pub draft: Draft,
    pending: Option<MessageId>,
    revision: u64,
}

impl ChatScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_busy() && self.draft.sendable().is_some()
    }

    /// Bumped whenever the rendered extent of the transcript changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Appends the draft as a user message and returns what must be sent.
    pub fn submit(&mut self) -> Option<OutboundMessage> {
        if self.is_busy() {
            return None;
        }
        let text = self.draft.sendable()?.to_string();

        let message = Message::user(text.clone());
        let id = message.id;
        self.pending = Some(id);
        self.conversation.push(message);
        self.draft.clear();
        self.revision += 1;

        Some(OutboundMessage { id, text })
    }

    /// Resolves the pending send. Returns the alert text on failure.
    pub fn complete(&mut self, id: MessageId, outcome: SendOutcome) -> Option<String> {
        if self.pending != Some(id) {
            tracing::warn!(%id, "ignoring completion for a send that is not pending");
            return None;
        }
        self.pending = None;
        self.revision += 1;

        match outcome {
            SendOutcome::Reply(text) => {
                self.conversation.push(Message::bot(text));
                None
            }
            SendOutcome::Failed(reason) => {
                self.conversation.remove(id);
                Some(reason)
            }
        }
    }
}
