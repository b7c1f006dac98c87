pub use draft::{Draft, MAX_DRAFT_CHARS};
pub use message::{Message, MessageId, Sender};
pub use screen::{ChatScreen, OutboundMessage, SendOutcome};

mod draft;
mod message;
mod screen;

/// Messages in the order they were appended. Nothing ever reorders them.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drops the message with `id`, returning it if it was present.
    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let pos = self.messages.iter().position(|m| m.id == id)?;
        Some(self.messages.remove(pos))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
