use uuid::Uuid;

/// Identifies one message for the lifetime of the screen.
pub type MessageId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }

    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_created_in_the_same_tick_have_distinct_ids() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn constructors_set_sender() {
        assert!(Message::user("hello").is_user());
        let reply = Message::bot("hi");
        assert_eq!(reply.sender, Sender::Bot);
        assert!(!reply.is_user());
    }
}
