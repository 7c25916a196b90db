use crate::models::Message;
use uuid::Uuid;

/// Append-only message history for one interface session.
///
/// Messages can only be pushed; there is no API to remove, edit or reorder
/// them. The history lives in memory and is dropped with the session.
#[derive(Debug, Clone)]
pub struct Conversation {
    thread_id: String,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            thread_id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
        }
    }

    pub fn with_thread_id(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            messages: Vec::new(),
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut conversation = Conversation::with_thread_id("t-1");
        conversation.append(Message::user("claim"));
        conversation.append(Message::assistant("Verdict: False"));

        assert_eq!(conversation.thread_id(), "t-1");
        let roles: Vec<&str> = conversation.iter().map(|m| m.role()).collect();
        assert_eq!(roles, ["user", "assistant"]);
        assert_eq!(conversation.last().map(|m| m.content()), Some("Verdict: False"));
    }

    #[test]
    fn fresh_conversations_get_distinct_threads() {
        assert_ne!(Conversation::new().thread_id(), Conversation::new().thread_id());
    }
}
