use crate::chat::ChatMessage;

/// Message history anchored on a fixed system instruction.
///
/// The instruction is always the first message; [`reset`](Self::reset)
/// drops everything after it.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    #[must_use]
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_instruction)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn system_instruction(&self) -> &str {
        &self.messages[0].content
    }

    pub fn reset(&mut self) {
        self.messages.truncate(1);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always `false`: the system instruction is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    #[test]
    fn reset_keeps_only_the_instruction() {
        let mut c = Conversation::new("你是助手");
        c.push(ChatMessage::user("你好"));
        c.push(ChatMessage::assistant("你好！"));
        assert_eq!(c.len(), 3);

        c.reset();
        assert_eq!(c.len(), 1);
        assert_eq!(c.messages()[0].role, Role::System);
        assert_eq!(c.system_instruction(), "你是助手");
    }
}
