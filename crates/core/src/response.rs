//! Output collected while a request executes.
//!
//! A [`Response`] is append-only. [`Response::finish`] consumes it, inserts
//! the blank separator line after any written output, fires the pre-send
//! hooks exactly once and yields the serializable [`Envelope`].

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Plain,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Plain, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, text)
    }
}

/// Instruction for the client-side terminal renderer.
///
/// The serialized shapes are a client contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Directive {
    ClearTerminal,
    ClearHistory,
    Reload {
        force: bool,
    },
    SetPrompt {
        prompt: String,
    },
    SetMask {
        enabled: bool,
    },
    SetHistory {
        enabled: bool,
    },
    #[serde(rename_all = "camelCase")]
    QueueJob {
        key: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        before_send: Vec<Directive>,
    },
    #[serde(rename_all = "camelCase")]
    Download {
        file_name: String,
        mime_type: String,
        data: String,
    },
    BeginUpload,
    Custom {
        name: String,
        #[serde(default)]
        params: serde_json::Value,
    },
}

impl Directive {
    pub fn set_prompt(prompt: impl Into<String>) -> Self {
        Directive::SetPrompt {
            prompt: prompt.into(),
        }
    }

    pub fn queue_job(key: impl Into<String>) -> Self {
        Directive::QueueJob {
            key: key.into(),
            before_send: Vec::new(),
        }
    }

    /// Download directive carrying `bytes` as base64.
    pub fn download(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Directive::Download {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn custom(name: impl Into<String>, params: serde_json::Value) -> Self {
        Directive::Custom {
            name: name.into(),
            params,
        }
    }
}

/// Callback run by [`Response::finish`] after the separator line.
pub type ResponseHook = Box<dyn FnOnce(&mut Response) + Send + Sync>;

#[derive(Default)]
pub struct Response {
    messages: Vec<Message>,
    directives: Vec<Directive>,
    hooks: Vec<ResponseHook>,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("messages", &self.messages)
            .field("directives", &self.directives)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn write_text(&mut self, text: impl Into<String>) {
        self.write(Message::plain(text));
    }

    pub fn write_success(&mut self, text: impl Into<String>) {
        self.write(Message::success(text));
    }

    pub fn write_error(&mut self, text: impl Into<String>) {
        self.write(Message::error(text));
    }

    pub fn write_empty_line(&mut self) {
        self.write_text(String::new());
    }

    pub fn add_directive(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    /// Registers a hook fired once by [`Response::finish`].
    pub fn on_sending<F>(&mut self, hook: F)
    where
        F: FnOnce(&mut Response) + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn finish(mut self) -> Envelope {
        if self.has_messages() {
            self.write_empty_line();
        }

        // Hooks registered by other hooks run in the same pass.
        while !self.hooks.is_empty() {
            let hooks = std::mem::take(&mut self.hooks);
            for hook in hooks {
                hook(&mut self);
            }
        }

        Envelope {
            messages: self.messages,
            directives: self.directives,
        }
    }
}

/// Frozen, serializable form of a finished [`Response`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub messages: Vec<Message>,
    pub directives: Vec<Directive>,
}

impl Envelope {
    pub fn count(&self, kind: MessageKind) -> usize {
        self.messages.iter().filter(|m| m.kind == kind).count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.text.as_str())
    }

    /// Key of the first `queueJob` directive, if any.
    pub fn queued_job(&self) -> Option<&str> {
        self.directives.iter().find_map(|d| match d {
            Directive::QueueJob { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finish_adds_separator_before_hooks() {
        let mut response = Response::new();
        response.write_text("hello");
        response.on_sending(|r| r.write_text("question"));

        let envelope = response.finish();
        let texts: Vec<_> = envelope.texts().collect();
        assert_eq!(texts, vec!["hello", "", "question"]);
    }

    #[test]
    fn no_separator_without_output() {
        let mut response = Response::new();
        response.add_directive(Directive::ClearTerminal);
        let envelope = response.finish();
        assert!(envelope.messages.is_empty());
        assert_eq!(envelope.directives, vec![Directive::ClearTerminal]);
    }

    #[test]
    fn nested_hooks_fire_once() {
        let mut response = Response::new();
        response.on_sending(|r| {
            r.add_directive(Directive::ClearHistory);
            r.on_sending(|r| r.add_directive(Directive::ClearTerminal));
        });
        let envelope = response.finish();
        assert_eq!(
            envelope.directives,
            vec![Directive::ClearHistory, Directive::ClearTerminal]
        );
    }

    #[test]
    fn directive_wire_shapes() {
        let queue = Directive::QueueJob {
            key: "abc".into(),
            before_send: vec![Directive::SetMask { enabled: false }],
        };
        assert_eq!(
            serde_json::to_value(&queue).unwrap(),
            json!({
                "type": "queueJob",
                "key": "abc",
                "beforeSend": [{"type": "setMask", "enabled": false}]
            })
        );
        assert_eq!(
            serde_json::to_value(Directive::queue_job("k")).unwrap(),
            json!({"type": "queueJob", "key": "k"})
        );
        assert_eq!(
            serde_json::to_value(Directive::download("a.txt", "text/plain", b"hi")).unwrap(),
            json!({
                "type": "download",
                "fileName": "a.txt",
                "mimeType": "text/plain",
                "data": "aGk="
            })
        );
        assert_eq!(
            serde_json::to_value(Directive::Reload { force: true }).unwrap(),
            json!({"type": "reload", "force": true})
        );
        assert_eq!(
            serde_json::to_value(Directive::BeginUpload).unwrap(),
            json!({"type": "beginUpload"})
        );
        assert_eq!(
            serde_json::to_value(Directive::custom("theme", json!({"name": "dark"}))).unwrap(),
            json!({"type": "custom", "name": "theme", "params": {"name": "dark"}})
        );
    }

    #[test]
    fn message_wire_shape() {
        let envelope = Envelope {
            messages: vec![Message::success("done")],
            directives: vec![],
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"messages": [{"type": "success", "text": "done"}], "directives": []})
        );
    }
}
