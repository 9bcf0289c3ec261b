use std::io::{self, Write};

use crate::api::AssistantApi;
use crate::client::error::ApiError;
use crate::client::types::ThreadId;

/// Text of the newest message in the thread, if it has any.
pub async fn latest_answer<A: AssistantApi>(
    api: &A,
    thread_id: &ThreadId,
) -> Result<Option<String>, ApiError> {
    let messages = api.list_messages(thread_id).await?;
    Ok(messages
        .data
        .first()
        .and_then(|message| message.first_text())
        .map(str::to_string))
}

/// Turns every escaped `\n` the model emits into a real line break.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

pub fn print_answer<W: Write>(out: &mut W, answer: Option<&str>) -> io::Result<()> {
    match answer {
        Some(text) => writeln!(out, "{}", normalize_newlines(text)),
        None => writeln!(out, "(no answer in thread)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubApi;

    #[test]
    fn every_escaped_newline_is_replaced() {
        assert_eq!(normalize_newlines(r"Hi\nthere\nPeter"), "Hi\nthere\nPeter");
        assert_eq!(normalize_newlines("already\nsplit"), "already\nsplit");
    }

    #[tokio::test]
    async fn newest_message_text_is_printed() {
        let api = StubApi::new().with_reply(Some(r"Hi\nthere"));
        let answer = latest_answer(&api, &ThreadId::from("thread_1"))
            .await
            .unwrap();

        let mut out = Vec::new();
        print_answer(&mut out, answer.as_deref()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hi\nthere\n");
    }

    #[tokio::test]
    async fn empty_thread_has_no_answer() {
        let api = StubApi::new().with_reply(None);
        let answer = latest_answer(&api, &ThreadId::from("thread_1"))
            .await
            .unwrap();
        assert_eq!(answer, None);

        let mut out = Vec::new();
        print_answer(&mut out, None).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(no answer in thread)\n");
    }
}
