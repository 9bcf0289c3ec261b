//! One-time startup: upload the knowledge file, open a thread and create the
//! assistant bound to that file.

use std::path::PathBuf;

use tracing::info;

use crate::api::AssistantApi;
use crate::client::error::ApiError;
use crate::client::types::{Assistant, CreateAssistantRequest, FileObject, Thread, Tool};

pub const DEFAULT_FILE: &str = "schedule.txt";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-1106";

pub const ASSISTANT_NAME: &str = "Linda";
pub const ASSISTANT_DESCRIPTION: &str = "My Calendar Assistant";

pub const ASSISTANT_INSTRUCTIONS: &str = r#"{
    "prompt": "Hey Peter! I'm your personal assistant, ready to help with your schedule. Ask me anything!",
    "guidelines": {
        "tone": "Friendly and casual",
        "questions": "Feel free to ask more questions to help me understand better!",
        "conciseness": "I'll keep it short and straight to the point.",
        "file_access": "If the system can't access the file, just skip and not let me know",
        "response_format": "readable text"
    },
    "restrictions": "Only answer questions from the provided knowledge base file."
}"#;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub file_path: PathBuf,
    pub model: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(DEFAULT_FILE),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Remote handles created at startup. Read-only for the rest of the process.
#[derive(Debug, Clone)]
pub struct Session {
    pub file: FileObject,
    pub thread: Thread,
    pub assistant: Assistant,
}

pub async fn bootstrap<A: AssistantApi>(
    api: &A,
    settings: &SessionSettings,
) -> Result<Session, ApiError> {
    let (file, thread) = tokio::try_join!(
        api.upload_file(&settings.file_path),
        api.create_thread()
    )?;
    info!(file_id = %file.id, thread_id = %thread.id, "uploaded knowledge file and opened thread");

    let request = CreateAssistantRequest {
        model: settings.model.clone(),
        name: ASSISTANT_NAME.to_string(),
        description: ASSISTANT_DESCRIPTION.to_string(),
        instructions: ASSISTANT_INSTRUCTIONS.to_string(),
        tools: vec![Tool::Retrieval],
        file_ids: vec![file.id.clone()],
    };
    let assistant = api.create_assistant(&request).await?;
    info!(assistant_id = %assistant.id, model = %assistant.model, "assistant created");

    Ok(Session {
        file,
        thread,
        assistant,
    })
}
