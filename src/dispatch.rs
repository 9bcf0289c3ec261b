//! Sends a question into the session thread and starts a run for it.

use tracing::{debug, warn};

use crate::api::AssistantApi;
use crate::client::error::ApiError;
use crate::client::types::{CreateMessageRequest, CreateRunRequest, Message, Role, Run};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct Dispatched {
    pub message: Message,
    pub run: Run,
}

/// Create the user message, then the run that answers it.
///
/// The run is only started once the message exists. If starting the run
/// fails the message is deleted again so the thread does not keep an
/// unanswered question.
pub async fn dispatch<A: AssistantApi>(
    api: &A,
    session: &Session,
    question: &str,
) -> Result<Dispatched, ApiError> {
    let thread_id = &session.thread.id;

    let message = api
        .create_message(
            thread_id,
            &CreateMessageRequest {
                role: Role::User,
                content: question.to_string(),
                file_ids: vec![session.file.id.clone()],
            },
        )
        .await?;
    debug!(message_id = %message.id, "question added to thread");

    let run = match api
        .create_run(
            thread_id,
            &CreateRunRequest {
                assistant_id: session.assistant.id.clone(),
            },
        )
        .await
    {
        Ok(run) => run,
        Err(err) => {
            if let Err(cleanup) = api.delete_message(thread_id, &message.id).await {
                warn!(
                    message_id = %message.id,
                    error = %cleanup,
                    "could not remove question after failed run start"
                );
            }
            return Err(err);
        }
    };
    debug!(run_id = %run.id, status = %run.status, "run started");

    Ok(Dispatched { message, run })
}
