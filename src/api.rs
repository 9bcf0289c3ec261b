//! The remote operations the chat loop consumes.
//!
//! [`crate::client::client::OpenAIClient`] talks to the hosted service; tests
//! drive the components through a scripted stub instead.

use std::future::Future;
use std::path::Path;

use crate::client::error::ApiError;
use crate::client::types::{
    Assistant, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, FileObject,
    Message, MessageId, MessageList, Run, RunId, Thread, ThreadId,
};

pub trait AssistantApi: Send + Sync {
    /// Upload a local file for retrieval use (`purpose=assistants`).
    fn upload_file(&self, path: &Path) -> impl Future<Output = Result<FileObject, ApiError>> + Send;

    fn create_thread(&self) -> impl Future<Output = Result<Thread, ApiError>> + Send;

    fn create_assistant(
        &self,
        request: &CreateAssistantRequest,
    ) -> impl Future<Output = Result<Assistant, ApiError>> + Send;

    fn create_message(
        &self,
        thread_id: &ThreadId,
        request: &CreateMessageRequest,
    ) -> impl Future<Output = Result<Message, ApiError>> + Send;

    fn delete_message(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn create_run(
        &self,
        thread_id: &ThreadId,
        request: &CreateRunRequest,
    ) -> impl Future<Output = Result<Run, ApiError>> + Send;

    fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> impl Future<Output = Result<Run, ApiError>> + Send;

    /// Ask the service to stop a run that is still queued or in progress.
    fn cancel_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> impl Future<Output = Result<Run, ApiError>> + Send;

    /// Messages of a thread, newest first.
    fn list_messages(
        &self,
        thread_id: &ThreadId,
    ) -> impl Future<Output = Result<MessageList, ApiError>> + Send;
}

#[cfg(test)]
pub(crate) mod stub {
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use super::AssistantApi;
    use crate::client::error::ApiError;
    use crate::client::types::{
        Assistant, AssistantId, ContentBlock, CreateAssistantRequest, CreateMessageRequest,
        CreateRunRequest, FileId, FileObject, Message, MessageId, MessageList, Role, Run,
        RunError, RunId, RunStatus, TextContent, Thread, ThreadId,
    };

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        UploadFile(PathBuf),
        CreateThread,
        CreateAssistant(CreateAssistantRequest),
        CreateMessage {
            thread_id: ThreadId,
            request: CreateMessageRequest,
        },
        DeleteMessage {
            thread_id: ThreadId,
            message_id: MessageId,
        },
        CreateRun {
            thread_id: ThreadId,
            request: CreateRunRequest,
        },
        RetrieveRun {
            thread_id: ThreadId,
            run_id: RunId,
        },
        CancelRun {
            thread_id: ThreadId,
            run_id: RunId,
        },
        ListMessages(ThreadId),
    }

    /// Records every call and answers from a script.
    ///
    /// Run statuses are popped per `retrieve_run`; once the script runs dry the
    /// last scripted status (or `completed`) repeats.
    pub struct StubApi {
        calls: Mutex<Vec<Call>>,
        statuses: Mutex<VecDeque<RunStatus>>,
        fallback_status: Mutex<RunStatus>,
        reply: Option<String>,
        fail_upload: bool,
        fail_run_create: bool,
        hang_message_create: bool,
    }

    impl StubApi {
        pub fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                statuses: Mutex::new(VecDeque::new()),
                fallback_status: Mutex::new(RunStatus::Completed),
                reply: Some("You have a dentist appointment at 10am.".to_string()),
                fail_upload: false,
                fail_run_create: false,
                hang_message_create: false,
            }
        }

        pub fn with_statuses(self, statuses: Vec<RunStatus>) -> Self {
            if let Some(last) = statuses.last() {
                *self.fallback_status.lock().unwrap() = last.clone();
            }
            *self.statuses.lock().unwrap() = statuses.into();
            self
        }

        pub fn with_reply(mut self, reply: Option<&str>) -> Self {
            self.reply = reply.map(str::to_string);
            self
        }

        pub fn failing_upload(mut self) -> Self {
            self.fail_upload = true;
            self
        }

        pub fn failing_run_create(mut self) -> Self {
            self.fail_run_create = true;
            self
        }

        /// `create_message` never resolves, like a stalled connection.
        pub fn hanging_message_create(mut self) -> Self {
            self.hang_message_create = true;
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> usize {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            calls.len()
        }

        fn run(&self, thread_id: &ThreadId, run_id: RunId, status: RunStatus) -> Run {
            let last_error = status.is_unsuccessful_end().then(|| RunError {
                code: "server_error".to_string(),
                message: "the run did not finish".to_string(),
            });
            Run {
                id: run_id,
                thread_id: thread_id.clone(),
                assistant_id: AssistantId::from("asst_1"),
                status,
                last_error,
            }
        }
    }

    impl AssistantApi for StubApi {
        async fn upload_file(&self, path: &Path) -> Result<FileObject, ApiError> {
            self.record(Call::UploadFile(path.to_path_buf()));
            if self.fail_upload {
                return Err(ApiError::Authentication);
            }
            Ok(FileObject {
                id: FileId::from("file_1"),
                filename: Some("schedule.txt".to_string()),
                purpose: Some("assistants".to_string()),
                bytes: Some(42),
            })
        }

        async fn create_thread(&self) -> Result<Thread, ApiError> {
            self.record(Call::CreateThread);
            Ok(Thread {
                id: ThreadId::from("thread_1"),
            })
        }

        async fn create_assistant(
            &self,
            request: &CreateAssistantRequest,
        ) -> Result<Assistant, ApiError> {
            self.record(Call::CreateAssistant(request.clone()));
            Ok(Assistant {
                id: AssistantId::from("asst_1"),
                name: Some(request.name.clone()),
                description: Some(request.description.clone()),
                instructions: Some(request.instructions.clone()),
                model: request.model.clone(),
                tools: request.tools.clone(),
                file_ids: request.file_ids.clone(),
            })
        }

        async fn create_message(
            &self,
            thread_id: &ThreadId,
            request: &CreateMessageRequest,
        ) -> Result<Message, ApiError> {
            let n = self.record(Call::CreateMessage {
                thread_id: thread_id.clone(),
                request: request.clone(),
            });
            if self.hang_message_create {
                std::future::pending::<()>().await;
            }
            Ok(Message {
                id: MessageId(format!("msg_{n}")),
                thread_id: thread_id.clone(),
                role: request.role,
                content: vec![ContentBlock::Text {
                    text: TextContent {
                        value: request.content.clone(),
                    },
                }],
                file_ids: request.file_ids.clone(),
            })
        }

        async fn delete_message(
            &self,
            thread_id: &ThreadId,
            message_id: &MessageId,
        ) -> Result<(), ApiError> {
            self.record(Call::DeleteMessage {
                thread_id: thread_id.clone(),
                message_id: message_id.clone(),
            });
            Ok(())
        }

        async fn create_run(
            &self,
            thread_id: &ThreadId,
            request: &CreateRunRequest,
        ) -> Result<Run, ApiError> {
            let n = self.record(Call::CreateRun {
                thread_id: thread_id.clone(),
                request: request.clone(),
            });
            if self.fail_run_create {
                return Err(ApiError::Remote {
                    status: 500,
                    message: "run create failed".to_string(),
                });
            }
            Ok(self.run(thread_id, RunId(format!("run_{n}")), RunStatus::Queued))
        }

        async fn retrieve_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<Run, ApiError> {
            self.record(Call::RetrieveRun {
                thread_id: thread_id.clone(),
                run_id: run_id.clone(),
            });
            let status = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback_status.lock().unwrap().clone());
            Ok(self.run(thread_id, run_id.clone(), status))
        }

        async fn cancel_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<Run, ApiError> {
            self.record(Call::CancelRun {
                thread_id: thread_id.clone(),
                run_id: run_id.clone(),
            });
            Ok(self.run(thread_id, run_id.clone(), RunStatus::Cancelling))
        }

        async fn list_messages(&self, thread_id: &ThreadId) -> Result<MessageList, ApiError> {
            self.record(Call::ListMessages(thread_id.clone()));
            let data = self
                .reply
                .iter()
                .map(|reply| Message {
                    id: MessageId::from("msg_reply"),
                    thread_id: thread_id.clone(),
                    role: Role::Assistant,
                    content: vec![ContentBlock::Text {
                        text: TextContent {
                            value: reply.clone(),
                        },
                    }],
                    file_ids: Vec::new(),
                })
                .collect();
            Ok(MessageList { data })
        }
    }
}
