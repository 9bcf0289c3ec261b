use reqwest::{multipart, Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::api::AssistantApi;
use crate::client::error::ApiError;
use crate::client::types::{
    Assistant, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, FileObject,
    Message, MessageId, MessageList, Run, RunId, Thread, ThreadId,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const ASSISTANTS_BETA: (&str, &str) = ("OpenAI-Beta", "assistants=v1");

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OpenAIClient {
    api_key: SecretString,
    base_url: String,
    client: Client,
}

impl OpenAIClient {
    pub fn new(api_key: SecretString) -> Result<Self, ApiError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: SecretString, base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.api_key.expose_secret())
            .header(ASSISTANTS_BETA.0, ASSISTANTS_BETA.1)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{e}: {body}")))
    }

    async fn post_request<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "POST");
        let response = self
            .authorized(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn get_request<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self
            .authorized(self.client.get(self.url(path)))
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn upload_document(&self, file_path: &Path) -> Result<FileObject, ApiError> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| {
                ApiError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid file path: {}", file_path.display()),
                ))
            })?
            .to_string_lossy()
            .to_string();

        let file_content = tokio::fs::read(file_path).await?;

        let form = multipart::Form::new().text("purpose", "assistants").part(
            "file",
            multipart::Part::bytes(file_content)
                .file_name(file_name)
                .mime_str("text/plain")?,
        );

        debug!(path = "/files", "POST multipart");
        let response = self
            .authorized(self.client.post(self.url("/files")))
            .multipart(form)
            .send()
            .await?;

        Self::read_json(response).await
    }
}

impl AssistantApi for OpenAIClient {
    async fn upload_file(&self, path: &Path) -> Result<FileObject, ApiError> {
        self.upload_document(path).await
    }

    async fn create_thread(&self) -> Result<Thread, ApiError> {
        self.post_request("/threads", &serde_json::json!({})).await
    }

    async fn create_assistant(
        &self,
        request: &CreateAssistantRequest,
    ) -> Result<Assistant, ApiError> {
        self.post_request("/assistants", request).await
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        request: &CreateMessageRequest,
    ) -> Result<Message, ApiError> {
        self.post_request(&format!("/threads/{thread_id}/messages"), request)
            .await
    }

    async fn delete_message(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
    ) -> Result<(), ApiError> {
        let path = format!("/threads/{thread_id}/messages/{message_id}");
        debug!(path = %path, "DELETE");
        let response = self
            .authorized(self.client.delete(self.url(&path)))
            .send()
            .await?;
        Self::read_json::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        request: &CreateRunRequest,
    ) -> Result<Run, ApiError> {
        self.post_request(&format!("/threads/{thread_id}/runs"), request)
            .await
    }

    async fn retrieve_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<Run, ApiError> {
        self.get_request(&format!("/threads/{thread_id}/runs/{run_id}"))
            .await
    }

    async fn cancel_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<Run, ApiError> {
        self.post_request(
            &format!("/threads/{thread_id}/runs/{run_id}/cancel"),
            &serde_json::json!({}),
        )
        .await
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<MessageList, ApiError> {
        self.get_request(&format!("/threads/{thread_id}/messages?order=desc"))
            .await
    }
}
