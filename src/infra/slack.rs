use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::domain::conversation::{AttachmentDescriptor, ThreadMessage};
use crate::domain::draft::MessageRef;
use crate::error::{AppError, AppResult};
use crate::render::blocks::{Block, ModalView, OutboundMessage};
use crate::services::{ChatService, FileSource};
use crate::text::truncate_chars;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BODY_LIMIT: usize = 200;

/// Slack Web API client. Reads go out as GET with query parameters, writes as
/// JSON POST; both authenticate with the bot token.
#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    api_base: String,
    bot_token: String,
    app_token: String,
}

impl SlackClient {
    pub fn new(
        api_base: &str,
        bot_token: &str,
        app_token: &str,
        request_timeout: Duration,
    ) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("ticket-bridge"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .map_err(|err| AppError::Chat(format!("failed to create Slack client: {err}")))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.trim().to_string(),
            app_token: app_token.trim().to_string(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base)
    }

    /// Requests a fresh Socket Mode websocket URL with the app-level token.
    pub async fn open_socket_connection(&self) -> AppResult<String> {
        let request = self
            .http
            .post(self.endpoint("apps.connections.open"))
            .bearer_auth(&self.app_token);
        let response: OpenSocketResponse = call("apps.connections.open", request).await?;
        response
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Chat("apps.connections.open did not return a url".to_string()))
    }

    async fn read<T: DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let request = self
            .http
            .get(self.endpoint(method))
            .bearer_auth(&self.bot_token)
            .query(query);
        call(method, request).await
    }

    async fn write<T, P>(&self, method: &str, payload: &P) -> AppResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let request = self
            .http
            .post(self.endpoint(method))
            .bearer_auth(&self.bot_token)
            .json(payload);
        call(method, request).await
    }
}

/// Sends `request` and unwraps Slack's `{"ok": bool, "error": ...}` envelope.
async fn call<T: DeserializeOwned>(method: &str, request: RequestBuilder) -> AppResult<T> {
    let response = request
        .send()
        .await
        .map_err(|err| AppError::Chat(format!("Slack {method} request failed: {err}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Chat(format!(
            "Slack {method} failed with status {}: {}",
            status.as_u16(),
            truncate_chars(&body, ERROR_BODY_LIMIT)
        )));
    }

    let payload: Value = response
        .json()
        .await
        .map_err(|err| AppError::Chat(format!("failed to decode Slack {method}: {err}")))?;
    if payload.get("ok").and_then(Value::as_bool) != Some(true) {
        let reason = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(AppError::Chat(format!("Slack {method} failed: {reason}")));
    }
    debug!(method, "slack call succeeded");
    serde_json::from_value(payload)
        .map_err(|err| AppError::Chat(format!("unexpected Slack {method} payload: {err}")))
}

#[derive(Deserialize)]
struct OpenSocketResponse {
    url: Option<String>,
}

#[derive(Deserialize)]
struct RepliesResponse {
    #[serde(default)]
    messages: Vec<SlackMessage>,
}

#[derive(Deserialize)]
struct SlackMessage {
    user: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    files: Vec<SlackFile>,
}

#[derive(Deserialize)]
struct SlackFile {
    name: Option<String>,
    url_private: Option<String>,
    mode: Option<String>,
    mimetype: Option<String>,
}

impl From<SlackFile> for AttachmentDescriptor {
    fn from(file: SlackFile) -> Self {
        AttachmentDescriptor {
            name: file.name.unwrap_or_else(|| "unknown".to_string()),
            source_url: file.url_private,
            transfer_mode: file.mode,
            mime_type: file.mimetype,
        }
    }
}

#[derive(Deserialize)]
struct UserInfoResponse {
    user: Option<SlackUser>,
}

#[derive(Deserialize)]
struct SlackUser {
    real_name: Option<String>,
}

#[derive(Deserialize)]
struct ChannelInfoResponse {
    channel: SlackChannel,
}

#[derive(Deserialize)]
struct SlackChannel {
    name: String,
}

#[derive(Deserialize)]
struct PermalinkResponse {
    permalink: String,
}

#[derive(Deserialize)]
struct PostedMessageResponse {
    channel: String,
    ts: String,
}

#[derive(Serialize)]
struct PostMessagePayload<'a> {
    channel: &'a str,
    #[serde(flatten)]
    message: &'a OutboundMessage,
}

/// Always sends `blocks`, so a rewrite replaces every block of the old message.
#[derive(Serialize)]
struct UpdateMessagePayload<'a> {
    channel: &'a str,
    ts: &'a str,
    text: &'a str,
    blocks: &'a [Block],
}

#[derive(Serialize)]
struct ReactionPayload<'a> {
    channel: &'a str,
    timestamp: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct EphemeralPayload<'a> {
    channel: &'a str,
    user: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct OpenViewPayload<'a> {
    trigger_id: &'a str,
    view: &'a ModalView,
}

#[async_trait]
impl ChatService for SlackClient {
    async fn add_reaction(&self, target: &MessageRef, name: &str) -> AppResult<()> {
        let payload = ReactionPayload {
            channel: &target.channel,
            timestamp: &target.ts,
            name,
        };
        self.write::<IgnoredAny, _>("reactions.add", &payload).await?;
        Ok(())
    }

    async fn remove_reaction(&self, target: &MessageRef, name: &str) -> AppResult<()> {
        let payload = ReactionPayload {
            channel: &target.channel,
            timestamp: &target.ts,
            name,
        };
        self.write::<IgnoredAny, _>("reactions.remove", &payload).await?;
        Ok(())
    }

    async fn channel_name(&self, channel: &str) -> AppResult<String> {
        let response: ChannelInfoResponse = self
            .read("conversations.info", &[("channel", channel)])
            .await?;
        Ok(response.channel.name)
    }

    async fn thread_replies(
        &self,
        channel: &str,
        ts: &str,
        limit: usize,
    ) -> AppResult<Vec<ThreadMessage>> {
        let limit = limit.to_string();
        let response: RepliesResponse = self
            .read(
                "conversations.replies",
                &[("channel", channel), ("ts", ts), ("limit", limit.as_str())],
            )
            .await?;
        Ok(response
            .messages
            .into_iter()
            .map(|message| ThreadMessage {
                user_id: message.user,
                text: message.text,
                files: message.files.into_iter().map(Into::into).collect(),
            })
            .collect())
    }

    async fn user_display_name(&self, user: &str) -> AppResult<String> {
        let response: UserInfoResponse = self.read("users.info", &[("user", user)]).await?;
        response
            .user
            .and_then(|user| user.real_name)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::Chat(format!("users.info returned no name for {user}")))
    }

    async fn permalink(&self, channel: &str, ts: &str) -> AppResult<String> {
        let response: PermalinkResponse = self
            .read(
                "chat.getPermalink",
                &[("channel", channel), ("message_ts", ts)],
            )
            .await?;
        Ok(response.permalink)
    }

    async fn post_message(
        &self,
        channel: &str,
        message: &OutboundMessage,
    ) -> AppResult<MessageRef> {
        let response: PostedMessageResponse = self
            .write("chat.postMessage", &PostMessagePayload { channel, message })
            .await?;
        Ok(MessageRef {
            channel: response.channel,
            ts: response.ts,
        })
    }

    async fn update_message(
        &self,
        target: &MessageRef,
        message: &OutboundMessage,
    ) -> AppResult<()> {
        let payload = UpdateMessagePayload {
            channel: &target.channel,
            ts: &target.ts,
            text: &message.text,
            blocks: &message.blocks,
        };
        self.write::<IgnoredAny, _>("chat.update", &payload).await?;
        Ok(())
    }

    async fn post_ephemeral(&self, channel: &str, user: &str, text: &str) -> AppResult<()> {
        let payload = EphemeralPayload {
            channel,
            user,
            text,
        };
        self.write::<IgnoredAny, _>("chat.postEphemeral", &payload)
            .await?;
        Ok(())
    }

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> AppResult<()> {
        self.write::<IgnoredAny, _>("views.open", &OpenViewPayload { trigger_id, view })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FileSource for SlackClient {
    /// Streams a private file into `destination`, returning the byte count.
    async fn download_to(&self, url: &str, destination: &Path) -> AppResult<u64> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.bot_token)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|err| AppError::Attachment(format!("download failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Attachment(format!(
                "download responded with {}",
                status.as_u16()
            )));
        }

        let mut file = tokio::fs::File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0_u64;
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|err| AppError::Attachment(format!("download interrupted: {err}")))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> SlackClient {
        SlackClient::new(
            &server.base_url(),
            "xoxb-bot",
            "xapp-app",
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[tokio::test]
    async fn thread_replies_map_messages_and_files() {
        let server = MockServer::start();
        let replies = server.mock(|when, then| {
            when.method(GET)
                .path("/conversations.replies")
                .query_param("channel", "C1")
                .query_param("ts", "1700.1")
                .query_param("limit", "50")
                .header("Authorization", "Bearer xoxb-bot");
            then.status(200).json_body(json!({
                "ok": true,
                "messages": [
                    {"user": "U1", "text": "login is broken"},
                    {"user": "U2", "text": "screenshot", "files": [
                        {"name": "shot.png", "url_private": "https://files/shot", "mode": "hosted", "mimetype": "image/png"},
                        {"url_private": "https://docs/x", "mode": "external"}
                    ]},
                    {"text": "bot message"}
                ]
            }));
        });

        let messages = client(&server)
            .thread_replies("C1", "1700.1", 50)
            .await
            .expect("replies");

        replies.assert();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].user_id.as_deref(), Some("U1"));
        assert_eq!(messages[1].files[0].name, "shot.png");
        assert_eq!(messages[1].files[1].name, "unknown");
        assert!(messages[1].files[1].is_externally_hosted());
        assert_eq!(messages[2].user_id, None);
    }

    #[tokio::test]
    async fn not_ok_response_is_a_chat_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/conversations.info");
            then.status(200)
                .json_body(json!({"ok": false, "error": "channel_not_found"}));
        });

        let err = client(&server).channel_name("C404").await.unwrap_err();
        assert!(matches!(err, AppError::Chat(_)));
        assert!(err.to_string().contains("channel_not_found"));
    }

    #[tokio::test]
    async fn post_message_returns_message_ref() {
        let server = MockServer::start();
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/chat.postMessage")
                .json_body_includes(json!({"channel": "U1", "text": "hello"}).to_string())
                .body_excludes("blocks");
            then.status(200)
                .json_body(json!({"ok": true, "channel": "D1", "ts": "1700.9"}));
        });

        let posted = client(&server)
            .post_message("U1", &OutboundMessage::plain("hello"))
            .await
            .expect("posted");

        post.assert();
        assert_eq!(posted, MessageRef::new("D1", "1700.9"));
    }

    #[tokio::test]
    async fn update_message_always_replaces_blocks() {
        let server = MockServer::start();
        let update = server.mock(|when, then| {
            when.method(POST)
                .path("/chat.update")
                .json_body_includes(
                    json!({"channel": "D1", "ts": "1700.9", "text": "done", "blocks": []})
                        .to_string(),
                );
            then.status(200).json_body(json!({"ok": true}));
        });

        client(&server)
            .update_message(&MessageRef::new("D1", "1700.9"), &OutboundMessage::plain("done"))
            .await
            .expect("updated");
        update.assert();
    }

    #[tokio::test]
    async fn user_without_real_name_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users.info").query_param("user", "U9");
            then.status(200).json_body(json!({"ok": true, "user": {"id": "U9"}}));
        });

        assert!(client(&server).user_display_name("U9").await.is_err());
    }

    #[tokio::test]
    async fn open_socket_connection_uses_app_token() {
        let server = MockServer::start();
        let open = server.mock(|when, then| {
            when.method(POST)
                .path("/apps.connections.open")
                .header("Authorization", "Bearer xapp-app");
            then.status(200)
                .json_body(json!({"ok": true, "url": "wss://socket.example/link"}));
        });

        let url = client(&server)
            .open_socket_connection()
            .await
            .expect("socket url");
        open.assert();
        assert_eq!(url, "wss://socket.example/link");
    }

    #[tokio::test]
    async fn downloads_private_file_to_destination() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/files/shot.png")
                .header("Authorization", "Bearer xoxb-bot");
            then.status(200).body("png-bytes");
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let destination = dir.path().join("shot.png");

        let written = client(&server)
            .download_to(&format!("{}/files/shot.png", server.base_url()), &destination)
            .await
            .expect("downloaded");

        assert_eq!(written, 9);
        assert_eq!(std::fs::read(&destination).expect("read"), b"png-bytes");
    }

    #[tokio::test]
    async fn failed_download_is_an_attachment_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/files/gone");
            then.status(404);
        });
        let dir = tempfile::tempdir().expect("tempdir");

        let result = client(&server)
            .download_to(
                &format!("{}/files/gone", server.base_url()),
                &dir.path().join("gone"),
            )
            .await;
        assert!(matches!(result, Err(AppError::Attachment(_))));
    }
}
