//! [`ChannelClient`] implementation over the Bot API.

use {
    async_trait::async_trait,
    serde_json::{Value, json},
    tokio::sync::Mutex,
    tracing::{debug, info},
};

use tgferry_core::{ChannelClient, ChannelHandle, ChannelRef, Error, Media, Message};

use crate::{
    api::{ApiResult, BotApi},
    config::TelegramConfig,
    updates::UpdateBuffer,
    wire::{RawChat, RawUpdate},
};

pub struct TelegramClient {
    api: BotApi,
    buffer: Mutex<UpdateBuffer>,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    /// Connect and verify credentials with `getMe`; a bad token fails here,
    /// before any channel work starts. Clears any webhook so `getUpdates`
    /// polling works.
    pub async fn connect(config: TelegramConfig) -> ApiResult<Self> {
        let api = BotApi::new(&config.api_root, &config.token);
        let me: Value = api.call("getMe", json!({})).await?;
        info!(
            username = me.get("username").and_then(serde_json::Value::as_str).unwrap_or("?"),
            "telegram bot connected"
        );
        let _: Value = api.call("deleteWebhook", json!({})).await?;
        Ok(Self::from_api(api, config.poll_timeout_secs))
    }

    fn from_api(api: BotApi, poll_timeout_secs: u64) -> Self {
        Self {
            api,
            buffer: Mutex::new(UpdateBuffer::new()),
            poll_timeout_secs,
        }
    }

    /// Drain pending updates into the buffer, confirming them by offset.
    async fn refresh(&self) -> ApiResult<()> {
        let mut buffer = self.buffer.lock().await;
        loop {
            let updates: Vec<RawUpdate> = self
                .api
                .call(
                    "getUpdates",
                    json!({
                        "offset": buffer.offset(),
                        "timeout": self.poll_timeout_secs,
                        "allowed_updates": ["channel_post"],
                    }),
                )
                .await?;
            if updates.is_empty() {
                return Ok(());
            }
            debug!(count = updates.len(), "drained telegram updates");
            buffer.absorb(updates);
        }
    }
}

#[async_trait]
impl ChannelClient for TelegramClient {
    async fn resolve(&self, channel: &ChannelRef) -> tgferry_core::Result<ChannelHandle> {
        let chat_id = match channel {
            ChannelRef::Id(id) => json!(id),
            ChannelRef::Handle(handle) => json!(format!("@{handle}")),
        };
        let chat: RawChat = self
            .api
            .call("getChat", json!({"chat_id": chat_id}))
            .await
            .map_err(|e| Error::resolution(channel.to_string(), e.to_string()))?;
        let id = chat.id;
        let title = chat
            .title
            .or(chat.username)
            .unwrap_or_else(|| id.to_string());
        Ok(ChannelHandle { id, title })
    }

    async fn latest_message(&self, channel: &ChannelHandle) -> tgferry_core::Result<Option<Message>> {
        self.refresh().await.map_err(|e| Error::fetch(channel.id, e))?;
        Ok(self.buffer.lock().await.newest(channel.id))
    }

    async fn messages_after(
        &self,
        channel: &ChannelHandle,
        min_id: i64,
    ) -> tgferry_core::Result<Vec<Message>> {
        self.refresh().await.map_err(|e| Error::fetch(channel.id, e))?;
        Ok(self.buffer.lock().await.drain_after(channel.id, min_id))
    }

    async fn forward(
        &self,
        dest: i64,
        from: &ChannelHandle,
        message: &Message,
    ) -> tgferry_core::Result<()> {
        let _: Value = self
            .api
            .call(
                "forwardMessage",
                json!({
                    "chat_id": dest,
                    "from_chat_id": from.id,
                    "message_id": message.id,
                }),
            )
            .await
            .map_err(Error::delivery)?;
        Ok(())
    }

    async fn send_text(&self, dest: i64, text: &str) -> tgferry_core::Result<()> {
        let _: Value = self
            .api
            .call("sendMessage", json!({"chat_id": dest, "text": text}))
            .await
            .map_err(Error::delivery)?;
        Ok(())
    }

    async fn send_media(
        &self,
        dest: i64,
        media: &Media,
        caption: Option<&str>,
    ) -> tgferry_core::Result<()> {
        let (method, field, file_id) = match media {
            Media::Photo { file_id } => ("sendPhoto", "photo", file_id),
            Media::Document { file_id } => ("sendDocument", "document", file_id),
            Media::WebPage { url } => {
                let body = match caption {
                    Some(text) if !text.contains(url.as_str()) => format!("{text}\n\n{url}"),
                    Some(text) => text.to_string(),
                    None => url.clone(),
                };
                return self.send_text(dest, &body).await;
            },
            Media::Other { kind } => {
                let body = match caption {
                    Some(text) => text.to_string(),
                    None => format!("[unsupported {kind} message]"),
                };
                return self.send_text(dest, &body).await;
            },
        };

        let mut payload = json!({"chat_id": dest, field: file_id});
        if let Some(caption) = caption
            && let Some(obj) = payload.as_object_mut()
        {
            obj.insert("caption".into(), Value::String(caption.to_string()));
        }
        let _: Value = self.api.call(method, payload).await.map_err(Error::delivery)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {mockito::Matcher, secrecy::Secret, serde_json::json};

    use super::*;

    fn client(server: &mockito::Server) -> TelegramClient {
        let api = BotApi::new(&server.url(), &Secret::new("TOKEN".to_string()));
        TelegramClient::from_api(api, 0)
    }

    fn message_result() -> Value {
        json!({"ok": true, "result": {"message_id": 1, "chat": {"id": -100900}}})
    }

    #[tokio::test]
    async fn resolves_handles_via_get_chat() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTOKEN/getChat")
            .match_body(Matcher::PartialJson(json!({"chat_id": "@news"})))
            .with_body(
                json!({"ok": true, "result": {"id": -1001234, "title": "News"}}).to_string(),
            )
            .create_async()
            .await;

        let handle = client(&server)
            .resolve(&ChannelRef::Handle("news".into()))
            .await
            .unwrap();
        assert_eq!(handle.id, -1001234);
        assert_eq!(handle.title, "News");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_chat_is_a_resolution_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botTOKEN/getChat")
            .with_status(400)
            .with_body(
                json!({"ok": false, "error_code": 400, "description": "chat not found"})
                    .to_string(),
            )
            .create_async()
            .await;

        let err = client(&server)
            .resolve(&ChannelRef::Id(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Resolution { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn messages_after_drains_updates_until_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botTOKEN/getUpdates")
            .match_body(Matcher::PartialJson(json!({"offset": 0})))
            .with_body(
                json!({"ok": true, "result": [
                    {"update_id": 700, "channel_post":
                        {"message_id": 12, "chat": {"id": -1001}, "text": "new post"}}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("POST", "/botTOKEN/getUpdates")
            .match_body(Matcher::PartialJson(json!({"offset": 701})))
            .with_body(json!({"ok": true, "result": []}).to_string())
            .create_async()
            .await;

        let channel = ChannelHandle { id: -1001, title: "news".into() };
        let messages = client(&server).messages_after(&channel, 10).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, 12);
        assert_eq!(messages[0].text.as_deref(), Some("new post"));
    }

    #[tokio::test]
    async fn forward_posts_the_reference() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTOKEN/forwardMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": -100900,
                "from_chat_id": -1001,
                "message_id": 12,
            })))
            .with_body(message_result().to_string())
            .create_async()
            .await;

        let from = ChannelHandle { id: -1001, title: "news".into() };
        let message = Message { id: 12, text: Some("hi".into()), media: None };
        client(&server).forward(-100900, &from, &message).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_media_uploads_by_file_id_with_caption() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTOKEN/sendPhoto")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": -100900,
                "photo": "photo-1",
                "caption": "hello",
            })))
            .with_body(message_result().to_string())
            .create_async()
            .await;

        client(&server)
            .send_media(
                -100900,
                &Media::Photo { file_id: "photo-1".into() },
                Some("hello"),
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
