//! Webhook endpoints for the chat platform.
//!
//! Handlers acknowledge immediately and push the actual research onto the
//! bounded dispatcher; results are delivered asynchronously via the chat
//! client.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use ads_common::slack::SlackClient;

use crate::dispatch::{Dispatcher, ResearchJob};
use crate::error::AppError;

const MENTION_GREETING: &str = "👋 Hi! I can help you research keywords. Just mention me with a keyword like: `@keyword-research-bot digital marketing`";
const DM_GREETING: &str =
    "👋 Hi! I can help you research keywords. Just send me a keyword and I'll research it for you!";
const USAGE: &str =
    "Please provide a keyword to research. Usage: `/keyword-research digital marketing`";
const BUSY: &str =
    "⚠️ I'm handling too many research requests right now. Please try again in a moment.";

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub slack: Arc<SlackClient>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events))
        .route("/slack/command", post(slack_command))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "keyword-bot"}))
}

/// Event payloads arrive with a top-level `type`; only the fields we read
/// are modeled, everything else is ignored.
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    kind: String,
    challenge: Option<String>,
    event: Option<InboundEvent>,
}

#[derive(Debug, Deserialize)]
struct InboundEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
    channel: Option<String>,
    channel_type: Option<String>,
    /// Set when the message was authored by a bot (including this one).
    bot_id: Option<String>,
}

async fn slack_events(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<EventEnvelope>,
) -> Json<Value> {
    match envelope.kind.as_str() {
        "url_verification" => Json(json!({"challenge": envelope.challenge})),
        "event_callback" => {
            if let Some(event) = envelope.event {
                handle_event(&state, event).await;
            }
            Json(json!({"status": "ok"}))
        }
        _ => Json(json!({"status": "ok"})),
    }
}

async fn handle_event(state: &AppState, event: InboundEvent) {
    // Bot-authored messages come back through the events API too; reacting
    // to our own research posts would loop forever.
    if event.bot_id.is_some() {
        return;
    }
    let Some(channel) = event.channel else { return };

    let (keyword, greeting) = match event.kind.as_str() {
        "app_mention" => (strip_mentions(&event.text), MENTION_GREETING),
        "message" if event.channel_type.as_deref() == Some("im") => {
            (event.text.trim().to_string(), DM_GREETING)
        }
        _ => return,
    };

    if keyword.is_empty() {
        send_or_log(state, &channel, greeting).await;
        return;
    }

    // Events have no ephemeral reply channel, so a rejected job gets the
    // busy message posted where the request came from.
    if start_research(state, keyword, channel.clone()).await.is_err() {
        send_or_log(state, &channel, BUSY).await;
    }
}

#[derive(Debug, Deserialize)]
struct SlashCommand {
    command: String,
    #[serde(default)]
    text: String,
    channel_id: String,
}

async fn slack_command(
    State(state): State<Arc<AppState>>,
    Form(cmd): Form<SlashCommand>,
) -> Json<Value> {
    if cmd.command != "/keyword-research" {
        return Json(json!({"text": "Unknown command"}));
    }

    let keyword = cmd.text.trim().to_string();
    if keyword.is_empty() {
        return Json(json!({"response_type": "ephemeral", "text": USAGE}));
    }

    match start_research(&state, keyword, cmd.channel_id).await {
        Ok(()) => Json(json!({
            "response_type": "ephemeral",
            "text": "Keyword research started! Results will appear shortly."
        })),
        Err(_) => Json(json!({"response_type": "ephemeral", "text": BUSY})),
    }
}

/// Post the "researching" note to the channel, then queue the job.
async fn start_research(state: &AppState, keyword: String, channel: String) -> Result<(), AppError> {
    let note = format!("🔍 Researching keyword: *{keyword}*... This may take a few seconds.");
    send_or_log(state, &channel, &note).await;

    state
        .dispatcher
        .submit(ResearchJob { keyword, channel })
        .inspect_err(|e| warn!(error = %e, "rejecting research request"))
}

async fn send_or_log(state: &AppState, channel: &str, text: &str) {
    if let Err(e) = state.slack.post_message(channel, text).await {
        error!(error = %e, channel, "failed to post message");
    }
}

/// Remove every `<@...>` mention token and trim the remainder.
fn strip_mentions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<@") {
        out.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                // Unterminated token: keep it verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_mentions_removes_leading_token() {
        assert_eq!(
            strip_mentions("<@U0XXXXXXXX> digital marketing"),
            "digital marketing"
        );
    }

    #[test]
    fn strip_mentions_handles_multiple_and_embedded_tokens() {
        assert_eq!(strip_mentions("<@U1> seo <@U2> audit"), "seo  audit");
        assert_eq!(strip_mentions("no mentions here"), "no mentions here");
        assert_eq!(strip_mentions("<@U1>"), "");
    }

    #[test]
    fn strip_mentions_keeps_unterminated_token() {
        assert_eq!(strip_mentions("<@U123 oops"), "<@U123 oops");
    }

    #[test]
    fn url_verification_envelope() {
        let payload = r#"{"type": "url_verification", "challenge": "abc123", "token": "t"}"#;
        let envelope: EventEnvelope = serde_json::from_str(payload).unwrap();
        assert_eq!(envelope.kind, "url_verification");
        assert_eq!(envelope.challenge.as_deref(), Some("abc123"));
        assert!(envelope.event.is_none());
    }

    #[test]
    fn app_mention_envelope() {
        let payload = r#"{
            "type": "event_callback",
            "event": {
                "type": "app_mention",
                "text": "<@U0BOT> seo services",
                "channel": "C024BE91L",
                "user": "U2147483697"
            }
        }"#;
        let envelope: EventEnvelope = serde_json::from_str(payload).unwrap();
        let event = envelope.event.unwrap();
        assert_eq!(event.kind, "app_mention");
        assert_eq!(event.channel.as_deref(), Some("C024BE91L"));
        assert!(event.bot_id.is_none());
        assert_eq!(strip_mentions(&event.text), "seo services");
    }

    #[test]
    fn direct_message_envelope() {
        let payload = r#"{
            "type": "event_callback",
            "event": {
                "type": "message",
                "channel_type": "im",
                "text": "home cleaning dubai",
                "channel": "D0123456",
                "bot_id": "B999"
            }
        }"#;
        let envelope: EventEnvelope = serde_json::from_str(payload).unwrap();
        let event = envelope.event.unwrap();
        assert_eq!(event.channel_type.as_deref(), Some("im"));
        assert_eq!(event.bot_id.as_deref(), Some("B999"));
    }

    #[test]
    fn slash_command_form_decoding() {
        let cmd: SlashCommand = serde_urlencoded_from(
            "command=%2Fkeyword-research&text=digital+marketing&channel_id=C1&user_id=U1",
        );
        assert_eq!(cmd.command, "/keyword-research");
        assert_eq!(cmd.text, "digital marketing");
        assert_eq!(cmd.channel_id, "C1");
    }

    fn serde_urlencoded_from<T: serde::de::DeserializeOwned>(body: &str) -> T {
        serde_urlencoded::from_str(body).unwrap()
    }

    use std::net::SocketAddr;

    use tokio::sync::Mutex;

    /// Local stand-in for the chat API: records every posted text and
    /// acknowledges with `{"ok": true}`.
    async fn spawn_capture_server() -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::clone(&received);

        let app = Router::new().route(
            "/chat.postMessage",
            post(move |Json(body): Json<Value>| {
                let store = Arc::clone(&store);
                async move {
                    let text = body["text"].as_str().unwrap_or_default().to_string();
                    store.lock().await.push(text);
                    Json(json!({"ok": true}))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, received)
    }

    fn test_state(addr: SocketAddr, dispatcher: Dispatcher) -> AppState {
        let slack =
            SlackClient::with_base_url("xoxb-test".to_string(), format!("http://{addr}")).unwrap();
        AppState {
            dispatcher,
            slack: Arc::new(slack),
        }
    }

    fn mention_event(text: &str) -> InboundEvent {
        InboundEvent {
            kind: "app_mention".to_string(),
            text: text.to_string(),
            channel: Some("C024BE91L".to_string()),
            channel_type: None,
            bot_id: None,
        }
    }

    #[tokio::test]
    async fn full_queue_posts_busy_reply_to_channel() {
        let (addr, received) = spawn_capture_server().await;

        // One worker stuck forever, queue of one. Fill the queue, let the
        // worker trap itself on a job, then fill it again so it stays full.
        let dispatcher =
            Dispatcher::start(1, 1, |_job| async { std::future::pending::<()>().await });
        let filler = || ResearchJob {
            keyword: "filler".to_string(),
            channel: "C0".to_string(),
        };
        while dispatcher.submit(filler()).is_ok() {}
        tokio::task::yield_now().await;
        while dispatcher.submit(filler()).is_ok() {}

        let state = test_state(addr, dispatcher);
        handle_event(&state, mention_event("<@U0BOT> seo services")).await;

        let posts = received.lock().await;
        assert_eq!(posts.len(), 2, "expected researching note then busy reply");
        assert!(posts[0].contains("Researching keyword"));
        assert_eq!(posts[1], BUSY);
    }

    #[tokio::test]
    async fn empty_mention_gets_mention_greeting() {
        let (addr, received) = spawn_capture_server().await;
        let state = test_state(addr, Dispatcher::start(4, 1, |_job| async {}));

        handle_event(&state, mention_event("<@U0BOT>   ")).await;

        let posts = received.lock().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0], MENTION_GREETING);
    }

    #[tokio::test]
    async fn empty_direct_message_gets_dm_greeting() {
        let (addr, received) = spawn_capture_server().await;
        let state = test_state(addr, Dispatcher::start(4, 1, |_job| async {}));

        let event = InboundEvent {
            kind: "message".to_string(),
            text: "   ".to_string(),
            channel: Some("D0123456".to_string()),
            channel_type: Some("im".to_string()),
            bot_id: None,
        };
        handle_event(&state, event).await;

        let posts = received.lock().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0], DM_GREETING);
    }
}
