//! Typed shapes of the inbound Socket Mode payloads, normalized into
//! [`Inbound`] at the edge so nothing downstream indexes raw JSON.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::draft::{DraftId, MessageRef};
use crate::error::{AppError, AppResult};
use crate::render::{APPROVE_CALLBACK_PREFIX, CANCEL_ACTION_ID, EDIT_ACTION_ID, form};
use crate::workflow::Trigger;
use crate::workflow::review::{CancelRequest, EditRequest, ReviewForm, Submission};

/// What a payload asks the bridge to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Reaction { trigger: Trigger, reaction: String },
    Edit(EditRequest),
    Cancel(CancelRequest),
    Submit(Submission),
    Ignored(String),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventEnvelope {
    EventCallback { event: ChatEvent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatEvent {
    ReactionAdded {
        user: String,
        reaction: String,
        item: ReactionItem,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ReactionItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InteractivePayload {
    BlockActions {
        user: IdOnly,
        #[serde(default)]
        channel: Option<IdOnly>,
        #[serde(default)]
        message: Option<MessageTs>,
        #[serde(default)]
        trigger_id: Option<String>,
        #[serde(default)]
        actions: Vec<BlockAction>,
    },
    ViewSubmission {
        user: IdOnly,
        view: SubmittedView,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageTs {
    ts: String,
}

#[derive(Debug, Deserialize)]
struct BlockAction {
    action_id: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmittedView {
    callback_id: String,
    state: ViewState,
}

#[derive(Debug, Deserialize)]
struct ViewState {
    values: HashMap<String, HashMap<String, FieldValue>>,
}

#[derive(Debug, Deserialize)]
struct FieldValue {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    selected_option: Option<SelectedOption>,
}

#[derive(Debug, Deserialize)]
struct SelectedOption {
    value: String,
}

/// Parses an `events_api` envelope payload.
pub fn parse_event(payload: Value) -> AppResult<Inbound> {
    let envelope: EventEnvelope = serde_json::from_value(payload)
        .map_err(|err| AppError::Payload(format!("event: {err}")))?;
    let EventEnvelope::EventCallback { event } = envelope else {
        return Ok(Inbound::Ignored("not an event callback".to_string()));
    };
    let ChatEvent::ReactionAdded {
        user,
        reaction,
        item,
    } = event
    else {
        return Ok(Inbound::Ignored("not a reaction".to_string()));
    };
    if item.kind != "message" {
        return Ok(Inbound::Ignored(format!("reaction on a {}", item.kind)));
    }
    let (Some(channel), Some(ts)) = (item.channel, item.ts) else {
        return Err(AppError::Payload(
            "reacted message has no channel or ts".to_string(),
        ));
    };
    Ok(Inbound::Reaction {
        trigger: Trigger {
            origin: MessageRef::new(&channel, &ts),
            user_id: user,
        },
        reaction,
    })
}

/// Parses an `interactive` envelope payload: button clicks and form
/// submissions.
pub fn parse_interaction(payload: Value) -> AppResult<Inbound> {
    let payload: InteractivePayload = serde_json::from_value(payload)
        .map_err(|err| AppError::Payload(format!("interaction: {err}")))?;
    match payload {
        InteractivePayload::BlockActions {
            user,
            channel,
            message,
            trigger_id,
            actions,
        } => {
            let Some(action) = actions.into_iter().next() else {
                return Ok(Inbound::Ignored("block action without actions".to_string()));
            };
            match action.action_id.as_str() {
                EDIT_ACTION_ID => {
                    let draft_id = draft_id_from(action.value.as_deref())?;
                    let channel = channel
                        .ok_or_else(|| AppError::Payload("edit without channel".to_string()))?;
                    let trigger_id = trigger_id
                        .ok_or_else(|| AppError::Payload("edit without trigger_id".to_string()))?;
                    Ok(Inbound::Edit(EditRequest {
                        draft_id,
                        user_id: user.id,
                        channel_id: channel.id,
                        trigger_id,
                    }))
                }
                CANCEL_ACTION_ID => {
                    let draft_id = draft_id_from(action.value.as_deref())?;
                    let (Some(channel), Some(message)) = (channel, message) else {
                        return Err(AppError::Payload(
                            "cancel without a source message".to_string(),
                        ));
                    };
                    Ok(Inbound::Cancel(CancelRequest {
                        draft_id,
                        user_id: user.id,
                        status_message: MessageRef::new(&channel.id, &message.ts),
                    }))
                }
                other => Ok(Inbound::Ignored(format!("unhandled action {other}"))),
            }
        }
        InteractivePayload::ViewSubmission { user, view } => {
            let Some(raw_id) = view.callback_id.strip_prefix(APPROVE_CALLBACK_PREFIX) else {
                return Ok(Inbound::Ignored(format!(
                    "unhandled view {}",
                    view.callback_id
                )));
            };
            let draft_id = draft_id_from(Some(raw_id))?;
            Ok(Inbound::Submit(Submission {
                draft_id,
                user_id: user.id,
                form: read_form(&view.state)?,
            }))
        }
        InteractivePayload::Other => Ok(Inbound::Ignored("unhandled interaction".to_string())),
    }
}

fn draft_id_from(value: Option<&str>) -> AppResult<DraftId> {
    let value = value.unwrap_or_default();
    DraftId::parse(value).ok_or_else(|| AppError::Payload(format!("invalid draft id '{value}'")))
}

fn read_form(state: &ViewState) -> AppResult<ReviewForm> {
    let required = |field: form::Field| {
        field_value(state, field)
            .ok_or_else(|| AppError::Payload(format!("form is missing {}", field.block_id)))
    };
    Ok(ReviewForm {
        title: required(form::TITLE)?,
        issue_type: required(form::ISSUE_TYPE)?,
        priority: required(form::PRIORITY)?,
        description: field_value(state, form::DESCRIPTION).unwrap_or_default(),
        project_key: required(form::PROJECT)?,
        epic_key: field_value(state, form::EPIC),
    })
}

fn field_value(state: &ViewState, field: form::Field) -> Option<String> {
    let entry = state.values.get(field.block_id)?.get(field.action_id)?;
    entry
        .selected_option
        .as_ref()
        .map(|option| option.value.clone())
        .or_else(|| entry.value.clone())
}
