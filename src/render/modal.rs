use crate::domain::draft::DraftId;
use crate::domain::ticket::{IssueRouting, IssueType, Priority, TicketDraft};
use crate::render::blocks::{Block, InputElement, ModalView, SelectOption, TextObject};
use crate::render::{APPROVE_CALLBACK_PREFIX, form};
use crate::text::truncate_chars;

/// Platform limit for a plain-text input's initial value.
const DESCRIPTION_INITIAL_LIMIT: usize = 3000;

pub fn approve_callback_id(id: &DraftId) -> String {
    format!("{APPROVE_CALLBACK_PREFIX}{id}")
}

pub fn review_modal(
    id: &DraftId,
    ticket: &TicketDraft,
    file_count: usize,
    defaults: &IssueRouting,
) -> ModalView {
    ModalView {
        kind: "modal",
        callback_id: approve_callback_id(id),
        title: TextObject::plain("Review Ticket"),
        submit: TextObject::plain("Create Ticket"),
        close: TextObject::plain("Cancel"),
        blocks: vec![
            text_input(form::TITLE, "Title", Some(ticket.title.as_str()), false),
            Block::context(format!(
                "📎 *{file_count} file(s)* will be attached after creation"
            )),
            Block::Divider,
            text_input(
                form::PROJECT,
                "Project Key",
                Some(defaults.project_key.as_str()),
                false,
            ),
            Block::Input {
                block_id: form::EPIC.block_id.to_string(),
                label: TextObject::plain("Epic Link (Key)"),
                element: InputElement::PlainTextInput {
                    action_id: form::EPIC.action_id.to_string(),
                    initial_value: defaults.epic_key.clone(),
                    multiline: false,
                    placeholder: Some(TextObject::plain(
                        "e.g., GOD-12345 (leave empty for none)",
                    )),
                },
                optional: true,
            },
            Block::Divider,
            select_input(
                form::ISSUE_TYPE,
                "Type",
                ticket.issue_type.as_str(),
                IssueType::ALL.iter().map(IssueType::as_str),
            ),
            select_input(
                form::PRIORITY,
                "Priority",
                ticket.priority.label(),
                Priority::KNOWN.iter().map(Priority::label),
            ),
            text_input(
                form::DESCRIPTION,
                "Description",
                Some(truncate_chars(&ticket.description, DESCRIPTION_INITIAL_LIMIT)),
                true,
            ),
        ],
    }
}

fn text_input(field: form::Field, label: &str, initial: Option<&str>, multiline: bool) -> Block {
    Block::Input {
        block_id: field.block_id.to_string(),
        label: TextObject::plain(label),
        element: InputElement::PlainTextInput {
            action_id: field.action_id.to_string(),
            initial_value: initial.map(str::to_string),
            multiline,
            placeholder: None,
        },
        optional: false,
    }
}

fn select_input<'a>(
    field: form::Field,
    label: &str,
    selected: &str,
    options: impl Iterator<Item = &'a str>,
) -> Block {
    Block::Input {
        block_id: field.block_id.to_string(),
        label: TextObject::plain(label),
        element: InputElement::StaticSelect {
            action_id: field.action_id.to_string(),
            initial_option: Some(SelectOption::new(selected)),
            options: options.map(SelectOption::new).collect(),
        },
        optional: false,
    }
}
