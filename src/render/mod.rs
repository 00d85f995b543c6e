pub mod blocks;
pub mod messages;
pub mod modal;

pub const EDIT_ACTION_ID: &str = "edit_ticket";
pub const CANCEL_ACTION_ID: &str = "cancel_ticket";
pub const APPROVE_CALLBACK_PREFIX: &str = "approve_ticket_";

/// Block and action ids of the review form inputs.
pub mod form {
    #[derive(Debug, Clone, Copy)]
    pub struct Field {
        pub block_id: &'static str,
        pub action_id: &'static str,
    }

    pub const TITLE: Field = Field {
        block_id: "title",
        action_id: "title_input",
    };
    pub const PROJECT: Field = Field {
        block_id: "project",
        action_id: "project_input",
    };
    pub const EPIC: Field = Field {
        block_id: "epic",
        action_id: "epic_input",
    };
    pub const ISSUE_TYPE: Field = Field {
        block_id: "type",
        action_id: "type_select",
    };
    pub const PRIORITY: Field = Field {
        block_id: "priority",
        action_id: "priority_select",
    };
    pub const DESCRIPTION: Field = Field {
        block_id: "description",
        action_id: "desc_input",
    };
}
