pub mod conversation;
pub mod draft;
pub mod lifecycle;
pub mod ticket;
