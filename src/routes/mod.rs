//! HTTP routes for Mediasite

pub mod contact;
pub mod content;
pub mod debug;
pub mod health;
pub mod response;

pub use contact::{handle_get_message, handle_list_messages, handle_mark_read, handle_submit_contact};
pub use content::{handle_get_content, handle_list_content};
pub use debug::handle_debug;
pub use health::{health_check, version_info};
pub use response::{error_response, json_response, not_found_response, preflight_response, FullBody};
