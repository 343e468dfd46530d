//! Translation from neutral request types into the Gemini wire format

mod history;
mod schema;
mod tools;

pub use history::{build_history, validate_messages};
pub use schema::{MAX_SCHEMA_DEPTH, convert_property, convert_response_schema, convert_tool_schema};
pub use tools::{convert_tool_to_function, convert_tools};
