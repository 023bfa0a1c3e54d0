mod input;
mod key_result;
mod paragraph_input;
mod prompt;

pub use key_result::KeyResult;
pub use paragraph_input::{ParagraphEvent, ParagraphInput};
pub use prompt::ConfirmPrompt;
