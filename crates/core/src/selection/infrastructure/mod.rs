pub mod scripted_selector;
pub mod terminal_selector;
