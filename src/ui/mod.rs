pub mod markdown;
pub mod terminal;

pub use markdown::MarkdownStream;
pub use terminal::{
    print_banner, print_error, print_history, print_info, print_models, verdict_badge,
    TerminalRenderer,
};
