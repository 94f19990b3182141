mod completion;
mod editor;
mod view;

pub use completion::{
    flatten_vocabulary, get_word_before_cursor, sql_keywords, CompletionItem, CompletionKind,
    CompletionPopup, HintOptions, WordAtCursor,
};
pub use editor::{
    ChangeEvent, ChangeOrigin, EditorHandle, EditorListener, EditorOptions, EditorSurface,
    HintTrigger,
};
pub use view::render_editor;
