//! Binding of an editor surface to a backing form field.
//!
//! The field stays the single source of truth outside the editor: it seeds
//! the editor, receives every edit, and is written once more right before
//! its form is serialized.

use tracing::debug;

use crate::config::Config;
use crate::document::Document;
use crate::error::BridgeError;
use crate::ui::{ChangeOrigin, EditorHandle, EditorOptions, EditorSurface, HintTrigger};
use crate::vocabulary::Vocabulary;

/// Mount a SQL editor at `target_id`, bound to the field `field_id`, using
/// the default configuration.
///
/// `target_id` and `field_id` may name the same element. An absent
/// vocabulary behaves like an empty one.
pub fn init_query_editor(
    document: &Document,
    target_id: &str,
    field_id: &str,
    vocabulary: Option<Vocabulary>,
) -> Result<EditorHandle, BridgeError> {
    init_query_editor_with_config(document, target_id, field_id, vocabulary, &Config::default())
}

/// Like [`init_query_editor`], with editor, completion and keymap settings
/// taken from `config`.
pub fn init_query_editor_with_config(
    document: &Document,
    target_id: &str,
    field_id: &str,
    vocabulary: Option<Vocabulary>,
    config: &Config,
) -> Result<EditorHandle, BridgeError> {
    let field = document.field(field_id)?;
    document.element(target_id)?;

    let vocabulary = vocabulary.unwrap_or_default();
    debug!(
        target = target_id,
        field = field_id,
        tables = vocabulary.len(),
        "mounting query editor"
    );
    let mut surface = EditorSurface::new(&field.value(), EditorOptions::from_config(config, vocabulary));

    let mirror = field.clone();
    surface.on_change(move |editor, _| mirror.set_value(&editor.text()));

    surface.on_input_read(|editor, change| {
        if change.origin != ChangeOrigin::SetValue {
            editor.show_hint(HintTrigger::Auto);
        }
    });

    let handle = EditorHandle::new(target_id, surface);

    match field.form() {
        Some(form) => {
            let editor = handle.clone();
            let field = field.clone();
            form.on_submit(move || field.set_value(&editor.text()));
            debug!(form = %form.id(), field = field_id, "submit sync registered");
        }
        None => debug!(field = field_id, "field has no form, skipping submit sync"),
    }

    Ok(handle)
}
