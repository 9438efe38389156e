// SPDX-License-Identifier: MIT
//
// Editor options.
//
// Everything here ends up as an attribute on the container element when
// the editor mounts, except `max_sync_rounds`, which bounds the editor's
// own feedback loop.
//
// | Field               | Attribute         | Default     |
// |---------------------|-------------------|-------------|
// | (always)            | `contenteditable` | `"true"`    |
// | `auto_correct`      | `autocorrect`     | `"off"`     |
// | `spell_check`       | `spellcheck`      | `"false"`   |
// | `role`              | `role`            | `"textbox"` |
// | `tab_index`         | `tabindex`        | `"0"`       |
// | `disable_grammarly` | `data-gramm`      | `"false"`   |
// | `class_name`        | `class`           | (unset)     |
// | `id`                | `id`              | (unset)     |
//
// Options deserialize from any serde format with every field optional, so
// a host config file only names what it changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Options for an [`Editor`](crate::Editor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    pub auto_correct: bool,
    pub spell_check: bool,
    pub role: String,
    pub tab_index: i32,
    /// Grammarly rewrites the DOM behind the editor's back.
    pub disable_grammarly: bool,
    pub class_name: Option<String>,
    pub id: Option<String>,
    /// How many render → selectionchange → dispatch rounds
    /// [`Editor::run`](crate::Editor::run) performs before giving up.
    pub max_sync_rounds: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            auto_correct: false,
            spell_check: false,
            role: "textbox".to_owned(),
            tab_index: 0,
            disable_grammarly: true,
            class_name: None,
            id: None,
            max_sync_rounds: 8,
        }
    }
}

impl EditorOptions {
    /// The container element's attributes.
    #[must_use]
    pub fn attributes(&self) -> BTreeMap<String, String> {
        let mut attributes = BTreeMap::new();
        let mut set = |name: &str, value: String| {
            attributes.insert(name.to_owned(), value);
        };

        set("contenteditable", "true".to_owned());
        set("autocorrect", if self.auto_correct { "on" } else { "off" }.to_owned());
        set("spellcheck", self.spell_check.to_string());
        set("role", self.role.clone());
        set("tabindex", self.tab_index.to_string());
        if self.disable_grammarly {
            set("data-gramm", "false".to_owned());
        }
        if let Some(class_name) = &self.class_name {
            set("class", class_name.clone());
        }
        if let Some(id) = &self.id {
            set("id", id.clone());
        }
        attributes
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
