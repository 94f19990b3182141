use crate::vocabulary::Vocabulary;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Keyword,
    Table,
    Column,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    pub detail: Option<String>, // owning table for columns
}

impl CompletionItem {
    pub fn keyword(s: &str) -> Self {
        Self {
            label: s.to_uppercase(),
            kind: CompletionKind::Keyword,
            detail: None,
        }
    }

    pub fn table(name: String) -> Self {
        Self {
            label: name,
            kind: CompletionKind::Table,
            detail: None,
        }
    }

    pub fn column(name: String, table: Option<String>) -> Self {
        Self {
            label: name,
            kind: CompletionKind::Column,
            detail: table,
        }
    }

    /// Case-insensitive prefix match.
    pub fn matches(&self, prefix: &str) -> bool {
        self.label.to_lowercase().starts_with(&prefix.to_lowercase())
    }
}

pub struct CompletionPopup {
    pub active: bool,
    items: Vec<CompletionItem>,
    filtered: Vec<usize>, // indices into items that match the current filter
    pub selected: usize,  // index into filtered
    pub prefix: String,   // the word prefix being completed
    pub start_col: usize, // column position where the prefix starts
}

impl CompletionPopup {
    pub fn new() -> Self {
        Self {
            active: false,
            items: Vec::new(),
            filtered: Vec::new(),
            selected: 0,
            prefix: String::new(),
            start_col: 0,
        }
    }

    pub fn open(&mut self, items: Vec<CompletionItem>, prefix: String, start_col: usize) {
        self.items = items;
        self.prefix = prefix.to_lowercase();
        self.start_col = start_col;
        self.filter();
        self.selected = 0;
        self.active = !self.filtered.is_empty();
    }

    pub fn close(&mut self) {
        self.active = false;
        self.items.clear();
        self.filtered.clear();
        self.selected = 0;
        self.prefix.clear();
    }

    fn filter(&mut self) {
        let prefix = &self.prefix;
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.matches(prefix))
            .map(|(i, _)| i)
            .collect();
    }

    pub fn update_prefix(&mut self, prefix: String) {
        self.prefix = prefix.to_lowercase();
        self.filter();
        self.selected = 0;
        if self.filtered.is_empty() {
            self.active = false;
        }
    }

    pub fn select_next(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = (self.selected + 1) % self.filtered.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.filtered.len() - 1);
        }
    }

    pub fn selected_item(&self) -> Option<&CompletionItem> {
        self.filtered
            .get(self.selected)
            .and_then(|&i| self.items.get(i))
    }

    /// Number of items matching the current prefix.
    pub fn match_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn visible_items(&self, max_items: usize) -> Vec<(usize, &CompletionItem)> {
        // Return items around the selected one
        let total = self.filtered.len();
        if total == 0 || max_items == 0 {
            return Vec::new();
        }

        let start = if total <= max_items || self.selected < max_items / 2 {
            0
        } else if self.selected > total - max_items / 2 {
            total - max_items
        } else {
            self.selected - max_items / 2
        };

        let end = (start + max_items).min(total);

        (start..end)
            .filter_map(|i| {
                self.filtered
                    .get(i)
                    .and_then(|&idx| self.items.get(idx).map(|item| (i, item)))
            })
            .collect()
    }
}

impl Default for CompletionPopup {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten a vocabulary into candidates: every table name, then every field
/// name of every table.
///
/// A field present in several tables yields one candidate per table.
pub fn flatten_vocabulary(vocabulary: &Vocabulary) -> Vec<CompletionItem> {
    let tables = vocabulary
        .tables()
        .iter()
        .map(|t| CompletionItem::table(t.name.clone()));
    let fields = vocabulary.tables().iter().flat_map(|t| {
        t.fields
            .iter()
            .map(|f| CompletionItem::column(f.clone(), Some(t.name.clone())))
    });
    tables.chain(fields).collect()
}

/// Candidate source handed to the completion popup.
#[derive(Clone, Debug, Default)]
pub struct HintOptions {
    pub vocabulary: Vocabulary,
    /// Append SQL keywords after vocabulary candidates
    pub keywords: bool,
}

impl HintOptions {
    /// Candidates for `word`. A `table.` qualifier narrows them to the
    /// fields of that table; an unknown qualifier has no candidates.
    pub fn candidates(&self, word: &WordAtCursor) -> Vec<CompletionItem> {
        if let Some(table) = &word.qualifier {
            return self
                .vocabulary
                .fields_of(table)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|f| CompletionItem::column(f.clone(), Some(table.clone())))
                        .collect()
                })
                .unwrap_or_default();
        }

        let mut items = flatten_vocabulary(&self.vocabulary);
        if self.keywords {
            items.extend(sql_keywords().into_iter().map(CompletionItem::keyword));
        }
        items
    }
}

pub fn sql_keywords() -> Vec<&'static str> {
    vec![
        // DML
        "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "EXISTS", "BETWEEN", "LIKE", "IS",
        "NULL", "TRUE", "FALSE", "ORDER", "BY", "ASC", "DESC", "LIMIT", "OFFSET", "GROUP",
        "HAVING", "DISTINCT", "ALL", "AS", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER",
        "CROSS", "ON", "USING", "UNION", "INTERSECT", "EXCEPT", "INSERT", "INTO", "VALUES",
        "DEFAULT", "RETURNING", "UPDATE", "SET", "DELETE",
        // DDL
        "CREATE", "ALTER", "DROP", "TABLE", "INDEX", "VIEW", "PRIMARY", "KEY", "FOREIGN",
        "REFERENCES", "UNIQUE", "CHECK", "CONSTRAINT",
        // Functions
        "COUNT", "SUM", "AVG", "MIN", "MAX", "COALESCE", "NULLIF", "CASE", "WHEN", "THEN", "ELSE",
        "END", "CAST", "LOWER", "UPPER", "TRIM", "SUBSTR", "LENGTH",
        // Other
        "EXPLAIN", "WITH", "RECURSIVE",
    ]
}

/// The word being typed before the cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordAtCursor {
    /// Table name before a `.`, as in `users.na`
    pub qualifier: Option<String>,
    /// Identifier characters between the word start and the cursor
    pub prefix: String,
    /// Char column where `prefix` starts
    pub start_col: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Get the word being typed before the cursor position (`col` counts chars).
pub fn get_word_before_cursor(line: &str, col: usize) -> WordAtCursor {
    let before: Vec<char> = line.chars().take(col).collect();

    let start = before
        .iter()
        .rposition(|c| !is_word_char(*c))
        .map(|i| i + 1)
        .unwrap_or(0);
    let prefix: String = before[start..].iter().collect();

    let qualifier = if start > 0 && before[start - 1] == '.' {
        let dot = start - 1;
        let table_start = before[..dot]
            .iter()
            .rposition(|c| !is_word_char(*c))
            .map(|i| i + 1)
            .unwrap_or(0);
        Some(before[table_start..dot].iter().collect::<String>()).filter(|t| !t.is_empty())
    } else {
        None
    };

    WordAtCursor {
        qualifier,
        prefix,
        start_col: start,
    }
}
