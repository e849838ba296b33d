use crate::{
    edit::action::EditAction,
    foundation::error::{EditError, EditResult},
    model::sequence::Sequence,
};

/// One undoable step: a single edit or a consolidated group.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
    /// Display label.
    pub label: String,
    /// Edits in the order they were applied.
    pub edits: Vec<EditAction>,
}

/// Undo/redo stacks of applied edits.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct History {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
}

impl History {
    /// Empty history keeping at most `limit` undo entries (`0` keeps everything).
    pub fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record applied edits as one entry. Clears the redo stack.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.undo.push(entry);
        self.redo.clear();
        if self.limit > 0 && self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            // Dropped entries take the clips they own with them.
            self.undo.drain(..excess);
            tracing::debug!(dropped = excess, "history pruned");
        }
    }

    /// Revert the newest entry and return its label.
    pub fn undo(&mut self, seq: &mut Sequence) -> EditResult<String> {
        let mut entry = self
            .undo
            .pop()
            .ok_or_else(|| EditError::state("nothing to undo"))?;
        for i in (0..entry.edits.len()).rev() {
            if let Err(e) = entry.edits[i].undo_edit(seq) {
                for edit in &mut entry.edits[i + 1..] {
                    if let Err(redo) = edit.do_edit(seq) {
                        tracing::error!(error = %redo, label = %entry.label, "undo restore failed");
                    }
                }
                self.undo.push(entry);
                return Err(e);
            }
        }
        let label = entry.label.clone();
        self.redo.push(entry);
        Ok(label)
    }

    /// Re-apply the newest undone entry and return its label.
    pub fn redo(&mut self, seq: &mut Sequence) -> EditResult<String> {
        let mut entry = self
            .redo
            .pop()
            .ok_or_else(|| EditError::state("nothing to redo"))?;
        for i in 0..entry.edits.len() {
            if let Err(e) = entry.edits[i].do_edit(seq) {
                for edit in entry.edits[..i].iter_mut().rev() {
                    if let Err(undo) = edit.undo_edit(seq) {
                        tracing::error!(error = %undo, label = %entry.label, "redo restore failed");
                    }
                }
                self.redo.push(entry);
                return Err(e);
            }
        }
        let label = entry.label.clone();
        self.undo.push(entry);
        Ok(label)
    }

    /// `true` when there is something to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// `true` when there is something to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Labels of undoable entries, oldest first.
    pub fn undo_labels(&self) -> Vec<&str> {
        self.undo.iter().map(|e| e.label.as_str()).collect()
    }

    /// Labels of redoable entries, next redo last.
    pub fn redo_labels(&self) -> Vec<&str> {
        self.redo.iter().map(|e| e.label.as_str()).collect()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Change the entry limit, pruning immediately.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        if limit > 0 && self.undo.len() > limit {
            let excess = self.undo.len() - limit;
            self.undo.drain(..excess);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/stack.rs"]
mod tests;
