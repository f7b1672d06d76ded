/// A roster row as shown in the prune list.
#[derive(Debug, Clone)]
pub struct PruneRow {
    pub name: String,
    pub username: Option<String>,
    pub removed: bool,
}

/// What a keypress asks the prune loop to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum PruneCommand {
    Continue,
    Confirm(Vec<bool>),
    Abort,
}

#[derive(Debug, Clone)]
pub struct PruneState {
    pub channel: String,
    pub rows: Vec<PruneRow>,
    pub selected: usize,
    pub status: Option<String>,
}

impl PruneState {
    pub fn new(channel: &str, rows: Vec<PruneRow>) -> Self {
        Self {
            channel: channel.to_string(),
            rows,
            selected: 0,
            status: None,
        }
    }

    pub fn kept_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.removed).count()
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn jump_top(&mut self) {
        self.selected = 0;
    }

    pub fn jump_bottom(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    pub fn toggle_selected(&mut self) {
        if let Some(row) = self.rows.get_mut(self.selected) {
            row.removed = !row.removed;
            let verb = if row.removed { "Removed" } else { "Restored" };
            self.status = Some(format!("{} {}", verb, row.name));
        }
    }

    /// Keep-mask in roster order, or `None` (with a status message) when
    /// nobody would be left to call on.
    pub fn confirm(&mut self) -> Option<Vec<bool>> {
        if self.kept_count() == 0 {
            self.status = Some("At least one member must stay on the roster".to_string());
            return None;
        }
        Some(self.rows.iter().map(|r| !r.removed).collect())
    }
}
