use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A work-breakdown entry in the left panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: Uuid,
    pub title: String,
    /// Ordinal used to sort rows top to bottom.
    pub position: i64,
    #[serde(default)]
    pub category: String,
    /// Ancestor hops to a root row.
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub children: Option<Vec<Uuid>>,
    #[serde(default = "default_expanded")]
    pub expanded: bool,
}

fn default_expanded() -> bool {
    true
}

impl Row {
    /// Create an expanded root row.
    pub fn new(title: impl Into<String>, position: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            position,
            category: String::new(),
            depth: 0,
            parent_id: None,
            children: None,
            expanded: true,
        }
    }

    /// Create a row nested under `parent`, registering it in the parent's child list.
    pub fn new_child(parent: &mut Row, title: impl Into<String>, position: i64) -> Self {
        let mut row = Self::new(title, position);
        row.parent_id = Some(parent.id);
        row.depth = parent.depth + 1;
        parent.children.get_or_insert_with(Vec::new).push(row.id);
        row
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn child_ids(&self) -> &[Uuid] {
        self.children.as_deref().unwrap_or(&[])
    }
}
