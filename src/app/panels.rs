// ABOUTME: Collapsible category panels and their toggle icon state

use tracing::warn;

/// Rotation of a panel's toggle icon, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconRotation {
    Deg0,
    Deg180,
}

impl IconRotation {
    pub fn degrees(self) -> u16 {
        match self {
            IconRotation::Deg0 => 0,
            IconRotation::Deg180 => 180,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            IconRotation::Deg0 => "▶",
            IconRotation::Deg180 => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPanel {
    pub title: String,
    pub description: String,
    expanded: bool,
    icon: IconRotation,
}

impl CategoryPanel {
    pub fn new(title: String, description: String) -> Self {
        Self {
            title,
            description,
            expanded: false,
            icon: IconRotation::Deg0,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn icon(&self) -> IconRotation {
        self.icon
    }

    fn toggle(&mut self) {
        if self.expanded {
            self.expanded = false;
            self.icon = IconRotation::Deg0;
        } else {
            self.expanded = true;
            self.icon = IconRotation::Deg180;
        }
    }
}

/// Flip the panel at `index`. Returns the new expanded state, or `None` when
/// no panel exists at that index.
pub fn toggle_category(panels: &mut [CategoryPanel], index: usize) -> Option<bool> {
    let Some(panel) = panels.get_mut(index) else {
        warn!("toggle_category: no category panel at index {}", index);
        return None;
    };
    panel.toggle();
    Some(panel.is_expanded())
}
