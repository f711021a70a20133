//! Status badge styling

use serde::Serialize;

/// Visual variant used to render a server status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBadge {
    Default,
    Secondary,
    Destructive,
    Outline,
}

impl StatusBadge {
    /// Map a server status string (case-insensitive) to its badge
    pub fn for_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "running" => StatusBadge::Default,
            "starting" | "stopping" => StatusBadge::Secondary,
            "offline" | "stopped" => StatusBadge::Destructive,
            _ => StatusBadge::Outline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_mapping() {
        assert_eq!(StatusBadge::for_status("Running"), StatusBadge::Default);
        assert_eq!(StatusBadge::for_status("starting"), StatusBadge::Secondary);
        assert_eq!(StatusBadge::for_status("stopping"), StatusBadge::Secondary);
        assert_eq!(StatusBadge::for_status("OFFLINE"), StatusBadge::Destructive);
        assert_eq!(StatusBadge::for_status("stopped"), StatusBadge::Destructive);
        assert_eq!(StatusBadge::for_status("installing"), StatusBadge::Outline);
        assert_eq!(StatusBadge::for_status(""), StatusBadge::Outline);
    }
}
