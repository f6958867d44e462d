// Color assignment - Stable server to palette mapping
use crate::domain::server::canonical_server_name;
use std::collections::HashMap;

/// Append-only mapping from canonical server name to a palette slot.
///
/// A server keeps the ordinal it was first registered with, so colors do not
/// shift when a poll returns servers in a different order.
#[derive(Debug, Clone)]
pub struct ColorAssignment {
    palette: Vec<String>,
    ordinals: HashMap<String, usize>,
}

impl ColorAssignment {
    pub fn new(palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() {
            vec!["hsl(0, 70%, 50%)".to_string()]
        } else {
            palette
        };
        Self {
            palette,
            ordinals: HashMap::new(),
        }
    }

    /// Register servers in order; names already known keep their slot.
    pub fn register<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let canonical = canonical_server_name(name.as_ref());
            let next = self.ordinals.len();
            self.ordinals.entry(canonical).or_insert(next);
        }
    }

    /// Color for a server, falling back to `fallback_index` when unregistered.
    pub fn color_for(&self, name: &str, fallback_index: usize) -> String {
        let ordinal = self
            .ordinals
            .get(&canonical_server_name(name))
            .copied()
            .unwrap_or(fallback_index);
        self.color_at(ordinal)
    }

    pub fn color_at(&self, ordinal: usize) -> String {
        self.palette[ordinal % self.palette.len()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Vec<String> {
        vec!["red".to_string(), "green".to_string(), "blue".to_string()]
    }

    #[test]
    fn test_colors_follow_first_registration() {
        let mut colors = ColorAssignment::new(palette());
        colors.register(["A", "B"]);
        colors.register(["B", "C", "A"]);

        assert_eq!(colors.color_for("A", 9), "red");
        assert_eq!(colors.color_for("B", 9), "green");
        assert_eq!(colors.color_for("C", 9), "blue");
        assert_eq!(colors.color_for("D", 9), "red");
    }

    #[test]
    fn test_palette_cycles() {
        let mut colors = ColorAssignment::new(palette());
        colors.register(["A", "B", "C", "D"]);
        assert_eq!(colors.color_for("D", 0), "red");
    }

    #[test]
    fn test_lookup_is_by_canonical_name() {
        let mut colors = ColorAssignment::new(palette());
        colors.register(["Speedtest by Ookla - ACME - 1234", "Other"]);
        assert_eq!(colors.color_for("ACME - 7", 5), "red");
        assert_eq!(colors.color_for("ACME", 5), "red");
        assert_eq!(colors.color_for("Other - 3", 5), "green");
    }

    #[test]
    fn test_unregistered_uses_fallback() {
        let colors = ColorAssignment::new(palette());
        assert_eq!(colors.color_for("X", 1), "green");
    }

    #[test]
    fn test_empty_palette_still_yields_a_color() {
        let colors = ColorAssignment::new(Vec::new());
        assert_eq!(colors.color_at(4), "hsl(0, 70%, 50%)");
    }
}
