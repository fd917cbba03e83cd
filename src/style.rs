//! Category colouring for drawn nodes.
//!
//! Purely cosmetic: the editor works the same with [`NoColors`].

use std::collections::HashMap;

use crate::ontology::names;

/// Maps a node's categories to a `(label, colour)` pair.
pub trait CategoryColorMap: Send + Sync {
    fn color(&self, categories: &[String]) -> (Option<String>, String);
}

/// Colour map that colours nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoColors;

impl CategoryColorMap for NoColors {
    fn color(&self, _categories: &[String]) -> (Option<String>, String) {
        (None, String::new())
    }
}

/// Fixed category → colour table. The first category with an entry wins.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: HashMap<String, String>,
    fallback: String,
}

impl Palette {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            colors: HashMap::new(),
            fallback: fallback.into(),
        }
    }

    pub fn with(mut self, category: impl Into<String>, color: impl Into<String>) -> Self {
        self.colors.insert(category.into(), color.into());
        self
    }
}

impl CategoryColorMap for Palette {
    fn color(&self, categories: &[String]) -> (Option<String>, String) {
        categories
            .iter()
            .find_map(|c| {
                self.colors
                    .get(c)
                    .map(|color| (Some(names::display_category(c)), color.clone()))
            })
            .unwrap_or_else(|| (None, self.fallback.clone()))
    }
}
