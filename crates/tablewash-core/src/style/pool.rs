//! Style pool for deduplicating styles

use std::collections::HashMap;

use super::Style;

/// Deduplicating style storage
///
/// Cells reference styles by index. Index 0 is always the default style.
#[derive(Debug)]
pub struct StylePool {
    styles: Vec<Style>,
    index: HashMap<Style, u32>,
}

impl Default for StylePool {
    fn default() -> Self {
        let default_style = Style::default();
        let mut index = HashMap::new();
        index.insert(default_style.clone(), 0);
        Self {
            styles: vec![default_style],
            index,
        }
    }
}

impl StylePool {
    /// Create a new pool containing only the default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a style by index
    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Get the index for a style, adding it if not present
    pub fn get_or_insert(&mut self, style: &Style) -> u32 {
        if let Some(&idx) = self.index.get(style) {
            return idx;
        }
        let idx = self.styles.len() as u32;
        self.styles.push(style.clone());
        self.index.insert(style.clone(), idx);
        idx
    }

    /// Number of unique styles in the pool
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// A pool always contains the default style
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over styles in index order
    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_is_index_zero() {
        let pool = StylePool::new();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(0), Some(&Style::default()));
    }

    #[test]
    fn test_get_or_insert_dedupes() {
        let mut pool = StylePool::new();

        let bold = Style::new().bold(true);
        let idx1 = pool.get_or_insert(&bold);
        let idx2 = pool.get_or_insert(&bold);

        assert_eq!(idx1, idx2);
        assert_eq!(pool.len(), 2);

        let italic = Style::new().italic(true);
        let idx3 = pool.get_or_insert(&italic);
        assert_ne!(idx1, idx3);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_inserting_default_returns_zero() {
        let mut pool = StylePool::new();
        assert_eq!(pool.get_or_insert(&Style::default()), 0);
        assert_eq!(pool.len(), 1);
    }
}
