use crate::device::TextureId;

/// The terrain atlas as seen by the renderer: a list of bound texture pages,
/// each holding `elements_per_page` block textures stacked vertically.
///
/// Geometry is batched by page so each page is bound once per pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainAtlas {
    pages: Vec<TextureId>,
    elements_per_page: usize,
}

impl TerrainAtlas {
    pub fn new(pages: Vec<TextureId>, elements_per_page: usize) -> Self {
        Self {
            pages,
            elements_per_page: elements_per_page.max(1),
        }
    }

    /// Atlas with `count` pages whose texture ids are `0..count`.
    pub fn with_page_count(count: u32, elements_per_page: usize) -> Self {
        Self::new((0..count).map(TextureId).collect(), elements_per_page)
    }

    pub fn pages(&self) -> &[TextureId] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn elements_per_page(&self) -> usize {
        self.elements_per_page
    }

    /// Page (batch) holding the given texture slot, clamped to the last page.
    pub fn batch_of(&self, texture_index: usize) -> usize {
        let page = texture_index / self.elements_per_page;
        page.min(self.pages.len().saturating_sub(1))
    }

    /// Vertical texture coordinate range of a texture slot inside its page.
    pub fn v_range(&self, texture_index: usize) -> (f32, f32) {
        let row = texture_index % self.elements_per_page;
        let step = 1.0 / self.elements_per_page as f32;
        (row as f32 * step, (row + 1) as f32 * step)
    }
}

impl Default for TerrainAtlas {
    fn default() -> Self {
        Self::with_page_count(1, 256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_by_page() {
        let atlas = TerrainAtlas::with_page_count(4, 16);
        assert_eq!(atlas.batch_of(0), 0);
        assert_eq!(atlas.batch_of(15), 0);
        assert_eq!(atlas.batch_of(16), 1);
        assert_eq!(atlas.batch_of(60), 3);
        // Slots past the last page clamp instead of indexing out of range.
        assert_eq!(atlas.batch_of(1000), 3);
    }

    #[test]
    fn v_range_within_page() {
        let atlas = TerrainAtlas::with_page_count(2, 4);
        assert_eq!(atlas.v_range(5), (0.25, 0.5));
    }

    #[test]
    fn zero_elements_per_page_clamped() {
        let atlas = TerrainAtlas::new(vec![TextureId(1)], 0);
        assert_eq!(atlas.elements_per_page(), 1);
    }
}
