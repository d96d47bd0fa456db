//! Multi-scale embedding matrix.

/// One row per node (ordered by id), per-scale vectors concatenated in scale order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmbeddingTable {
    dimensions: usize,
    scales: usize,
    rows: Vec<Vec<f32>>,
}

impl EmbeddingTable {
    pub(crate) fn new(node_count: usize, dimensions: usize) -> Self {
        Self { dimensions, scales: 0, rows: vec![Vec::new(); node_count] }
    }

    /// Append one scale; `vectors[node]` must have `dimensions` entries.
    pub(crate) fn push_scale(&mut self, vectors: Vec<Vec<f32>>) {
        debug_assert_eq!(vectors.len(), self.rows.len());
        for (row, v) in self.rows.iter_mut().zip(vectors) {
            debug_assert_eq!(v.len(), self.dimensions);
            row.extend(v);
        }
        self.scales += 1;
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn row(&self, node: usize) -> Option<&[f32]> {
        self.rows.get(node).map(Vec::as_slice)
    }

    pub fn node_count(&self) -> usize {
        self.rows.len()
    }

    /// Dimensions contributed by each scale.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn scales(&self) -> usize {
        self.scales
    }

    pub fn column_count(&self) -> usize {
        self.dimensions * self.scales
    }

    /// `x_0 .. x_{D-1}`.
    pub fn column_names(&self) -> Vec<String> {
        (0..self.column_count()).map(|i| format!("x_{i}")).collect()
    }

    /// The block of `node`'s row produced at `scale` (1-based).
    pub fn scale_slice(&self, node: usize, scale: usize) -> Option<&[f32]> {
        if scale == 0 || scale > self.scales {
            return None;
        }
        let start = (scale - 1) * self.dimensions;
        self.row(node).map(|r| &r[start..start + self.dimensions])
    }

    pub fn into_rows(self) -> Vec<Vec<f32>> {
        self.rows
    }
}
