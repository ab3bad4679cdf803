use crate::error::AdjacencyError;
use crate::index::IdIndex;
use crate::neighbors::NeighborSet;
use itertools::Itertools;
use serde::Serialize;
use std::io::Write;

/// N×N binary adjacency matrix, row-major.
///
/// Accessors take the 1-based indices handed out by [`IdIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacencyMatrix {
    size: usize,
    cells: Vec<u8>,
}

/// Undirected edges as parallel 1-based index vectors with `node1 < node2`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EdgeList {
    pub node1: Vec<usize>,
    pub node2: Vec<usize>,
}

impl AdjacencyMatrix {
    #[tracing::instrument(name = "encode_matrix", skip_all, fields(regions = index.len()))]
    pub fn encode(neighbors: &NeighborSet, index: &IdIndex) -> Result<Self, AdjacencyError> {
        let size = index.len();
        let mut cells = vec![0u8; size * size];

        for (id, set) in neighbors.iter() {
            let i = index
                .index_of(id.as_str())
                .ok_or_else(|| AdjacencyError::unknown(id.as_str(), "neighbour set"))?;

            for other in set {
                let j = index
                    .index_of(other.as_str())
                    .ok_or_else(|| AdjacencyError::unknown(other.as_str(), "neighbour set"))?;
                if i != j {
                    cells[(i - 1) * size + (j - 1)] = 1;
                    cells[(j - 1) * size + (i - 1)] = 1;
                }
            }
        }

        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_adjacent(&self, i: usize, j: usize) -> bool {
        self.offset(i, j).is_some_and(|o| self.cells[o] == 1)
    }

    pub fn row(&self, i: usize) -> Option<&[u8]> {
        if i == 0 || i > self.size {
            return None;
        }
        let start = (i - 1) * self.size;
        Some(&self.cells[start..start + self.size])
    }

    pub fn degree(&self, i: usize) -> usize {
        self.row(i)
            .map(|row| row.iter().filter(|c| **c == 1).count())
            .unwrap_or(0)
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| {
            (i + 1..self.size)
                .all(|j| self.cells[i * self.size + j] == self.cells[j * self.size + i])
        })
    }

    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.size).all(|i| self.cells[i * self.size + i] == 0)
    }

    /// 1-based indices of all-zero rows.
    pub fn isolated_rows(&self) -> Vec<usize> {
        (1..=self.size).filter(|i| self.degree(*i) == 0).collect()
    }

    /// Row-major cell bytes. Identical input always produces identical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.clone()
    }

    pub fn edge_list(&self) -> EdgeList {
        let mut edges = EdgeList::default();
        for i in 1..=self.size {
            for j in i + 1..=self.size {
                if self.is_adjacent(i, j) {
                    edges.node1.push(i);
                    edges.node2.push(j);
                }
            }
        }
        edges
    }

    /// INLA graph file: the region count, then one line per region with
    /// its index, degree and neighbour indices.
    pub fn to_inla_graph(&self) -> String {
        let mut out = format!("{}\n", self.size);
        for i in 1..=self.size {
            let neighbors: Vec<usize> = (1..=self.size)
                .filter(|j| self.is_adjacent(i, *j))
                .collect();
            let line = std::iter::once(i)
                .chain(std::iter::once(neighbors.len()))
                .chain(neighbors)
                .join(" ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Writes the matrix as CSV with a header of identifiers and each row
    /// prefixed by its identifier.
    pub fn write_csv<W: Write>(&self, index: &IdIndex, writer: W) -> Result<(), AdjacencyError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec![String::new()];
        header.extend(index.ids().iter().map(|id| id.to_string()));
        csv_writer.write_record(&header)?;

        for (i, id) in index.iter() {
            let mut record = vec![id.to_string()];
            if let Some(row) = self.row(i) {
                record.extend(row.iter().map(|c| c.to_string()));
            }
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    fn offset(&self, i: usize, j: usize) -> Option<usize> {
        if i == 0 || j == 0 || i > self.size || j > self.size {
            return None;
        }
        Some((i - 1) * self.size + (j - 1))
    }
}
