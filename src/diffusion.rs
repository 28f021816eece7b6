use crate::field::{FieldView, TrailField};
use rayon::prelude::*;
use serde::Deserialize;

/// Which cells contribute to a cell's blurred value.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Neighborhood {
    /// The cell and its 4 cardinal neighbours.
    VonNeumann,
    /// The cell and all 8 surrounding neighbours.
    Moore,
}

const VON_NEUMANN_OFFSETS: [(i64, i64); 5] = [(0, 0), (0, 1), (0, -1), (1, 0), (-1, 0)];

#[rustfmt::skip]
const MOORE_OFFSETS: [(i64, i64); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0), (0,  0), (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

impl Neighborhood {
    pub fn offsets(&self) -> &'static [(i64, i64)] {
        match self {
            Neighborhood::VonNeumann => &VON_NEUMANN_OFFSETS,
            Neighborhood::Moore => &MOORE_OFFSETS,
        }
    }
}

impl Default for Neighborhood {
    fn default() -> Self {
        Neighborhood::VonNeumann
    }
}

/// Blur and fade the whole field: every cell of the write buffer becomes the
/// mean of its neighbourhood in the read buffer times `decay_factor`. Cells
/// beyond the edge read as the nearest edge cell. Rows are processed in
/// parallel; nothing reads the buffer being written.
pub fn diffuse_and_decay(field: &mut TrailField, neighborhood: Neighborhood, decay_factor: f32) {
    let width = field.width();
    let (read, write) = field.read_and_write();

    write
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = blurred_value(&read, col as i64, row as i64, neighborhood) * decay_factor;
            }
        });
}

fn blurred_value(read: &FieldView<'_>, col: i64, row: i64, neighborhood: Neighborhood) -> f32 {
    let offsets = neighborhood.offsets();
    let sum: f32 = offsets
        .iter()
        .map(|(dx, dy)| read.sample(col + dx, row + dy))
        .sum();

    sum / offsets.len() as f32
}
