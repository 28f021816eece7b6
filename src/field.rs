use crate::{Point2, Swapper};
use log::debug;

/// A double-buffered grid of trail intensities, stored row-major.
///
/// One buffer is in the "read" role and the other in the "write" role at any
/// time. A frame's maintenance pass reads one and rewrites the other, agents
/// deposit into the freshly written buffer, and then the roles are swapped.
pub struct TrailField {
    buffers: Swapper<Vec<f32>>,
    width: usize,
    height: usize,
}

/// A read-only borrow of one buffer along with its dimensions.
#[derive(Clone, Copy)]
pub struct FieldView<'a> {
    values: &'a [f32],
    width: usize,
    height: usize,
}

impl TrailField {
    /// Both buffers start zeroed. Callers are expected to have rejected empty
    /// dimensions already.
    pub fn new(width: usize, height: usize) -> Self {
        let length = width * height;

        debug!(
            "Created new trail field with {} rows and {} columns",
            height, width
        );

        Self {
            buffers: Swapper::new(vec![0.0; length], vec![0.0; length]),
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read(&self) -> FieldView<'_> {
        FieldView::new(self.buffers.read(), self.width, self.height)
    }

    pub fn write(&self) -> FieldView<'_> {
        FieldView::new(self.buffers.write(), self.width, self.height)
    }

    pub(crate) fn read_and_write(&mut self) -> (FieldView<'_>, &mut [f32]) {
        let (width, height) = (self.width, self.height);
        let (read, write) = self.buffers.read_and_write();
        (FieldView::new(read, width, height), write.as_mut_slice())
    }

    /// Set every listed cell of the write buffer to `value`. Writes are not
    /// accumulated, so the same cell listed twice ends up with the same value.
    pub(crate) fn deposit(&mut self, cells: impl IntoIterator<Item = usize>, value: f32) {
        let write = self.buffers.write_mut();
        for index in cells {
            match write.get_mut(index) {
                Some(cell) => *cell = value,
                None => debug!("Tried to deposit at non-existent cell {}", index),
            }
        }
    }

    pub fn swap(&mut self) {
        self.buffers.swap()
    }

    /// Overwrite a single cell of the read buffer, clamped to the grid.
    pub fn paint(&mut self, x: i64, y: i64, value: f32) {
        let index = index_of(clamp_cell(x, y, self.width, self.height), self.width);
        self.buffers.read_mut()[index] = value;
    }

    /// The clamped cell index holding the field-local position `at`.
    pub fn cell_of(&self, at: Point2) -> usize {
        self.read().cell_of(at)
    }
}

impl<'a> FieldView<'a> {
    pub fn new(values: &'a [f32], width: usize, height: usize) -> Self {
        debug_assert_eq!(values.len(), width * height);
        Self {
            values,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &'a [f32] {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a f32> {
        self.values.iter()
    }

    /// Read a cell at integer coordinates clamped to the grid; never panics.
    pub fn sample(&self, x: i64, y: i64) -> f32 {
        self.values[index_of(clamp_cell(x, y, self.width, self.height), self.width)]
    }

    /// Read a cell only if it lies within the grid.
    pub fn get(&self, x: i64, y: i64) -> Option<f32> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            None
        } else {
            Some(self.values[index_of((x as usize, y as usize), self.width)])
        }
    }

    /// The cell coordinates of a field-local position (origin at the center).
    /// May lie outside the grid.
    pub fn cell_coords(&self, at: Point2) -> (i64, i64) {
        let x = (at.x + self.width as f32 / 2.0).floor();
        let y = (at.y + self.height as f32 / 2.0).floor();
        (saturating_cell(x), saturating_cell(y))
    }

    pub fn cell_of(&self, at: Point2) -> usize {
        let (x, y) = self.cell_coords(at);
        index_of(clamp_cell(x, y, self.width, self.height), self.width)
    }

    pub fn max(&self) -> f32 {
        self.values.iter().cloned().fold(0.0, f32::max)
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().map(|v| *v as f64).sum()
    }
}

pub(crate) fn clamp_cell(x: i64, y: i64, width: usize, height: usize) -> (usize, usize) {
    (
        x.clamp(0, width as i64 - 1) as usize,
        y.clamp(0, height as i64 - 1) as usize,
    )
}

pub(crate) fn index_of((x, y): (usize, usize), width: usize) -> usize {
    y * width + x
}

// NaN maps to 0; infinities saturate.
fn saturating_cell(v: f32) -> i64 {
    v as i64
}
