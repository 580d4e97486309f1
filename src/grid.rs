use crate::error::{Result, StudioError};

/// Row-major 2D storage over a flat `Vec`.
///
/// Coordinates are signed so that pointer positions that wandered off the
/// canvas can be passed straight in; they simply miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// A `width x height` grid filled with `T::default()`.
    pub fn new(width: u32, height: u32) -> Self {
        Grid {
            width,
            height,
            cells: vec![T::default(); width as usize * height as usize],
        }
    }
}

impl<T: Copy> Grid<T> {
    /// Wrap existing cells; their count must be exactly `width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<T>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(StudioError::Validation(format!(
                "grid data has {} cells, expected {width}x{height} = {expected}",
                cells.len()
            )));
        }
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flat offset of `(x, y)`, or `None` when it lies outside the grid.
    #[inline]
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<T> {
        self.index_of(x, y).map(|i| self.cells[i])
    }

    /// Store `value` at `(x, y)` and hand back what was there before.
    /// Out-of-bounds writes change nothing and return `None`.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> Option<T> {
        let i = self.index_of(x, y)?;
        Some(std::mem::replace(&mut self.cells[i], value))
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }

    /// `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, T)> + '_ {
        let w = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (i as u32 % w, i as u32 / w, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_uses_row_major_offsets() {
        let mut g: Grid<u32> = Grid::new(3, 2);
        assert_eq!(g.set(2, 1, 7), Some(0));
        assert_eq!(g.cells(), &[0, 0, 0, 0, 0, 7]);
        assert_eq!(g.get(2, 1), Some(7));
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut g: Grid<u32> = Grid::new(2, 2);
        for (x, y) in [(-1, 0), (0, -1), (2, 0), (0, 2), (i32::MIN, i32::MAX)] {
            assert_eq!(g.set(x, y, 9), None);
            assert_eq!(g.get(x, y), None);
        }
        assert!(g.cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn from_cells_checks_length() {
        assert!(Grid::from_cells(2, 2, vec![1u32, 2, 3]).is_err());
        let g = Grid::from_cells(2, 2, vec![1u32, 2, 3, 4]).unwrap();
        let seen: Vec<_> = g.iter().collect();
        assert_eq!(seen[3], (1, 1, 4));
    }
}
