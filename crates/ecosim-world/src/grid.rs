//! Bounded 2D grid of cells.
//!
//! Cells only hold agent ids (plus the species, cached so consume-rule
//! filtering and the producer check need no population lookup). The agents
//! themselves live in the population owned by [`crate::Life`].

use ecosim_core::{AgentId, Direction, Error, Point2D, Result, Species};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An agent standing on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupant {
    pub id: AgentId,
    pub species: Species,
}

/// A grid location and the agents currently on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    position: Point2D,
    occupants: Vec<Occupant>,
}

impl Cell {
    pub fn new(position: Point2D) -> Self {
        Self {
            position,
            occupants: Vec::new(),
        }
    }

    pub fn position(&self) -> Point2D {
        self.position
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.occupants.iter().map(|occupant| occupant.id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.occupants.iter().any(|occupant| occupant.id == id)
    }

    /// Add an occupant. Returns false if the agent was already here.
    pub fn add(&mut self, occupant: Occupant) -> bool {
        if self.contains(occupant.id) {
            return false;
        }
        self.occupants.push(occupant);
        true
    }

    pub fn remove(&mut self, id: AgentId) -> Option<Occupant> {
        let index = self.occupants.iter().position(|occupant| occupant.id == id)?;
        Some(self.occupants.remove(index))
    }

    pub fn contains_producer(&self) -> bool {
        self.occupants
            .iter()
            .any(|occupant| occupant.species == Species::Producer)
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }
}

/// A fixed-size rectangular grid without wrap-around
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Dimensions must fit in `i32` and the cell count must not overflow;
    /// [`ecosim_core::LifeConfig::validate`] bounds both.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for x in 0..rows {
            for y in 0..cols {
                cells.push(Cell::new(Point2D::new(x as i32, y as i32)));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, point: Point2D) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as usize) < self.rows
            && (point.y as usize) < self.cols
    }

    pub fn get(&self, point: Point2D) -> Result<&Cell> {
        let index = self.point_to_index(point)?;
        Ok(&self.cells[index])
    }

    pub fn get_mut(&mut self, point: Point2D) -> Result<&mut Cell> {
        let index = self.point_to_index(point)?;
        Ok(&mut self.cells[index])
    }

    /// The up to eight in-bounds Moore neighbors of `point`, in a fixed order.
    pub fn neighbors(&self, point: Point2D) -> Result<Vec<Point2D>> {
        self.point_to_index(point)?;
        Ok(Direction::all()
            .into_iter()
            .map(|direction| point.step(direction))
            .filter(|neighbor| self.contains(*neighbor))
            .collect())
    }

    /// A uniformly chosen in-bounds neighbor of `point`.
    ///
    /// Fails with [`Error::NoAdjacentCell`] when the grid has a single cell.
    pub fn random_adjacent_point<R: Rng>(
        &self,
        point: Point2D,
        rng: &mut R,
    ) -> Result<Point2D> {
        self.neighbors(point)?
            .choose(rng)
            .copied()
            .ok_or(Error::NoAdjacentCell(point))
    }

    /// A uniformly chosen cell position.
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Result<Point2D> {
        if self.is_empty() {
            return Err(Error::InvalidState(format!(
                "no cells to choose from on a {}x{} grid",
                self.rows, self.cols
            )));
        }
        Ok(self.index_to_point(rng.gen_range(0..self.cells.len())))
    }

    /// Put an occupant on the cell at `point`.
    pub fn place(&mut self, point: Point2D, occupant: Occupant) -> Result<()> {
        if !self.get_mut(point)?.add(occupant) {
            return Err(Error::InvalidState(format!(
                "agent {} is already on cell {}",
                occupant.id, point
            )));
        }
        Ok(())
    }

    pub fn remove(&mut self, point: Point2D, id: AgentId) -> Result<Option<Occupant>> {
        Ok(self.get_mut(point)?.remove(id))
    }

    /// Move an agent between cells. Both cells are checked before either is
    /// touched, so a failed move leaves the grid unchanged.
    pub fn move_occupant(&mut self, id: AgentId, from: Point2D, to: Point2D) -> Result<()> {
        let from_index = self.point_to_index(from)?;
        let to_index = self.point_to_index(to)?;
        if !self.cells[from_index].contains(id) {
            return Err(Error::AgentNotFound(id));
        }
        if from_index == to_index {
            return Ok(());
        }

        if let Some(occupant) = self.cells[from_index].remove(id) {
            self.cells[to_index].add(occupant);
        }
        Ok(())
    }

    /// Iterator over all cells, row by row
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// Iterator over all positions
    pub fn positions(&self) -> impl Iterator<Item = Point2D> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_point(i))
    }

    fn point_to_index(&self, point: Point2D) -> Result<usize> {
        if !self.contains(point) {
            return Err(Error::InvalidPosition {
                point,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(point.x as usize * self.cols + point.y as usize)
    }

    fn index_to_point(&self, index: usize) -> Point2D {
        Point2D::new((index / self.cols) as i32, (index % self.cols) as i32)
    }
}
