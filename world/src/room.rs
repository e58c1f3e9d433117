//! Room layout: border walls, floor interior and the exit door.

use archer_arena_core::{CellCoord, CellKind, DoorState};
use glam::Vec2;

/// Grid of cells describing the current room.
#[derive(Clone, Debug)]
pub struct Room {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
    door: CellCoord,
    door_state: DoorState,
    floor: Vec<CellCoord>,
}

impl Room {
    /// Generates a rectangular room with walls on the border and a door at top centre.
    #[must_use]
    pub(crate) fn generate(columns: u32, rows: u32) -> Self {
        let columns = columns.max(3);
        let rows = rows.max(3);
        let door = CellCoord::new(columns / 2, rows - 1);
        let mut cells = Vec::with_capacity(columns as usize * rows as usize);
        let mut floor = Vec::new();
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                let border = column == 0 || row == 0 || column == columns - 1 || row == rows - 1;
                let kind = if cell == door {
                    CellKind::Door
                } else if border {
                    CellKind::Wall
                } else {
                    floor.push(cell);
                    CellKind::Floor
                };
                cells.push(kind);
            }
        }

        Self {
            columns,
            rows,
            cells,
            door,
            door_state: DoorState::Closed,
            floor,
        }
    }

    /// Number of columns, walls included.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows, walls included.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Kind of the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellKind> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.cells.get(index).copied()
    }

    /// Interior cells in row-major order; the spawn-candidate pool.
    #[must_use]
    pub fn floor_cells(&self) -> &[CellCoord] {
        &self.floor
    }

    /// Cell holding the exit door.
    #[must_use]
    pub const fn door(&self) -> CellCoord {
        self.door
    }

    /// Current state of the exit door.
    #[must_use]
    pub const fn door_state(&self) -> DoorState {
        self.door_state
    }

    pub(crate) fn set_door_state(&mut self, state: DoorState) {
        self.door_state = state;
    }

    /// Reports whether an actor may stand at the provided point.
    #[must_use]
    pub fn is_walkable(&self, point: Vec2) -> bool {
        match CellCoord::containing(point).and_then(|cell| self.cell(cell)) {
            Some(CellKind::Floor) => true,
            Some(CellKind::Door) => self.door_state != DoorState::Closed,
            Some(CellKind::Wall) | None => false,
        }
    }

    /// Reports whether a projectile at the provided point hit static terrain.
    #[must_use]
    pub fn blocks_projectile(&self, point: Vec2) -> bool {
        !matches!(
            CellCoord::containing(point).and_then(|cell| self.cell(cell)),
            Some(CellKind::Floor)
        )
    }

    /// Clamps a point into the floor area of the room.
    #[must_use]
    pub fn clamp_to_interior(&self, point: Vec2) -> Vec2 {
        let max = Vec2::new((self.columns - 2) as f32, (self.rows - 2) as f32);
        point.clamp(Vec2::ONE, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_is_wall_and_interior_is_floor() {
        let room = Room::generate(20, 20);

        assert_eq!(room.cell(CellCoord::new(0, 5)), Some(CellKind::Wall));
        assert_eq!(room.cell(CellCoord::new(19, 5)), Some(CellKind::Wall));
        assert_eq!(room.cell(CellCoord::new(5, 0)), Some(CellKind::Wall));
        assert_eq!(room.cell(CellCoord::new(5, 5)), Some(CellKind::Floor));
        assert_eq!(room.cell(CellCoord::new(20, 5)), None);
        assert_eq!(room.floor_cells().len(), 18 * 18);
    }

    #[test]
    fn door_sits_at_top_centre() {
        let room = Room::generate(20, 20);

        assert_eq!(room.door(), CellCoord::new(10, 19));
        assert_eq!(room.cell(room.door()), Some(CellKind::Door));
        assert_eq!(room.door_state(), DoorState::Closed);
    }

    #[test]
    fn closed_door_blocks_movement_until_opened() {
        let mut room = Room::generate(9, 9);
        let door_point = room.door().center();

        assert!(!room.is_walkable(door_point));
        room.set_door_state(DoorState::Open);
        assert!(room.is_walkable(door_point));
        assert!(!room.is_walkable(Vec2::new(0.0, 4.0)));
        assert!(room.is_walkable(Vec2::new(4.0, 4.0)));
    }

    #[test]
    fn clamping_keeps_points_on_floor() {
        let room = Room::generate(10, 8);

        assert_eq!(room.clamp_to_interior(Vec2::new(-3.0, 20.0)), Vec2::new(1.0, 6.0));
        assert_eq!(room.clamp_to_interior(Vec2::new(4.5, 3.5)), Vec2::new(4.5, 3.5));
    }
}
