use super::error::{GridError, LevelDataErrorCode};

/// Cell code meaning "nothing here" in every layer.
pub const EMPTY_CODE: i32 = -1;

/// Rectangular grid of integer tile codes for one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    rows: Vec<Vec<i32>>,
    width: usize,
}

impl TileGrid {
    /// Parses comma-delimited rows. Trailing blank lines are ignored; any
    /// other row must have as many cells as the first.
    pub fn parse(raw: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = raw
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let row_count = lines
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(0, |last| last + 1);
        if row_count == 0 {
            return Err(GridError {
                code: LevelDataErrorCode::EmptyGrid,
                message: "grid has no rows".to_string(),
                location: None,
            });
        }

        let mut rows = Vec::with_capacity(row_count);
        let mut width = 0;
        for (row_index, line) in lines[..row_count].iter().enumerate() {
            let mut row = Vec::new();
            for (column_index, cell) in line.split(',').enumerate() {
                let cell = cell.trim();
                let code = cell.parse::<i32>().map_err(|_| {
                    GridError::at(
                        LevelDataErrorCode::NonNumericCode,
                        format!("cell '{cell}' is not an integer tile code"),
                        row_index + 1,
                        column_index + 1,
                    )
                })?;
                row.push(code);
            }
            if row_index == 0 {
                width = row.len();
            } else if row.len() != width {
                return Err(GridError::at(
                    LevelDataErrorCode::RaggedRow,
                    format!("row has {} cells, expected {width}", row.len()),
                    row_index + 1,
                    row.len().min(width) + 1,
                ));
            }
            rows.push(row);
        }

        Ok(Self { rows, width })
    }

    /// Builds a grid from already-decoded rows, padding short rows with
    /// empty cells.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, EMPTY_CODE);
                row
            })
            .collect();
        Self { rows, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<i32> {
        self.rows.get(row).and_then(|cells| cells.get(column)).copied()
    }

    /// Non-empty cells as `(row, column, code)`, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, code)| **code != EMPTY_CODE)
                .map(move |(column, code)| (row, column, *code))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_skips_empty_cells() {
        let grid = TileGrid::parse("-1,0,-1\n3, -1 ,12\n").expect("grid");
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(1, 2), Some(12));
        let occupied: Vec<_> = grid.occupied().collect();
        assert_eq!(occupied, vec![(0, 1, 0), (1, 0, 3), (1, 2, 12)]);
    }

    #[test]
    fn accepts_crlf_and_trailing_blank_lines() {
        let grid = TileGrid::parse("1,2\r\n3,4\r\n\r\n\n").expect("grid");
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(1, 1), Some(4));
    }

    #[test]
    fn empty_input_is_rejected() {
        let error = TileGrid::parse("\n \n").expect_err("empty");
        assert_eq!(error.code, LevelDataErrorCode::EmptyGrid);
    }

    #[test]
    fn ragged_row_reports_its_position() {
        let error = TileGrid::parse("1,2,3\n4,5\n").expect_err("ragged");
        assert_eq!(error.code, LevelDataErrorCode::RaggedRow);
        let location = error.location.expect("location");
        assert_eq!(location.row, 2);
        assert_eq!(location.column, 3);
    }

    #[test]
    fn non_numeric_cell_reports_its_position() {
        let error = TileGrid::parse("1,2\n3,grass\n").expect_err("non numeric");
        assert_eq!(error.code, LevelDataErrorCode::NonNumericCode);
        let location = error.location.expect("location");
        assert_eq!((location.row, location.column), (2, 2));
        assert!(error.message.contains("grass"));
    }

    #[test]
    fn from_rows_pads_to_widest_row() {
        let grid = TileGrid::from_rows(vec![vec![1], vec![1, 2, 3]]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.get(0, 2), Some(EMPTY_CODE));
    }
}
