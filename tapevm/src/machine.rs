use crate::config::{CellWidth, RunConfig, TapeMode};

/// Reason a pointer move was rejected by the [`Tape`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveError {
    /// The pointer left the tape. Contains the attempted address
    OutOfBounds(isize),

    /// A growable tape would need more cells than allowed
    TooLarge { required: usize, max_tape_length: usize },

    /// Memory for a growing tape couldn't be allocated
    AllocationFailed { required: usize },
}

/// Memory cells of a running program
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u32>,
    mode: TapeMode,
    width: CellWidth,
    max_length: Option<usize>,
}

impl Tape {
    pub fn new(length: usize, mode: TapeMode, width: CellWidth) -> Tape {
        Tape {
            cells: vec![0; length.max(1)],
            mode,
            width,
            max_length: None,
        }
    }

    pub fn from_config(config: &RunConfig) -> Tape {
        Tape {
            max_length: config.max_tape_length,
            ..Tape::new(config.tape_length, config.tape_mode, config.cell_width)
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn width(&self) -> CellWidth {
        self.width
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> u32 {
        self.cells[index]
    }

    /// Store `value` truncated to the cell width
    pub fn set(&mut self, index: usize, value: u32) {
        self.cells[index] = value & self.width.max_value();
    }

    pub fn adjust(&mut self, index: usize, delta: isize) {
        let cell = &mut self.cells[index];
        *cell = self.width.wrap(*cell, delta);
    }

    /// Move `pointer` by `delta` after checking the whole excursion `low..=high`
    ///
    /// Growable tapes double until the highest address fits. A failed move reports the
    /// farthest address of the excursion in the offending direction.
    pub fn move_pointer(&mut self, pointer: usize, delta: isize, low: isize, high: isize) -> Result<usize, MoveError> {
        let pointer = pointer as isize;

        let lowest = pointer.saturating_add(low);
        if lowest < 0 {
            return Err(MoveError::OutOfBounds(lowest));
        }

        let highest = pointer.checked_add(high).ok_or(MoveError::OutOfBounds(isize::MAX))?;

        if highest as usize >= self.cells.len() {
            match self.mode {
                TapeMode::Fixed => return Err(MoveError::OutOfBounds(highest)),
                TapeMode::Growable => self.grow(highest as usize)?,
            }
        }

        Ok((pointer + delta) as usize)
    }

    fn grow(&mut self, highest: usize) -> Result<(), MoveError> {
        let required = highest.saturating_add(1);

        if let Some(max_tape_length) = self.max_length {
            if required > max_tape_length {
                return Err(MoveError::TooLarge {
                    required,
                    max_tape_length,
                });
            }
        }

        let mut length = self.cells.len();

        while length < required {
            length = length.saturating_mul(2);
        }

        if let Some(max_tape_length) = self.max_length {
            length = length.min(max_tape_length);
        }

        self.cells
            .try_reserve_exact(length - self.cells.len())
            .map_err(|_| MoveError::AllocationFailed { required })?;
        self.cells.resize(length, 0);

        Ok(())
    }
}

/// State of one interpreter run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineState {
    pub tape: Tape,

    /// Index of the current cell
    pub pointer: usize,

    /// Index of the next op to execute
    pub pc: usize,

    /// Number of executed ops, debug hooks excluded
    pub cycles: u64,
}

impl MachineState {
    pub fn new(config: &RunConfig) -> MachineState {
        MachineState::with_tape(Tape::from_config(config))
    }

    pub fn with_tape(tape: Tape) -> MachineState {
        MachineState {
            tape,
            pointer: 0,
            pc: 0,
            cycles: 0,
        }
    }

    /// Value of the current cell
    pub fn cell(&self) -> u32 {
        self.tape.get(self.pointer)
    }
}
