use std::str::FromStr;

/// Default number of cells on the tape
pub const DEFAULT_TAPE_LENGTH: usize = 65535;

/// Default number of cells printed by the `#` debug hook
pub const DEFAULT_DEBUG_WINDOW: usize = 16;

/// Set of characters recognized in addition to the eight primitive instructions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dialect {
    /// Accept numeric quantifiers and the `_` zero operator
    pub extended: bool,

    /// Accept the `#`, `^` and `@` debug hooks
    pub debug_hooks: bool,

    /// Treat `!` as an instruction that ends the program when executed
    pub halt_marker: bool,

    /// Cut the source at the first `!` and keep the rest as input data
    ///
    /// The text after the marker is neither validated nor executed.
    pub data_after_halt: bool,
}

impl Dialect {
    /// Plain brainfuck with the halt marker enabled
    pub fn standard() -> Dialect {
        Dialect {
            extended: false,
            debug_hooks: false,
            halt_marker: true,
            data_after_halt: false,
        }
    }

    /// Brainfuck plus quantifiers and the zero operator
    pub fn extended() -> Dialect {
        Dialect {
            extended: true,
            ..Self::standard()
        }
    }

    /// Check if `ch` is part of the program in this dialect
    pub fn accepts(&self, ch: char) -> bool {
        match ch {
            '>' | '<' | '+' | '-' | '.' | ',' | '[' | ']' => true,
            '_' | '0'..='9' => self.extended,
            '#' | '^' | '@' => self.debug_hooks,
            '!' => self.halt_marker,
            _ => false,
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::standard()
    }
}

/// Behavior of `,` when the input stream is exhausted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EofPolicy {
    /// Leave the current cell as it is
    #[default]
    Unchanged,

    /// Write the given value into the current cell
    Overwrite(u8),
}

impl FromStr for EofPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "unchanged" => Ok(EofPolicy::Unchanged),
            other => other
                .parse::<u8>()
                .map(EofPolicy::Overwrite)
                .map_err(|_| format!("expected `unchanged` or a value in 0..=255, got `{}`", other)),
        }
    }
}

/// Width of a single tape cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellWidth {
    #[default]
    U8,
    U16,
    U32,
}

impl CellWidth {
    pub fn from_bits(bits: u32) -> Option<CellWidth> {
        match bits {
            8 => Some(CellWidth::U8),
            16 => Some(CellWidth::U16),
            32 => Some(CellWidth::U32),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            CellWidth::U8 => 8,
            CellWidth::U16 => 16,
            CellWidth::U32 => 32,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Largest value a cell can hold
    pub fn max_value(self) -> u32 {
        match self {
            CellWidth::U8 => u8::MAX as u32,
            CellWidth::U16 => u16::MAX as u32,
            CellWidth::U32 => u32::MAX,
        }
    }

    fn modulus(self) -> i64 {
        1i64 << self.bits()
    }

    /// Add `delta` to `value` modulo 2^bits
    pub fn wrap(self, value: u32, delta: isize) -> u32 {
        let modulus = self.modulus();
        let delta = (delta as i64).rem_euclid(modulus);

        ((value as i64 + delta) % modulus) as u32
    }

    /// Reduce `delta` into the range (-2^(bits-1), 2^(bits-1)]
    ///
    /// Emitters use this to print `-1` instead of `255` for an 8 bit cell.
    pub fn signed_residue(self, delta: isize) -> i64 {
        let modulus = self.modulus();
        let residue = (delta as i64).rem_euclid(modulus);

        if residue > modulus / 2 {
            residue - modulus
        } else {
            residue
        }
    }
}

/// Growth behavior of the tape when the pointer moves past its right end
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TapeMode {
    /// Moving outside the tape is a fatal error
    #[default]
    Fixed,

    /// Moving right past the end doubles the tape
    Growable,
}

/// Configuration of a single interpreter run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Initial number of cells
    pub tape_length: usize,

    pub tape_mode: TapeMode,

    /// Upper bound for a growable tape. `None` lets the tape grow without limit
    pub max_tape_length: Option<usize>,

    pub cell_width: CellWidth,

    pub eof: EofPolicy,

    /// Number of cells printed by the `#` debug hook
    pub debug_window: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            tape_length: DEFAULT_TAPE_LENGTH,
            tape_mode: TapeMode::Fixed,
            max_tape_length: None,
            cell_width: CellWidth::U8,
            eof: EofPolicy::Unchanged,
            debug_window: DEFAULT_DEBUG_WINDOW,
        }
    }
}

/// Configuration of a compilation into one of the [backends](crate::backends)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileConfig {
    /// Number of cells declared by the generated program
    pub tape_length: usize,

    pub cell_width: CellWidth,

    pub eof: EofPolicy,

    /// Maximum depth of nested loops
    ///
    /// `None` uses the default of the selected backend.
    pub max_nesting: Option<usize>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            tape_length: DEFAULT_TAPE_LENGTH,
            cell_width: CellWidth::U8,
            eof: EofPolicy::Unchanged,
            max_nesting: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_u8() {
        assert_eq!(CellWidth::U8.wrap(255, 1), 0);
        assert_eq!(CellWidth::U8.wrap(0, -1), 255);
        assert_eq!(CellWidth::U8.wrap(10, 300), 54);
        assert_eq!(CellWidth::U8.wrap(10, -266), 0);
    }

    #[test]
    fn test_wrap_wide() {
        assert_eq!(CellWidth::U16.wrap(65535, 1), 0);
        assert_eq!(CellWidth::U16.wrap(0, -1), 65535);
        assert_eq!(CellWidth::U32.wrap(u32::MAX, 1), 0);
        assert_eq!(CellWidth::U32.wrap(0, -1), u32::MAX);
    }

    #[test]
    fn test_signed_residue() {
        assert_eq!(CellWidth::U8.signed_residue(255), -1);
        assert_eq!(CellWidth::U8.signed_residue(-1), -1);
        assert_eq!(CellWidth::U8.signed_residue(128), 128);
        assert_eq!(CellWidth::U8.signed_residue(256), 0);
        assert_eq!(CellWidth::U16.signed_residue(255), 255);
    }

    #[test]
    fn test_parse_eof_policy() {
        assert_eq!("unchanged".parse::<EofPolicy>(), Ok(EofPolicy::Unchanged));
        assert_eq!("0".parse::<EofPolicy>(), Ok(EofPolicy::Overwrite(0)));
        assert_eq!("255".parse::<EofPolicy>(), Ok(EofPolicy::Overwrite(255)));
        assert!("256".parse::<EofPolicy>().is_err());
        assert!("eof".parse::<EofPolicy>().is_err());
    }

    #[test]
    fn test_dialect_alphabet() {
        let standard = Dialect::standard();
        assert!(standard.accepts('['));
        assert!(!standard.accepts('5'));
        assert!(!standard.accepts('_'));
        assert!(!standard.accepts('#'));

        let extended = Dialect::extended();
        assert!(extended.accepts('5'));
        assert!(extended.accepts('_'));
        assert!(!extended.accepts('@'));
    }

    #[test]
    fn test_dialect_halt_marker() {
        assert!(Dialect::standard().accepts('!'));

        let no_halt = Dialect {
            halt_marker: false,
            ..Dialect::standard()
        };
        assert!(!no_halt.accepts('!'));
    }
}
