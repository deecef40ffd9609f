use tracing::debug;

use crate::backends::asm::AsmStyle;
use crate::backends::c::CStyle;
use crate::backends::emitter::emit;
use crate::backends::python::PythonStyle;
use crate::backends::rust::RustStyle;
use crate::config::CompileConfig;
use crate::errors::CompilerError;
use crate::folding::fold;
use crate::ir::ops::Instructions;

pub mod asm;
pub mod c;
pub mod emitter;
pub mod interpreter;
pub mod python;
pub mod rust;

/// Target language of [`compile`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    C,
    Rust,
    Python,
    Asm,
}

impl Backend {
    pub const ALL: [Backend; 4] = [Backend::C, Backend::Rust, Backend::Python, Backend::Asm];

    pub fn name(self) -> &'static str {
        match self {
            Backend::C => "c",
            Backend::Rust => "rust",
            Backend::Python => "python",
            Backend::Asm => "asm",
        }
    }

    pub fn from_name(name: &str) -> Option<Backend> {
        Backend::ALL.into_iter().find(|backend| backend.name() == name)
    }

    /// Deepest loop nesting the target accepts when none is configured
    pub fn default_max_nesting(self) -> Option<usize> {
        match self {
            Backend::Python => Some(python::MAX_NESTING),
            _ => None,
        }
    }
}

/// Compile program into source code of `backend`
///
/// The program is folded first. Loop targets only need to be consistent with the op list.
pub fn compile(program: &Instructions, backend: Backend, config: &CompileConfig) -> Result<String, CompilerError> {
    let mut program = program.clone();
    fold(&mut program);

    let max_nesting = config.max_nesting.or(backend.default_max_nesting());

    debug!(backend = backend.name(), ops = program.len(), ?max_nesting, "compiling");

    match backend {
        Backend::C => emit(&CStyle, &program, config, max_nesting),
        Backend::Rust => emit(&RustStyle, &program, config, max_nesting),
        Backend::Python => emit(&PythonStyle, &program, config, max_nesting),
        Backend::Asm => emit(&AsmStyle::new(config.cell_width), &program, config, max_nesting),
    }
}
