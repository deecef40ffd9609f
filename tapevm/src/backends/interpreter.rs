use std::io::{ErrorKind, Read, Write};
use std::ops::Range;

use tracing::debug;

use crate::config::{EofPolicy, RunConfig};
use crate::errors::RuntimeError;
use crate::ir::ops::{Instructions, Op, OpType};
use crate::limiters::{Limiter, LimiterResult, Unlimited};
use crate::machine::{MachineState, MoveError};

/// Interpreter to execute a program
pub struct Interpreter<'d, R: Read, W: Write> {
    config: RunConfig,
    input: R,
    output: W,
    debug_output: Option<Box<dyn Write + 'd>>,
    limiter: Box<dyn Limiter + 'd>,
}

impl<'d, R: Read, W: Write> Interpreter<'d, R, W> {
    /// Create a default interpreter
    pub fn new(input: R, output: W) -> Interpreter<'d, R, W> {
        Self::with_config(input, output, RunConfig::default())
    }

    pub fn with_config(input: R, output: W, config: RunConfig) -> Interpreter<'d, R, W> {
        Interpreter {
            config,
            input,
            output,
            debug_output: None,
            limiter: Box::new(Unlimited),
        }
    }

    /// Stop execution when `limiter` says so
    pub fn with_limiter(mut self, limiter: impl Limiter + 'd) -> Self {
        self.limiter = Box::new(limiter);
        self
    }

    /// Enable debug hooks and write their output into `debug_output`
    pub fn with_debug_output(mut self, debug_output: impl Write + 'd) -> Self {
        self.debug_output = Some(Box::new(debug_output));
        self
    }

    /// Execute program on a fresh tape
    pub fn execute(&mut self, program: &Instructions) -> Result<MachineState, RuntimeError> {
        let state = MachineState::new(&self.config);

        self.execute_with_state(program, state)
    }

    /// Execute program starting at `state` and return the final state
    pub fn execute_with_state(&mut self, program: &Instructions, mut state: MachineState) -> Result<MachineState, RuntimeError> {
        let result = self.run(&program.ops, &mut state);

        // Bytes written before a failure stay written
        let flushed = self.output.flush().map_err(|error| RuntimeError::IoError { span: None, error });

        result?;
        flushed?;

        debug!(cycles = state.cycles, pointer = state.pointer, tape_length = state.tape.len(), "execution finished");

        Ok(state)
    }

    fn run(&mut self, ops: &[Op], state: &mut MachineState) -> Result<(), RuntimeError> {
        while state.pc < ops.len() {
            if let LimiterResult::Halt = self.limiter.check(state) {
                return Err(RuntimeError::LimiterTriggered {
                    span: ops[state.pc].span.clone(),
                    cycles: state.cycles,
                });
            }

            self.step(ops, state)?;
        }

        Ok(())
    }

    /// Execute the op at `state.pc`
    ///
    /// Does nothing once `state.pc` is past the last op.
    pub fn step(&mut self, ops: &[Op], state: &mut MachineState) -> Result<(), RuntimeError> {
        let Some(op) = ops.get(state.pc) else {
            return Ok(());
        };

        match op.op_type {
            OpType::MovePointer { delta, low, high } => {
                let pc = state.pc;

                state.pointer = state
                    .tape
                    .move_pointer(state.pointer, delta, low, high)
                    .map_err(|error| match error {
                        MoveError::OutOfBounds(address) => RuntimeError::BoundaryError {
                            span: op.span.clone(),
                            instruction: pc,
                            address,
                        },
                        MoveError::TooLarge { required, max_tape_length } => RuntimeError::MaxTapeSizeReached {
                            span: op.span.clone(),
                            max_tape_length,
                            required,
                        },
                        MoveError::AllocationFailed { required } => RuntimeError::TapeAllocationFailed {
                            span: op.span.clone(),
                            required,
                        },
                    })?;
            }
            OpType::AdjustCell(delta) => state.tape.adjust(state.pointer, delta),
            OpType::Output(repeat) => self.put_char(&op.span, state.cell() as u8, repeat)?,
            OpType::Input(repeat) => {
                for _ in 0..repeat {
                    match self.get_char(&op.span)? {
                        Some(value) => state.tape.set(state.pointer, value as u32),
                        None => {
                            if let EofPolicy::Overwrite(value) = self.config.eof {
                                state.tape.set(state.pointer, value as u32);
                            }
                        }
                    }
                }
            }
            OpType::LoopStart(end) => {
                if state.cell() == 0 {
                    state.pc = end;
                }
            }
            OpType::LoopEnd(start) => {
                if state.cell() != 0 {
                    state.pc = start;
                }
            }
            OpType::ZeroCell => state.tape.set(state.pointer, 0),
            OpType::Halt => {
                state.pc = ops.len();
                return Ok(());
            }
            OpType::DumpTape | OpType::DumpPointer | OpType::DumpCycles => {
                self.debug_hook(&op.op_type, &op.span, state)?;

                // Hooks don't count as cycles
                state.pc += 1;
                return Ok(());
            }
        }

        state.pc += 1;
        state.cycles += 1;

        Ok(())
    }

    fn debug_hook(&mut self, op_type: &OpType, span: &Range<usize>, state: &MachineState) -> Result<(), RuntimeError> {
        let debug_output = match &mut self.debug_output {
            Some(debug_output) => debug_output,
            None => return Ok(()),
        };

        let result = match op_type {
            OpType::DumpTape => {
                let window = self.config.debug_window.min(state.tape.len());
                let cells = state.tape.cells()[..window]
                    .iter()
                    .map(|cell| format!("{:x}", cell))
                    .collect::<Vec<_>>()
                    .join(",");

                writeln!(debug_output, "#[{}...]", cells)
            }
            OpType::DumpPointer => writeln!(debug_output, "^{}", state.pointer),
            _ => writeln!(debug_output, "@{}", state.cycles),
        };

        result.map_err(|error| RuntimeError::IoError {
            span: Some(span.clone()),
            error,
        })
    }

    fn get_char(&mut self, span: &Range<usize>) -> Result<Option<u8>, RuntimeError> {
        // Make prompts visible before blocking on input
        self.output.flush().map_err(|error| RuntimeError::IoError {
            span: Some(span.clone()),
            error,
        })?;

        let mut buf = [0];

        match self.input.read_exact(&mut buf) {
            Ok(()) => Ok(Some(buf[0])),
            Err(error) if error.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(error) => Err(RuntimeError::IoError {
                span: Some(span.clone()),
                error,
            }),
        }
    }

    fn put_char(&mut self, span: &Range<usize>, value: u8, repeat: usize) -> Result<(), RuntimeError> {
        for _ in 0..repeat {
            self.output.write_all(&[value]).map_err(|error| RuntimeError::IoError {
                span: Some(span.clone()),
                error,
            })?;
        }

        Ok(())
    }
}
