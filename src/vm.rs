//! Structures and functions for the Intcode virtual machine: the
//! fetch-decode-execute loop, the suspension points for I/O, and the
//! caller-facing run protocols built on top of them.

use std::fmt::{Display, Formatter};

use num::{BigInt, One, Zero};
use prettytable::{format as TableFormat, Table};

use crate::fault::{Fault, FaultKind};
use crate::instruction::{Instruction, Opcode};
use crate::tape::Tape;

/// Why a run stopped without a fault.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Halt {
  /// The halt opcode was reached.
  Normal,
  /// The input port ran dry. Not an error: the tape is left intact and the
  /// head still points at the input instruction.
  InputExhausted,
}

/// What one advance request yielded.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Event {
  Produced(BigInt),
  Halted(Halt),
}

enum State {
  Running,
  Halted(Halt),
  Failed(Fault),
}

/**
  One run of an Intcode program. The machine exclusively owns its tape, its
  head (the instruction pointer), its relocation base, and its input port. It
  is driven by a caller who repeatedly asks for the next output: each request
  executes a synchronous burst of instructions that ends at an output
  instruction, a halt, input exhaustion, or a fault.
*/
pub struct Machine<I: Iterator<Item = BigInt>> {
  tape          : Tape,
  head          : BigInt,
  relative_base : BigInt,
  input         : I,
  state         : State,
}

impl<I: Iterator<Item = BigInt>> Machine<I> {

  // region Construction and accessors

  pub fn new(program: &[BigInt], input: I) -> Machine<I> {
    Machine {
      tape          :  Tape::new(program),
      head          :  BigInt::zero(),
      relative_base :  BigInt::zero(),
      input,
      state         :  State::Running,
    }
  }

  pub fn tape(&self) -> &Tape {
    &self.tape
  }

  /// The final tape snapshot.
  pub fn into_tape(self) -> Tape {
    self.tape
  }

  pub fn head(&self) -> &BigInt {
    &self.head
  }

  pub fn relative_base(&self) -> &BigInt {
    &self.relative_base
  }

  fn is_running(&self) -> bool {
    match self.state {
      State::Running => true,
      _              => false,
    }
  }

  // endregion

  // region Execution

  /**
    Executes instructions until the run produces a value or stops. Calling
    `advance` on a machine that already halted reports the same halt again;
    calling it on a machine that already faulted reports the same fault again.
    Nothing executes after a terminal state is reached.
  */
  pub fn advance(&mut self) -> Result<Event, Fault> {
    loop {
      match &self.state {
        State::Halted(halt)  => return Ok(Event::Halted(*halt)),
        State::Failed(fault) => return Err(fault.clone()),
        State::Running       => {}
      }

      match self.step() {
        Ok(Some(event)) => return Ok(event),
        Ok(None)        => {}
        Err(fault)      => {
          self.state = State::Failed(fault.clone());
          return Err(fault);
        }
      }
    }
  }

  /**
    Runs to termination, collecting every produced value. The tape afterwards
    is the final memory state; input exhaustion is reported as a halt reason,
    not an error.
  */
  pub fn run(&mut self) -> Result<(Vec<BigInt>, Halt), Fault> {
    let mut produced = Vec::new();
    loop {
      match self.advance()? {
        Event::Produced(value) => produced.push(value),
        Event::Halted(halt)    => return Ok((produced, halt)),
      }
    }
  }

  /// Executes a single instruction. `None` means the burst continues.
  fn step(&mut self) -> Result<Option<Event>, Fault> {
    let instruction =
      Instruction::decode(&self.tape, &self.head).map_err(|kind| self.fault(kind))?;

    #[cfg(feature = "trace_computation")] println!("{}\n{}", self, instruction);

    match instruction.opcode {

      Opcode::Add => {
        let sum = self.operand(&instruction, 0)? + self.operand(&instruction, 1)?;
        self.store(&instruction, 2, sum)?;
        self.head += 4;
      }

      Opcode::Multiply => {
        let product = self.operand(&instruction, 0)? * self.operand(&instruction, 1)?;
        self.store(&instruction, 2, product)?;
        self.head += 4;
      }

      Opcode::Input => {
        match self.input.next() {

          Some(value) => {
            self.store(&instruction, 0, value)?;
            self.head += 2;
          }

          // Exhaustion is a soft halt: nothing is written and the head stays
          // on the input instruction.
          None => {
            self.state = State::Halted(Halt::InputExhausted);
            return Ok(Some(Event::Halted(Halt::InputExhausted)));
          }

        }
      }

      Opcode::Output => {
        let value = self.operand(&instruction, 0)?;
        self.head += 2;
        return Ok(Some(Event::Produced(value)));
      }

      Opcode::JumpIfTrue => {
        match self.operand(&instruction, 0)?.is_zero() {
          false => self.head = self.operand(&instruction, 1)?,
          true  => self.head += 3,
        }
      }

      Opcode::JumpIfFalse => {
        match self.operand(&instruction, 0)?.is_zero() {
          true  => self.head = self.operand(&instruction, 1)?,
          false => self.head += 3,
        }
      }

      Opcode::LessThan => {
        let flag = match self.operand(&instruction, 0)? < self.operand(&instruction, 1)? {
          true  => BigInt::one(),
          false => BigInt::zero(),
        };
        self.store(&instruction, 2, flag)?;
        self.head += 4;
      }

      Opcode::Equals => {
        let flag = match self.operand(&instruction, 0)? == self.operand(&instruction, 1)? {
          true  => BigInt::one(),
          false => BigInt::zero(),
        };
        self.store(&instruction, 2, flag)?;
        self.head += 4;
      }

      Opcode::AdjustBase => {
        let delta = self.operand(&instruction, 0)?;
        self.relative_base += delta;
        self.head += 2;
      }

      Opcode::Halt => {
        self.state = State::Halted(Halt::Normal);
        return Ok(Some(Event::Halted(Halt::Normal)));
      }

    } // end match opcode

    Ok(None)
  }

  /// Resolves operand `index` of the instruction as a load.
  fn operand(&self, instruction: &Instruction, index: usize) -> Result<BigInt, Fault> {
    instruction.parameters[index]
      .read(&self.tape, &self.relative_base)
      .map_err(|kind| self.fault(kind))
  }

  /// Resolves operand `index` as a store target and writes the value there.
  fn store(&mut self, instruction: &Instruction, index: usize, value: BigInt)
    -> Result<(), Fault>
  {
    let target = instruction.parameters[index]
      .target(&self.relative_base)
      .map_err(|kind| self.fault(kind))?;
    self.tape.write(target, value);
    Ok(())
  }

  fn fault(&self, kind: FaultKind) -> Fault {
    Fault { kind, at: self.head.clone() }
  }

  // endregion

}

/**
  The produced output sequence. Consuming one element executes only as many
  instructions as needed to reach the next output instruction. The sequence
  ends at a halt; a fault is yielded exactly once and ends the sequence.
*/
impl<I: Iterator<Item = BigInt>> Iterator for Machine<I> {
  type Item = Result<BigInt, Fault>;

  fn next(&mut self) -> Option<Self::Item> {
    if !self.is_running() {
      return None;
    }
    match self.advance() {
      Ok(Event::Produced(value)) => Some(Ok(value)),
      Ok(Event::Halted(_))       => None,
      Err(fault)                 => Some(Err(fault)),
    }
  }
}

// region Display methods

fn make_tape_table(tape: &Tape, highlight: &BigInt) -> Table {
  let mut table = Table::new();

  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Address", ubl->"Contents"]);

  let mut cells: Vec<_> = tape.iter().collect();
  cells.sort_by(|lhs, rhs| lhs.0.cmp(rhs.0));

  for (address, word) in cells {
    match address == highlight {

      true  => {
        table.add_row(row![r->format!("* --> [{}] =", address), format!("{}", word)]);
      }

      false => {
        table.add_row(row![r->format!("[{}] =", address), format!("{}", word)]);
      }

    } // end match on highlight
  } // end for
  table
}

impl<I: Iterator<Item = BigInt>> Display for Machine<I> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let tape_table = make_tape_table(&self.tape, &self.head);

    let mut register_table = Table::new();
    register_table.set_format(*TABLE_DISPLAY_FORMAT);
    register_table.set_titles(row![ubr->"Register", ubl->"Contents"]);
    register_table.add_row(row![r->"head =", format!("{}", self.head)]);
    register_table.add_row(row![r->"base =", format!("{}", self.relative_base)]);

    let mut combined_table = table!([tape_table, register_table]);
    combined_table.set_titles(row![ub->"Tape", ub->"Registers"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let status = match &self.state {
      State::Running                      => String::from("Running."),
      State::Halted(Halt::Normal)         => String::from("Halted."),
      State::Halted(Halt::InputExhausted) => String::from("Halted: input exhausted."),
      State::Failed(fault)                => format!("Failed: {}", fault),
    };

    write!(f, "{}\n{}", status, combined_table)
  }
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

// endregion
