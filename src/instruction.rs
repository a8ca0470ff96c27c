//! Instruction words and their decoding. An instruction word packs a two-digit
//! opcode in its lowest two decimal digits and one addressing-mode digit per
//! operand above them. Operand raw values are the tape words immediately
//! following the instruction word.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use num::{BigInt, Integer, ToPrimitive};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::fault::FaultKind;
use crate::tape::Tape;

/**
  Opcodes of the virtual machine. The discriminant is the numeric opcode as it
  appears in a program, which is why `Halt` sits apart from the rest. Anything
  else in the opcode position of a word is a fault, surfaced by `decode`.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq,        Debug,        Hash
)]
#[repr(u8)]
#[strum(serialize_all = "kebab_case")]
pub enum Opcode {
  Add         = 1,
  Multiply    = 2,
  Input       = 3,
  Output      = 4,
  JumpIfTrue  = 5,
  JumpIfFalse = 6,
  LessThan    = 7,
  Equals      = 8,
  AdjustBase  = 9,
  Halt        = 99,
}

impl Opcode {

  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// The number of operands the opcode requires.
  pub fn arity(&self) -> usize {
    match self {
      | Opcode::Add
      | Opcode::Multiply
      | Opcode::LessThan
      | Opcode::Equals      => 3,

      | Opcode::JumpIfTrue
      | Opcode::JumpIfFalse => 2,

      | Opcode::Input
      | Opcode::Output
      | Opcode::AdjustBase  => 1,

      Opcode::Halt          => 0,
    }
  }

}

/// Addressing modes a parameter can carry. The digit is the discriminant.
#[derive(
  StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,               PartialEq,    Debug, Hash
)]
#[repr(u8)]
pub enum Mode {
  #[strum(serialize = "pos")]
  Position  = 0,
  #[strum(serialize = "imm")]
  Immediate = 1,
  #[strum(serialize = "rel")]
  Relative  = 2,
}

/**
  One operand of a decoded instruction: the raw mode digit and the raw word.
  The digit is kept unvalidated so that a bad mode only faults when the
  parameter is actually resolved, not when the instruction is decoded.
*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
  pub mode  : u8,
  pub value : BigInt,
}

impl Parameter {

  fn mode(&self) -> Result<Mode, FaultKind> {
    Mode::try_from(self.mode).map_err(|_| FaultKind::InvalidAddressingMode(self.mode))
  }

  /// Resolves the parameter as a load.
  pub fn read(&self, tape: &Tape, relative_base: &BigInt) -> Result<BigInt, FaultKind> {
    match self.mode()? {
      Mode::Position  => Ok(tape.read(&self.value)),
      Mode::Immediate => Ok(self.value.clone()),
      Mode::Relative  => Ok(tape.read(&(&self.value + relative_base))),
    }
  }

  /// Resolves the parameter as a store target. An instruction must never
  /// target an immediate parameter as a destination.
  pub fn target(&self, relative_base: &BigInt) -> Result<BigInt, FaultKind> {
    match self.mode()? {
      Mode::Position  => Ok(self.value.clone()),
      Mode::Relative  => Ok(&self.value + relative_base),
      Mode::Immediate => Err(FaultKind::ImmediateWrite),
    }
  }

}

impl Display for Parameter {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match Mode::try_from(self.mode) {
      Ok(mode) => write!(f, "{}:{}", mode, self.value),
      Err(_)   => write!(f, "invalid({}):{}", self.mode, self.value),
    }
  }
}

/// A decoded instruction. Exists only for the duration of one engine step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
  pub opcode     : Opcode,
  pub parameters : Vec<Parameter>,
}

impl Instruction {

  /**
    Decodes the word at `head`. The opcode is the word modulo 100 with floor
    semantics, so negative words decode the way a decimal reading would
    suggest. Mode digits above the operand count are ignored.
  */
  pub fn decode(tape: &Tape, head: &BigInt) -> Result<Instruction, FaultKind> {
    let word = tape.read(head);
    let hundred = BigInt::from(100);
    let ten = BigInt::from(10);

    let code = word.mod_floor(&hundred);
    let opcode = match code.to_u8().and_then(|c| Opcode::try_from(c).ok()) {
      Some(opcode) => opcode,
      None         => return Err(FaultKind::UnknownOpcode(code)),
    };

    let mut modes = word.div_floor(&hundred);
    let mut parameters = Vec::with_capacity(opcode.arity());
    for offset in 0..opcode.arity() {
      // The digit is in 0..10, so the conversion cannot fail.
      let mode = modes.mod_floor(&ten).to_u8().unwrap();
      let value = tape.read(&(head + BigInt::from(offset + 1)));
      parameters.push(Parameter { mode, value });
      modes = modes.div_floor(&ten);
    }

    Ok(Instruction { opcode, parameters })
  }

}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:02} {}", self.opcode.code(), self.opcode)?;
    for (index, parameter) in self.parameters.iter().enumerate() {
      match index {
        0 => write!(f, " {}", parameter)?,
        _ => write!(f, ", {}", parameter)?,
      }
    }
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn tape_of(values: &[i64]) -> Tape {
    let words: Vec<BigInt> = values.iter().map(|&v| BigInt::from(v)).collect();
    Tape::new(&words)
  }

  #[test]
  fn decodes_opcode_and_mode_digits() {
    let tape = tape_of(&[1002, 4, 3, 4, 33]);
    let instruction = Instruction::decode(&tape, &BigInt::from(0)).unwrap();

    assert_eq!(instruction.opcode, Opcode::Multiply);
    assert_eq!(
      instruction.parameters,
      vec![
        Parameter { mode: 0, value: BigInt::from(4) },
        Parameter { mode: 1, value: BigInt::from(3) },
        Parameter { mode: 0, value: BigInt::from(4) },
      ]
    );
  }

  #[test]
  fn operand_count_follows_the_opcode() {
    let tape = tape_of(&[109, 19, 99]);

    let adjust = Instruction::decode(&tape, &BigInt::from(0)).unwrap();
    assert_eq!(adjust.opcode, Opcode::AdjustBase);
    assert_eq!(adjust.parameters, vec![Parameter { mode: 1, value: BigInt::from(19) }]);

    let halt = Instruction::decode(&tape, &BigInt::from(2)).unwrap();
    assert_eq!(halt.opcode, Opcode::Halt);
    assert!(halt.parameters.is_empty());
  }

  #[test]
  fn unknown_opcodes_are_faults() {
    let tape = tape_of(&[77, 0, 0]);

    assert_eq!(
      Instruction::decode(&tape, &BigInt::from(0)),
      Err(FaultKind::UnknownOpcode(BigInt::from(77)))
    );
  }

  #[test]
  fn an_empty_tape_decodes_to_opcode_zero() {
    let tape = tape_of(&[]);

    assert_eq!(
      Instruction::decode(&tape, &BigInt::from(0)),
      Err(FaultKind::UnknownOpcode(BigInt::from(0)))
    );
  }

  #[test]
  fn negative_words_decode_with_floor_semantics() {
    let tape = tape_of(&[-5]);

    assert_eq!(
      Instruction::decode(&tape, &BigInt::from(0)),
      Err(FaultKind::UnknownOpcode(BigInt::from(95)))
    );
  }

  #[test]
  fn read_resolution_per_mode() {
    let tape = tape_of(&[10, 20, 30]);
    let base = BigInt::from(3);

    let position = Parameter { mode: 0, value: BigInt::from(1) };
    assert_eq!(position.read(&tape, &base), Ok(BigInt::from(20)));

    let immediate = Parameter { mode: 1, value: BigInt::from(-7) };
    assert_eq!(immediate.read(&tape, &base), Ok(BigInt::from(-7)));

    let relative = Parameter { mode: 2, value: BigInt::from(-1) };
    assert_eq!(relative.read(&tape, &base), Ok(BigInt::from(30)));

    let invalid = Parameter { mode: 7, value: BigInt::from(0) };
    assert_eq!(invalid.read(&tape, &base), Err(FaultKind::InvalidAddressingMode(7)));
  }

  #[test]
  fn write_resolution_per_mode() {
    let base = BigInt::from(5);

    let position = Parameter { mode: 0, value: BigInt::from(7) };
    assert_eq!(position.target(&base), Ok(BigInt::from(7)));

    let relative = Parameter { mode: 2, value: BigInt::from(-4) };
    assert_eq!(relative.target(&base), Ok(BigInt::from(1)));

    let immediate = Parameter { mode: 1, value: BigInt::from(7) };
    assert_eq!(immediate.target(&base), Err(FaultKind::ImmediateWrite));

    let invalid = Parameter { mode: 9, value: BigInt::from(0) };
    assert_eq!(invalid.target(&base), Err(FaultKind::InvalidAddressingMode(9)));
  }

  #[test]
  fn instructions_render_with_mode_tags() {
    let tape = tape_of(&[21002, 4, 3, 4]);
    let instruction = Instruction::decode(&tape, &BigInt::from(0)).unwrap();

    assert_eq!(format!("{}", instruction), "02 multiply pos:4, imm:3, rel:4");
  }

}
