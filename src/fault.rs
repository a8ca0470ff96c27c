//! Conditions fatal to a run. Opcode or mode corruption means either a malformed
//! program or a machine bug, so there is no recovery path: the machine reports the
//! fault and the address it occurred at, then refuses to execute further.

use num::BigInt;
use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum FaultKind {
  #[error("unknown opcode '{0}'")]
  UnknownOpcode(BigInt),

  #[error("invalid parameter mode '{0}'")]
  InvalidAddressingMode(u8),

  #[error("can't write to an immediate parameter")]
  ImmediateWrite,
}

/// A `FaultKind` pinned to the instruction pointer at the time of failure.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("{kind} at tape address {at}")]
pub struct Fault {
  pub kind : FaultKind,
  pub at   : BigInt,
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn faults_report_kind_and_address() {
    let fault = Fault {
      kind: FaultKind::UnknownOpcode(BigInt::from(77)),
      at: BigInt::from(2),
    };

    assert_eq!(format!("{}", fault), "unknown opcode '77' at tape address 2");
  }

  #[test]
  fn mode_faults_name_the_digit() {
    let fault = Fault {
      kind: FaultKind::InvalidAddressingMode(7),
      at: BigInt::from(0),
    };

    assert_eq!(format!("{}", fault), "invalid parameter mode '7' at tape address 0");
  }

}
