//! The tape is the memory store of the machine: a sparse mapping from integer
//! addresses to integer words. Addresses are unbounded in both directions, so the
//! tape cannot be a contiguous vector.

use std::collections::HashMap;

use num::{BigInt, Zero};

/**
  Sparse word storage. A program occupies addresses `0..N-1`; everything else
  reads as zero until written. Reads never create a slot, so the number of
  populated cells only reflects the program load and the stores performed.
*/
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tape {
  cells: HashMap<BigInt, BigInt>,
}

impl Tape {

  /// Loads the program verbatim at addresses `0..program.len()-1`.
  pub fn new(program: &[BigInt]) -> Tape {
    let cells =
      program.iter()
             .cloned()
             .enumerate()
             .map(|(address, word)| (BigInt::from(address), word))
             .collect();
    Tape { cells }
  }

  /// A never-written address reads as zero.
  pub fn read(&self, address: &BigInt) -> BigInt {
    match self.cells.get(address) {
      Some(word) => word.clone(),
      None       => BigInt::zero(),
    }
  }

  /// Writes the word, creating the slot if absent.
  pub fn write(&mut self, address: BigInt, word: BigInt) {
    self.cells.insert(address, word);
  }

  /// Iterates over the populated cells in no particular order.
  pub fn iter(&self) -> impl Iterator<Item = (&BigInt, &BigInt)> {
    self.cells.iter()
  }

}
