#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

mod fault;
mod instruction;
mod program;
mod tape;
mod vm;

use std::env;
use std::fs;
use std::io::{self, BufRead};
use std::process::exit;

use num::BigInt;

use crate::vm::Machine;

/**
  Runs an Intcode program file. Input values are pulled from stdin one line at
  a time, only when the program asks for them, so the protocol stays
  interactive. Produced values are printed one per line.
*/
fn main() {
  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  let path = match env::args().nth(1) {
    Some(path) => path,
    None => {
      eprintln!("Usage: intcode <program-file>");
      exit(2);
    }
  };

  let text = match fs::read_to_string(&path) {
    Ok(text) => text,
    Err(error) => {
      eprintln!("Can't read {}: {}", path, error);
      exit(2);
    }
  };

  let words = match program::parse_program(&text) {
    Ok(words) => words,
    Err(error) => {
      eprintln!("Malformed program {}: {}", path, error);
      exit(2);
    }
  };

  let stdin = io::stdin();
  let input = stdin
    .lock()
    .lines()
    .filter_map(|line| line.ok())
    .filter_map(|line| line.trim().parse::<BigInt>().ok());

  let machine = Machine::new(&words, input);
  for produced in machine {
    match produced {
      Ok(value) => println!("{}", value),
      Err(fault) => {
        eprintln!("{}", fault);
        exit(1);
      }
    }
  }
}
