/*!
  A program arrives as text: integer words separated by commas, with arbitrary
  whitespace and line breaks around them. This module turns that text into the
  word sequence the tape is loaded from.
*/

use nom::{
  character::complete::{char as one_char, digit1, multispace0, space0},
  combinator::{all_consuming, map, opt, recognize},
  error::ErrorKind,
  multi::separated_list,
  sequence::{delimited, pair},
};
use num::BigInt;

/// Parses program source into its word sequence. Anything other than
/// comma-separated integers and whitespace is an error.
pub fn parse_program(text: &str) -> Result<Vec<BigInt>, nom::Err<(&str, ErrorKind)>> {
  let integer_p = map(
    recognize(pair::<&str, _, _, (&str, ErrorKind), _, _>(opt(one_char('-')), digit1)),
    |digits: &str| digits.parse::<BigInt>().unwrap(),
  );
  let word_list_p = separated_list(delimited(space0, one_char(','), multispace0), integer_p);

  match all_consuming(delimited(multispace0, word_list_p, multispace0))(text) {
    Ok((_rest, words)) => Ok(words),
    Err(error)         => Err(error),
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn words(values: &[i64]) -> Vec<BigInt> {
    values.iter().map(|&v| BigInt::from(v)).collect()
  }

  #[test]
  fn parses_a_word_list() {
    assert_eq!(parse_program("1,9,10,3"), Ok(words(&[1, 9, 10, 3])));
  }

  #[test]
  fn parses_negative_words() {
    assert_eq!(parse_program("1101,100,-1,4,0"), Ok(words(&[1101, 100, -1, 4, 0])));
  }

  #[test]
  fn tolerates_whitespace_and_line_breaks() {
    assert_eq!(
      parse_program("109, 1,\n204, -1\n"),
      Ok(words(&[109, 1, 204, -1]))
    );
  }

  #[test]
  fn parses_the_empty_program() {
    assert_eq!(parse_program(""), Ok(vec![]));
    assert_eq!(parse_program("\n"), Ok(vec![]));
  }

  #[test]
  fn rejects_malformed_text() {
    assert!(parse_program("1,,2").is_err());
    assert!(parse_program("fetch").is_err());
    assert!(parse_program("1 2").is_err());
    assert!(parse_program("3,4,").is_err());
  }

}
