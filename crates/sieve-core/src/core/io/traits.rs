use crate::core::models::molecule::Molecule;
use std::error::Error;
use std::io::BufRead;

/// Defines the interface for single-line molecular notations.
///
/// Implementors turn one line of text into a [`Molecule`] and back. The
/// written form is normalized: reading and re-writing it yields the same text.
pub trait LineNotation {
    /// The error type for parse failures.
    type Error: Error + Send + Sync + 'static;

    /// Parses a molecule from one line of text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid in this notation.
    fn parse(text: &str) -> Result<Molecule, Self::Error>;

    /// Writes a molecule in its normalized form.
    fn write(molecule: &Molecule) -> String;

    /// Parses every non-blank line of a reader.
    ///
    /// I/O failures end the iteration; parse failures are yielded per line so a
    /// single bad entry does not hide the rest.
    fn read_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Molecule, Self::Error>> {
        reader
            .lines()
            .map_while(Result::ok)
            .filter(|line| !line.trim().is_empty())
            .map(|line| Self::parse(line.trim()))
    }
}
