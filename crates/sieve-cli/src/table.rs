use crate::error::{CliError, Result};
use csv::{Reader, StringRecord, Writer};
use itertools::Itertools;
use molsieve::core::models::molecule::Molecule;
use molsieve::engine::config::OutputMode;
use molsieve::engine::record::{FinalizedRow, Payload, Row, RowSink};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub const COUNTS_COLUMN: &str = "match_counts";
pub const ATOMS_COLUMN: &str = "matched_atoms";
pub const BONDS_COLUMN: &str = "matched_bonds";

/// Reads molecule rows from a CSV table with a header line.
pub struct CsvRowSource<R> {
    reader: Reader<R>,
    headers: StringRecord,
    column: usize,
    key_column: Option<usize>,
}

impl CsvRowSource<File> {
    pub fn open(path: &Path, column: &str, key_column: Option<&str>) -> Result<Self> {
        Self::from_reader(File::open(path)?, column, key_column)
    }
}

impl<R: io::Read> CsvRowSource<R> {
    pub fn from_reader(reader: R, column: &str, key_column: Option<&str>) -> Result<Self> {
        let mut reader = Reader::from_reader(reader);
        let headers = reader.headers()?.clone();
        let position = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                CliError::Argument(format!("Column '{}' not found in input table", name))
            })
        };
        let column = position(column)?;
        let key_column = key_column.map(position).transpose()?;
        Ok(Self {
            reader,
            headers,
            column,
            key_column,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Every data row, keyed by the key column or by its 1-based row number.
    pub fn into_rows(
        self,
    ) -> impl Iterator<Item = std::result::Result<Row<Molecule, StringRecord>, csv::Error>> {
        let Self {
            reader,
            column,
            key_column,
            ..
        } = self;
        reader
            .into_records()
            .enumerate()
            .map(move |(i, record)| {
                let record = record?;
                let key = key_column
                    .and_then(|k| record.get(k))
                    .map_or_else(|| (i + 1).to_string(), str::to_string);
                let payload = read_payload(record.get(column));
                Ok(Row::new(key, payload, record))
            })
    }
}

fn read_payload(cell: Option<&str>) -> Payload<Molecule> {
    match cell.map(str::trim).filter(|text| !text.is_empty()) {
        None => Payload::Missing,
        Some(text) => match Molecule::from_smiles(text) {
            Ok(molecule) => Payload::Molecule(molecule),
            Err(e) => Payload::Unreadable {
                reason: e.to_string(),
            },
        },
    }
}

/// Counts the data rows of a CSV table.
pub fn count_rows(path: &Path) -> Result<u64> {
    let mut reader = Reader::from_path(path)?;
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}

/// Writes finalized rows as CSV, with the molecule column normalized and the
/// requested match detail columns appended.
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    column: usize,
    mode: OutputMode,
}

impl CsvSink<File> {
    pub fn create(path: &Path, headers: &StringRecord, column: usize, mode: OutputMode) -> Result<Self> {
        Self::from_writer(File::create(path)?, headers, column, mode)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(
        writer: W,
        headers: &StringRecord,
        column: usize,
        mode: OutputMode,
    ) -> Result<Self> {
        let mut writer = Writer::from_writer(writer);
        let mut header = headers.clone();
        if mode.needs_details() {
            header.push_field(COUNTS_COLUMN);
        }
        if mode.positions {
            header.push_field(ATOMS_COLUMN);
            header.push_field(BONDS_COLUMN);
        }
        writer.write_record(&header)?;
        Ok(Self {
            writer,
            column,
            mode,
        })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| CliError::Io(e.into_error()))
    }
}

impl<W: Write> RowSink<Molecule, StringRecord> for CsvSink<W> {
    fn push_row(&mut self, row: FinalizedRow<Molecule, StringRecord>) -> io::Result<()> {
        // unreadable molecules are written as missing cells, like missing ones
        let normalized = match &row.payload {
            Payload::Molecule(molecule) => molecule.to_smiles(),
            Payload::Missing | Payload::Unreadable { .. } => String::new(),
        };
        let mut record: StringRecord = row
            .passthrough
            .iter()
            .enumerate()
            .map(|(i, field)| if i == self.column { normalized.as_str() } else { field })
            .collect();

        let result = row.outcome.result();
        let joined =
            |ids: Option<&Vec<usize>>| ids.map(|ids| ids.iter().join(";")).unwrap_or_default();
        if self.mode.needs_details() {
            record.push_field(&joined(result.and_then(|r| r.counts.as_ref())));
        }
        if self.mode.positions {
            record.push_field(&joined(result.and_then(|r| r.atoms.as_ref())));
            record.push_field(&joined(result.and_then(|r| r.bonds.as_ref())));
        }
        self.writer.write_record(&record)?;
        Ok(())
    }
}
