//! Struct archiving functionality
//!
//! To add archiving functionality to a struct implement the `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::path::Path;
use std::fs::{File, OpenOptions};
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
///
/// Records must be flat structs (no nested structs or sequences), since each one becomes a single
/// CSV row.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a timestamped csv.
///
/// To implement this trait, the struct shall have an `Archiver` member which shall be setup in the
/// struct's `init` or `new` functions. 
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut session_path = session.arch_root.clone();
        session_path.push(path);

        Self::from_abs_path(session_path)
    }

    /// Create a new archiver writing to the given file, which is truncated if it exists.
    pub fn from_abs_path<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        // Create the parent directory if needed
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create the file if it does not exist
        std::fs::File::create(path.as_ref())?;

        // Open the file in append mode
        let file = OpenOptions::new()
            .append(true)
            .open(path.as_ref())?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Returns `true` if the archiver has been set up with a file.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Serialise a record into the archive.
    ///
    /// Serialising into an archiver which was never opened is a no-op.
    pub fn serialise<T: Serialize>(
        &mut self, record: T
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref mut w) = self.writer {
            w.serialize(record)?;
            w.flush()?
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        time_s: f64,
        cmd: f64,
        in_bound: bool
    }

    #[test]
    fn test_archiver_writes_header_and_rows() {
        let path = std::env::temp_dir()
            .join(format!("util_archive_test_{}", std::process::id()))
            .join("rows.csv");

        let mut arch = Archiver::from_abs_path(&path).unwrap();
        assert!(arch.is_open());
        arch.serialise(Row { time_s: 0.0, cmd: 1.5, in_bound: true }).unwrap();
        arch.serialise(Row { time_s: 0.1, cmd: 0.0, in_bound: false }).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["time_s,cmd,in_bound", "0.0,1.5,true", "0.1,0.0,false"]);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_default_archiver_is_noop() {
        let mut arch = Archiver::default();
        assert!(!arch.is_open());
        assert!(arch.serialise(Row { time_s: 0.0, cmd: 0.0, in_bound: true }).is_ok());
    }
}
