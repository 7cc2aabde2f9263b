use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Common interface of the file formats read and written by this crate.
///
/// Implementors handle format-specific parsing and serialization of a single in-memory
/// [`DataFile::Content`] type; the path helpers open buffered files around them.
pub trait DataFile {
    /// The in-memory value a file of this format holds.
    type Content;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads the content from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Content, Self::Error>;

    /// Writes the content to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be represented in this format or writing fails.
    fn write_to(content: &Self::Content, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads the content from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Content, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes the content to a file path, creating or truncating the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(content: &Self::Content, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(content, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
