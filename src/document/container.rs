/*!
 * Zip packaging of OOXML documents.
 *
 * Entries keep their original order, names and compression method so a
 * repackaged document differs from the input only in the parts that were replaced.
 */

use std::io::{Cursor, Read, Write};
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::errors::DocumentError;

/// One entry of the container
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// In-memory document container
#[derive(Debug, Clone)]
pub struct Container {
    entries: Vec<Entry>,
}

impl Container {
    /// Read every entry of a zip archive into memory
    pub fn read(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocumentError::InvalidInput(format!("Not a valid document container: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| DocumentError::InvalidInput(format!("Failed to read container entry: {}", e)))?;

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data).map_err(|e| {
                DocumentError::InvalidInput(format!("Failed to read container entry {}: {}", file.name(), e))
            })?;

            entries.push(Entry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }

        Ok(Self { entries })
    }

    /// Names of all entries, in archive order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Raw bytes of a part
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.data.as_slice())
    }

    /// Replace the bytes of an existing part
    pub fn replace(&mut self, name: &str, data: Vec<u8>) -> Result<(), DocumentError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .ok_or_else(|| DocumentError::Write(format!("Part {} does not exist", name)))?;
        entry.data = data;
        Ok(())
    }

    /// Serialize the container back into zip bytes
    pub fn write(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = FileOptions::default().compression_method(method);

            if entry.is_dir {
                writer
                    .add_directory(entry.name.as_str(), options)
                    .map_err(|e| DocumentError::Write(format!("Failed to add {}: {}", entry.name, e)))?;
                continue;
            }

            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| DocumentError::Write(format!("Failed to add {}: {}", entry.name, e)))?;
            writer
                .write_all(&entry.data)
                .map_err(|e| DocumentError::Write(format!("Failed to write {}: {}", entry.name, e)))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| DocumentError::Write(format!("Failed to finish container: {}", e)))?;
        Ok(cursor.into_inner())
    }
}
