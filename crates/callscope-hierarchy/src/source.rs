//! Line-indexed source text used to translate between byte offsets and
//! line/character positions.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::ServiceError;
use crate::service::ServicePosition;

/// A loaded source file with a line-start index.
///
/// Characters are counted in UTF-16 code units, matching the Language Server
/// Protocol's default position encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    path: Utf8PathBuf,
    text: String,
    line_starts: Vec<u32>,
}

impl SourceText {
    /// Indexes `text` as the contents of `path`.
    ///
    /// # Errors
    /// Returns [`ServiceError::Position`] if the text is too large for 32-bit
    /// offsets.
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        text: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let file = path.into();
        let contents = text.into();
        let mut line_starts = vec![0];
        for (index, byte) in contents.bytes().enumerate() {
            if byte == b'\n' {
                let next = index.saturating_add(1);
                let start =
                    u32::try_from(next).map_err(|_| ServiceError::position(&file, u32::MAX))?;
                line_starts.push(start);
            }
        }
        Ok(Self {
            path: file,
            text: contents,
            line_starts,
        })
    }

    /// Reads and indexes the file at `path`.
    ///
    /// # Errors
    /// Returns [`ServiceError::MissingSourceFile`] when the file does not
    /// exist and [`ServiceError::Io`] for any other read failure.
    pub fn load(path: &Utf8Path) -> Result<Self, ServiceError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::new(path, text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ServiceError::missing_source_file(path))
            }
            Err(err) => Err(ServiceError::io(format!("failed to read {path}"), err)),
        }
    }

    /// Returns the path this text was loaded from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the raw text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Maps a byte offset to a 0-indexed line and UTF-16 character.
    ///
    /// # Errors
    /// Returns [`ServiceError::Position`] if the offset is past the end of the
    /// text or splits a character.
    pub fn position_of(&self, offset: u32) -> Result<ServicePosition, ServiceError> {
        let out_of_range = || ServiceError::position(&self.path, offset);
        let line_index = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .checked_sub(1)
            .ok_or_else(out_of_range)?;
        let line_start = self
            .line_starts
            .get(line_index)
            .copied()
            .ok_or_else(out_of_range)?;
        let prefix = self
            .text
            .get(to_usize(line_start)..to_usize(offset))
            .ok_or_else(out_of_range)?;
        let character = u32::try_from(prefix.encode_utf16().count()).map_err(|_| out_of_range())?;
        let line = u32::try_from(line_index).map_err(|_| out_of_range())?;
        Ok(ServicePosition::new(line, character))
    }

    /// Maps a 0-indexed line and UTF-16 character to a byte offset.
    ///
    /// Characters past the end of the line clamp to the line end, as the
    /// protocol requires. The line end excludes the line terminator, including
    /// the `\r` of a CRLF pair.
    ///
    /// # Errors
    /// Returns [`ServiceError::MissingLine`] if the line does not exist.
    pub fn offset_of(&self, position: ServicePosition) -> Result<u32, ServiceError> {
        let line_index = to_usize(position.line);
        let line_start = self
            .line_starts
            .get(line_index)
            .copied()
            .ok_or_else(|| ServiceError::missing_line(&self.path, position.line))?;
        let line_end = self
            .line_starts
            .get(line_index.saturating_add(1))
            .map_or(self.text.len(), |&next| to_usize(next).saturating_sub(1));
        let raw_line = self
            .text
            .get(to_usize(line_start)..line_end)
            .ok_or_else(|| ServiceError::position(&self.path, line_start))?;
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        let mut units = 0_u32;
        let mut bytes = 0_usize;
        for ch in line.chars() {
            if units >= position.character {
                break;
            }
            units = units.saturating_add(u32::try_from(ch.len_utf16()).unwrap_or(2));
            bytes = bytes.saturating_add(ch.len_utf8());
        }
        let within =
            u32::try_from(bytes).map_err(|_| ServiceError::position(&self.path, line_start))?;
        Ok(line_start.saturating_add(within))
    }
}

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
