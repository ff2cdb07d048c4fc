//! Stdin streaming
//!
//! Captures standard input as one named logical file for push. The whole
//! input is buffered up front; this tool does not do partial or
//! interactive streaming, and the bytes never touch the local disk.

use std::io::Read;

use crate::error::IglooResult;

/// Ephemeral in-memory file bound to a remote target name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Read a source fully into memory and bind it to `name`
///
/// Empty input is not an error; it produces a zero-byte remote file.
pub fn capture(name: &str, mut reader: impl Read) -> IglooResult<StreamSource> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(StreamSource {
        name: name.to_string(),
        bytes,
    })
}

/// Capture the process's standard input
pub fn capture_stdin(name: &str) -> IglooResult<StreamSource> {
    capture(name, std::io::stdin().lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_buffers_whole_input() {
        let source = capture("notes.txt", &b"line one\nline two\n"[..]).unwrap();
        assert_eq!(source.name, "notes.txt");
        assert_eq!(source.bytes, b"line one\nline two\n");
    }

    #[test]
    fn empty_input_is_a_zero_byte_file() {
        let source = capture("empty.bin", &b""[..]).unwrap();
        assert!(source.bytes.is_empty());
    }
}
