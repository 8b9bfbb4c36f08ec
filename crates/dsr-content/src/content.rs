//! Staged content and the size capability every content handle provides.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use bytes::{Buf, Bytes};

/// Anything whose size in bytes is known without consuming it.
pub trait ContentSize {
    fn content_size(&self) -> u64;
}

impl ContentSize for [u8] {
    fn content_size(&self) -> u64 {
        self.len() as u64
    }
}

impl ContentSize for Vec<u8> {
    fn content_size(&self) -> u64 {
        self.len() as u64
    }
}

impl ContentSize for str {
    fn content_size(&self) -> u64 {
        self.len() as u64
    }
}

impl ContentSize for String {
    fn content_size(&self) -> u64 {
        self.len() as u64
    }
}

impl ContentSize for Bytes {
    fn content_size(&self) -> u64 {
        self.len() as u64
    }
}

impl<T: ContentSize + ?Sized> ContentSize for &T {
    fn content_size(&self) -> u64 {
        (**self).content_size()
    }
}

impl<T: ContentSize + ?Sized> ContentSize for Box<T> {
    fn content_size(&self) -> u64 {
        (**self).content_size()
    }
}

impl<T: ContentSize + ?Sized> ContentSize for Arc<T> {
    fn content_size(&self) -> u64 {
        (**self).content_size()
    }
}

/// Content staged on a datastream before it is saved.
///
/// Lengths of files and streams are captured when the handle is built, so
/// asking for the size later never touches the filesystem and never fails.
pub enum ContentHandle {
    /// An in-memory buffer.
    Bytes(Bytes),
    /// An open file and its length at the time it was staged.
    File { file: File, len: u64 },
    /// A reader with a declared length.
    Stream {
        reader: Box<dyn Read + Send + Sync>,
        len: u64,
    },
}

impl ContentHandle {
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Bytes(data.into())
    }

    /// Stage an open file. Its length is read from file metadata.
    pub fn from_file(file: File) -> io::Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self::File { file, len })
    }

    /// Open and stage the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_file(File::open(path)?)
    }

    /// Stage a reader whose length the caller already knows.
    pub fn from_reader(reader: impl Read + Send + Sync + 'static, len: u64) -> Self {
        Self::Stream {
            reader: Box::new(reader),
            len,
        }
    }

    /// Stage a seekable reader, measuring the bytes left from its current
    /// position. The position is restored afterwards.
    pub fn from_seekable<R>(mut reader: R) -> io::Result<Self>
    where
        R: Read + Seek + Send + Sync + 'static,
    {
        let pos = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(pos))?;
        Ok(Self::from_reader(reader, end.saturating_sub(pos)))
    }

    /// `true` for handles that are read incrementally (files and streams)
    /// rather than held in memory.
    pub fn behaves_like_io(&self) -> bool {
        matches!(self, Self::File { .. } | Self::Stream { .. })
    }

    /// The buffer, for in-memory content.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(&b[..]),
            _ => None,
        }
    }

    /// Consume the handle into a reader for upload.
    pub fn into_reader(self) -> Box<dyn Read + Send + Sync> {
        match self {
            Self::Bytes(b) => Box::new(b.reader()),
            Self::File { file, .. } => Box::new(file),
            Self::Stream { reader, .. } => reader,
        }
    }
}

impl ContentSize for ContentHandle {
    fn content_size(&self) -> u64 {
        match self {
            Self::Bytes(b) => b.len() as u64,
            Self::File { len, .. } | Self::Stream { len, .. } => *len,
        }
    }
}

impl fmt::Debug for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::File { len, .. } => f.debug_struct("File").field("len", len).finish(),
            Self::Stream { len, .. } => f.debug_struct("Stream").field("len", len).finish(),
        }
    }
}

impl From<Bytes> for ContentHandle {
    fn from(b: Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<u8>> for ContentHandle {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(v))
    }
}

impl From<String> for ContentHandle {
    fn from(s: String) -> Self {
        Self::Bytes(Bytes::from(s))
    }
}

impl From<&str> for ContentHandle {
    fn from(s: &str) -> Self {
        Self::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<&[u8]> for ContentHandle {
    fn from(s: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn plain_buffers_report_length() {
        assert_eq!(b"hello"[..].content_size(), 5);
        assert_eq!(vec![0u8; 7].content_size(), 7);
        assert_eq!("i have changed!".content_size(), 15);
        assert_eq!(String::new().content_size(), 0);
        assert_eq!(Bytes::from_static(b"abc").content_size(), 3);
        assert_eq!(Box::new(String::from("ab")).content_size(), 2);
    }

    #[test]
    fn file_handle_behaves_like_io() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"twelve bytes").unwrap();
        tmp.flush().unwrap();

        let handle = ContentHandle::open(tmp.path()).unwrap();
        assert!(handle.behaves_like_io());
        assert_eq!(handle.content_size(), 12);
    }

    #[test]
    fn tempfile_handle_behaves_like_io() {
        let tmp = tempfile::tempfile().unwrap();
        let handle = ContentHandle::from_file(tmp).unwrap();
        assert!(handle.behaves_like_io());
        assert_eq!(handle.content_size(), 0);
    }

    #[test]
    fn cursor_behaves_like_io() {
        let handle = ContentHandle::from_seekable(Cursor::new(b"foo".to_vec())).unwrap();
        assert!(handle.behaves_like_io());
        assert_eq!(handle.content_size(), 3);
    }

    #[test]
    fn seekable_measures_from_current_position() {
        let mut cursor = Cursor::new(b"0123456789".to_vec());
        cursor.set_position(4);
        let handle = ContentHandle::from_seekable(cursor).unwrap();
        assert_eq!(handle.content_size(), 6);

        let mut out = String::new();
        handle.into_reader().read_to_string(&mut out).unwrap();
        assert_eq!(out, "456789");
    }

    #[test]
    fn in_memory_content_is_not_io() {
        let handle = ContentHandle::from("hi there");
        assert!(!handle.behaves_like_io());
        assert_eq!(handle.as_bytes(), Some(&b"hi there"[..]));
        assert_eq!(handle.content_size(), 8);
    }

    #[test]
    fn bytes_into_reader() {
        let mut out = Vec::new();
        ContentHandle::from(vec![1u8, 2, 3])
            .into_reader()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn debug_hides_payload() {
        assert_eq!(format!("{:?}", ContentHandle::from("abc")), "Bytes(3)");
        let stream = ContentHandle::from_reader(Cursor::new(Vec::<u8>::new()), 42);
        assert_eq!(format!("{stream:?}"), "Stream { len: 42 }");
    }
}
