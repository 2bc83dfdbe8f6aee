//! file values for multipart requests

use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{self, Read};
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// a file variable
///
/// serializes as `null` in the `operations` part; the content travels as
/// its own multipart part.
#[derive(Clone)]
pub struct Upload {
    file_name: String,
    source: UploadSource,
}

/// where an upload's content comes from
#[derive(Clone)]
pub enum UploadSource {
    Bytes(Arc<[u8]>),
    Path(PathBuf),
    Reader(SharedReader),
}

/// a reader consumed on first use; clones share the buffered content
#[derive(Clone)]
pub struct SharedReader(Arc<Mutex<ReaderState>>);

enum ReaderState {
    Pending(Box<dyn Read + Send>),
    Buffered(Arc<[u8]>),
    Failed(String),
}

impl SharedReader {
    fn new(reader: Box<dyn Read + Send>) -> Self {
        Self(Arc::new(Mutex::new(ReaderState::Pending(reader))))
    }

    /// drain the reader on a blocking thread the first time, then serve the
    /// buffered bytes
    async fn read(&self) -> io::Result<Arc<[u8]>> {
        let mut state = self.0.lock().await;
        // stays in place if this future is dropped mid-read
        let interrupted = ReaderState::Failed("upload read was interrupted".to_string());
        let previous = mem::replace(&mut *state, interrupted);
        let result: Result<Arc<[u8]>, String> = match previous {
            ReaderState::Buffered(bytes) => Ok(bytes),
            ReaderState::Failed(message) => Err(message),
            ReaderState::Pending(mut reader) => tokio::task::spawn_blocking(move || {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).map(|_| buf)
            })
            .await
            .map_err(|err| err.to_string())
            .and_then(|read| read.map_err(|err| err.to_string()))
            .map(Arc::from),
        };
        match result {
            Ok(bytes) => {
                *state = ReaderState::Buffered(bytes.clone());
                Ok(bytes)
            }
            Err(message) => {
                *state = ReaderState::Failed(message.clone());
                Err(io::Error::other(message))
            }
        }
    }
}

impl Upload {
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            source: UploadSource::Bytes(bytes.into().into()),
        }
    }

    pub fn from_path(file_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            source: UploadSource::Path(path.into()),
        }
    }

    pub fn from_reader(file_name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            file_name: file_name.into(),
            source: UploadSource::Reader(SharedReader::new(Box::new(reader))),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source(&self) -> &UploadSource {
        &self.source
    }

    /// buffer the whole content in memory
    pub async fn read_content(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            UploadSource::Bytes(bytes) => Ok(bytes.to_vec()),
            UploadSource::Path(path) => tokio::fs::read(path).await,
            UploadSource::Reader(reader) => Ok(reader.read().await?.to_vec()),
        }
    }
}

impl Serialize for Upload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_none()
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            UploadSource::Bytes(bytes) => format!("{} bytes", bytes.len()),
            UploadSource::Path(path) => path.display().to_string(),
            UploadSource::Reader(_) => "<reader>".to_string(),
        };
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("source", &source)
            .finish()
    }
}

const SNIFF_LEN: usize = 512;

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b\x08", "application/x-gzip"),
    (b"<?xml", "text/xml; charset=utf-8"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"BM", "image/bmp"),
];

/// guess a content type from the first bytes of a file
pub fn sniff_content_type(content: &[u8]) -> mime::Mime {
    let head = &content[..content.len().min(SNIFF_LEN)];

    if head.len() >= 14 && &head[..4] == b"RIFF" && &head[8..14] == b"WEBPVP" {
        return parse_mime("image/webp");
    }

    if let Some((_, ty)) = SIGNATURES.iter().find(|(sig, _)| head.starts_with(sig)) {
        return parse_mime(ty);
    }

    let trimmed = trim_leading_whitespace(head);
    if starts_with_ignore_case(trimmed, b"<!doctype html") || starts_with_ignore_case(trimmed, b"<html") {
        return mime::TEXT_HTML_UTF_8;
    }

    if head.iter().any(|b| is_binary_byte(*b)) {
        mime::APPLICATION_OCTET_STREAM
    } else {
        mime::TEXT_PLAIN_UTF_8
    }
}

fn parse_mime(ty: &str) -> mime::Mime {
    ty.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn starts_with_ignore_case(bytes: &[u8], prefix: &[u8]) -> bool {
    bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix)
}
