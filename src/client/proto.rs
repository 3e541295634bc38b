//! RouterOS API wire codec.
//!
//! A sentence is a sequence of length-prefixed words terminated by an empty
//! word. Lengths use a 1 to 5 byte variable encoding where the high bits of
//! the first byte select the width.

use std::collections::BTreeMap;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::client::ClientError;

/// Largest single word accepted from a device (16 MiB).
pub const MAX_WORD_LEN: usize = 16 * 1024 * 1024;

/// Append the encoded length prefix for a word of `len` bytes.
pub fn encode_length(len: usize, out: &mut Vec<u8>) {
    let len = len as u32;
    if len < 0x80 {
        out.push(len as u8);
    } else if len < 0x4000 {
        out.extend_from_slice(&(len | 0x8000).to_be_bytes()[2..]);
    } else if len < 0x20_0000 {
        out.extend_from_slice(&(len | 0xC0_0000).to_be_bytes()[1..]);
    } else if len < 0x1000_0000 {
        out.extend_from_slice(&(len | 0xE000_0000).to_be_bytes());
    } else {
        out.push(0xF0);
        out.extend_from_slice(&len.to_be_bytes());
    }
}

/// Encode a full sentence, including the terminating empty word.
pub fn encode_sentence<S: AsRef<str>>(words: &[S]) -> Vec<u8> {
    let mut out = Vec::new();
    for word in words {
        let bytes = word.as_ref().as_bytes();
        encode_length(bytes.len(), &mut out);
        out.extend_from_slice(bytes);
    }
    out.push(0);
    out
}

/// Write one sentence and flush the stream.
pub async fn write_sentence<W, S>(writer: &mut W, words: &[S]) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin + ?Sized,
    S: AsRef<str>,
{
    writer.write_all(&encode_sentence(words)).await?;
    writer.flush().await?;
    Ok(())
}

async fn read_length<R>(reader: &mut R) -> Result<usize, ClientError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let first = reader.read_u8().await?;
    let (extra, initial) = match first {
        b if b & 0x80 == 0x00 => (0, u32::from(b)),
        b if b & 0xC0 == 0x80 => (1, u32::from(b & 0x3F)),
        b if b & 0xE0 == 0xC0 => (2, u32::from(b & 0x1F)),
        b if b & 0xF0 == 0xE0 => (3, u32::from(b & 0x0F)),
        0xF0 => (4, 0),
        b => {
            return Err(ClientError::Protocol(format!(
                "unsupported control byte 0x{b:02x}"
            )));
        }
    };

    let mut len = initial;
    for _ in 0..extra {
        len = (len << 8) | u32::from(reader.read_u8().await?);
    }
    Ok(len as usize)
}

/// Read one sentence. Returns the words without the terminator.
pub async fn read_sentence<R>(reader: &mut R) -> Result<Vec<String>, ClientError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut words = Vec::new();
    loop {
        let len = read_length(reader).await?;
        if len == 0 {
            return Ok(words);
        }
        if len > MAX_WORD_LEN {
            return Err(ClientError::Protocol(format!(
                "word of {len} bytes exceeds limit"
            )));
        }
        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;
        // Comments may carry legacy code page bytes.
        words.push(String::from_utf8_lossy(&buf).into_owned());
    }
}

/// One row of attributes returned by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    /// Build a row from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Attribute value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Attribute value by key, or an empty string.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert attribute words (`=key=value`, `.tag=value`) into a row.
    ///
    /// Words that carry no attribute are ignored.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        let mut row = Self::default();
        for word in words {
            let word = word.as_ref();
            if let Some(attr) = word.strip_prefix('=') {
                match attr.split_once('=') {
                    Some((key, value)) => row.insert(key, value),
                    None => row.insert(attr, ""),
                }
            } else if word.starts_with('.') {
                if let Some((key, value)) = word.split_once('=') {
                    row.insert(key, value);
                }
            }
        }
        row
    }
}

/// A classified reply sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `!re`: one data row.
    Data(Row),
    /// `!done`: end of the reply, possibly with attributes such as `ret`.
    Done(Row),
    /// `!trap`: the command failed; a `!done` follows.
    Trap(Row),
    /// `!fatal`: the device is closing the connection.
    Fatal(String),
    /// `!empty`: no rows (RouterOS 7.18+); a `!done` follows.
    Empty,
}

impl Reply {
    /// Classify a sentence read from the wire.
    pub fn parse(words: &[String]) -> Result<Self, ClientError> {
        let (kind, rest) = words
            .split_first()
            .ok_or_else(|| ClientError::Protocol("empty reply sentence".to_string()))?;

        match kind.as_str() {
            "!re" => Ok(Self::Data(Row::from_words(rest))),
            "!done" => Ok(Self::Done(Row::from_words(rest))),
            "!trap" => Ok(Self::Trap(Row::from_words(rest))),
            "!empty" => Ok(Self::Empty),
            "!fatal" => Ok(Self::Fatal(rest.join(" "))),
            other => Err(ClientError::Protocol(format!(
                "unexpected reply word '{other}'"
            ))),
        }
    }
}

/// Full reply to one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Data rows, in the order the device sent them.
    pub rows: Vec<Row>,
    /// Attributes attached to `!done`.
    pub done: Row,
}

impl Response {
    /// Value of `=ret=` on `!done` (e.g. the result of `=count-only=`).
    pub fn ret(&self) -> Option<&str> {
        self.done.get("ret")
    }

    /// Parse `=ret=` as a count.
    pub fn count(&self) -> Result<u64, ClientError> {
        let ret = self
            .ret()
            .ok_or_else(|| ClientError::Parse("reply has no count".to_string()))?;
        ret.parse()
            .map_err(|_| ClientError::Parse(format!("invalid count '{ret}'")))
    }
}
