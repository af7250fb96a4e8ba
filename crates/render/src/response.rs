//! Delivery of rendered output to a client.
//!
//! This is not an HTTP implementation: it supplies the header set a browser
//! needs to display or download the file, and can write a CGI-style response
//! (header block, blank line, body) to any [`Write`].

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    content_type: String,
    filename: Option<String>,
    inline: bool,
    extra: Vec<(String, String)>,
}
impl Response {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            filename: None,
            inline: false,
            extra: Vec::new(),
        }
    }

    /// Offers the file under this name. Without `inline`, browsers download it.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Forces inline display even when a filename is given.
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// Adds a header after the standard ones.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// The full header set for a body of `length` bytes, in sending order.
    pub fn headers(&self, length: u64) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Pragma".to_string(), "public".to_string()),
            ("Expires".to_string(), "0".to_string()),
            ("Cache-Control".to_string(), "must-revalidate, post-check=0, pre-check=0".to_string()),
            ("Content-Type".to_string(), self.content_type.clone()),
            ("Content-Transfer-Encoding".to_string(), "binary".to_string()),
            ("Content-Length".to_string(), length.to_string()),
        ];
        if let Some(disposition) = self.disposition() {
            headers.push(("Content-Disposition".to_string(), disposition));
        }
        headers.extend(self.extra.iter().cloned());
        headers
    }

    fn disposition(&self) -> Option<String> {
        let kind = match self.inline {
            true => "inline",
            false => "attachment",
        };
        match (&self.filename, self.inline) {
            (Some(name), _) => Some(format!("{kind}; filename=\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))),
            (None, true) => Some(kind.to_string()),
            (None, false) => None,
        }
    }

    /// Writes the header block and the contents of `path` to `writer`.
    /// Returns the number of body bytes written.
    pub fn send(&self, path: &Path, writer: &mut impl Write) -> Result<u64> {
        let mut file = File::open(path).or_raise(|| ErrorKind::Send)?;
        let length = file.metadata().or_raise(|| ErrorKind::Send)?.len();
        for (name, value) in self.headers(length) {
            write!(writer, "{name}: {value}\r\n").or_raise(|| ErrorKind::Send)?;
        }
        writer.write_all(b"\r\n").or_raise(|| ErrorKind::Send)?;
        let written = io::copy(&mut file, &mut *writer).or_raise(|| ErrorKind::Send)?;
        writer.flush().or_raise(|| ErrorKind::Send)?;
        Ok(written)
    }
}
