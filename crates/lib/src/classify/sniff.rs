//! Content-type sniffing on a file's leading bytes.
//!
//! A small subset of the WHATWG MIME sniffing algorithm: enough to tell
//! plain text (scripts, configs) apart from compiled images and other
//! binary formats.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Number of leading bytes inspected by [`is_binary`].
pub const SNIFF_LEN: usize = 32;

/// Coarse content classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
  PlainText,
  Html,
  Xml,
  Pdf,
  PostScript,
  Image,
  Archive,
  Wasm,
  Binary,
}

impl ContentKind {
  pub fn mime(&self) -> &'static str {
    match self {
      Self::PlainText => "text/plain",
      Self::Html => "text/html",
      Self::Xml => "text/xml",
      Self::Pdf => "application/pdf",
      Self::PostScript => "application/postscript",
      Self::Image => "image/*",
      Self::Archive => "application/zip",
      Self::Wasm => "application/wasm",
      Self::Binary => "application/octet-stream",
    }
  }
}

const HTML_TAGS: &[&[u8]] = &[
  b"<!DOCTYPE HTML",
  b"<HTML",
  b"<HEAD",
  b"<SCRIPT",
  b"<IFRAME",
  b"<H1",
  b"<DIV",
  b"<FONT",
  b"<TABLE",
  b"<A",
  b"<STYLE",
  b"<TITLE",
  b"<B",
  b"<BODY",
  b"<BR",
  b"<P",
  b"<!--",
];

const EXACT: &[(&[u8], ContentKind)] = &[
  (b"%PDF-", ContentKind::Pdf),
  (b"%!PS-Adobe-", ContentKind::PostScript),
  (b"GIF87a", ContentKind::Image),
  (b"GIF89a", ContentKind::Image),
  (b"\x89PNG\r\n\x1a\n", ContentKind::Image),
  (b"\xff\xd8\xff", ContentKind::Image),
  (b"BM", ContentKind::Image),
  (b"PK\x03\x04", ContentKind::Archive),
  (b"\x1f\x8b\x08", ContentKind::Archive),
  (b"Rar!\x1a\x07", ContentKind::Archive),
  (b"\x00asm", ContentKind::Wasm),
];

const TEXT_BOMS: &[&[u8]] = &[b"\xfe\xff", b"\xff\xfe", b"\xef\xbb\xbf"];

fn is_ws(b: u8) -> bool {
  matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

fn is_binary_byte(b: u8) -> bool {
  matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

fn has_html_tag(data: &[u8]) -> bool {
  HTML_TAGS.iter().any(|tag| {
    data.len() > tag.len()
      && data[..tag.len()].eq_ignore_ascii_case(tag)
      && matches!(data[tag.len()], b' ' | b'>')
  })
}

/// Classify `data` by its leading bytes.
pub fn sniff(data: &[u8]) -> ContentKind {
  let start = data.iter().position(|b| !is_ws(*b)).unwrap_or(data.len());
  let trimmed = &data[start..];

  if has_html_tag(trimmed) {
    return ContentKind::Html;
  }
  if trimmed.starts_with(b"<?xml") {
    return ContentKind::Xml;
  }
  if TEXT_BOMS.iter().any(|bom| data.starts_with(bom)) {
    return ContentKind::PlainText;
  }
  if let Some((_, kind)) = EXACT.iter().find(|(sig, _)| data.starts_with(sig)) {
    return *kind;
  }
  if data.iter().any(|b| is_binary_byte(*b)) {
    ContentKind::Binary
  } else {
    ContentKind::PlainText
  }
}

/// Whether the file at `path` looks like non-text content.
///
/// Reads at most [`SNIFF_LEN`] bytes. Empty or unreadable files are not binary.
pub fn is_binary(path: &Path) -> bool {
  let Ok(file) = File::open(path) else {
    return false;
  };
  let mut buf = [0u8; SNIFF_LEN];
  let mut filled = 0;
  let mut reader = file.take(SNIFF_LEN as u64);
  loop {
    match reader.read(&mut buf[filled..]) {
      Ok(0) => break,
      Ok(n) => filled += n,
      Err(e) if e.kind() == ErrorKind::Interrupted => continue,
      Err(_) => return false,
    }
  }
  filled > 0 && sniff(&buf[..filled]) != ContentKind::PlainText
}
