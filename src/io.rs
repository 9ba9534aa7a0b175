//! Reading and writing the line-oriented tagged format.
//!
//! Every line is `<level> [@xref@] <TAG> [value]`. Reading happens in two
//! passes: the text is first split into a flat list of lines, which are then
//! attached to their parents by level. Level 0 lines start records, except
//! `HEAD` (the header) and `TRLR` (end of data).
//!
//! Text is decoded according to its byte order mark. Files without one are
//! UTF-8 when the header says so and are otherwise decoded through the
//! configured legacy code page.

use std::fmt::Write as _;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::enums::{CharacterSet, TagEnum};
use crate::error::{GedcomError, Result};
use crate::record::{Record, RecordType};
use crate::structure::{change_date_node, parse_change_date};
use crate::tag::{skip_when_empty, TagFactory, TagNode, POINTER_TAGS};
use crate::tree::Document;
use crate::utils::{clean_xref, enclose_xref, extract_xref};

/// Longest value written on one line before it continues with `CONC`.
pub const MAX_LINE_VALUE: usize = 248;
pub const DEFAULT_ENCODING: &str = "windows-1251";

lazy_static! {
    static ref LINE: Regex = Regex::new(r"^\s*(\d+)\s+(?:(@\S*)\s+)?(\S+)(?: (.*))?$").unwrap();
    static ref CHAR_LINE: Regex = Regex::new(r"(?m)^\s*1\s+CHAR\s+(\S+)").unwrap();
}

/// Tags whose single-token value must be a well-formed pointer when it starts with `@`.
const POINTER_VALUED: &[&str] = &["NOTE", "SOUR", "OBJE"];

/// How forgiving the reader is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Malformed or unterminated `@xref@` tokens are errors. When off they
    /// are taken as written.
    pub strict_xrefs: bool,
    /// Lines without a level, as FamilyTreeBuilder writes them, continue the
    /// note they follow or become a note of the current record.
    pub repair_stray_lines: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { strict_xrefs: true, repair_stray_lines: true }
    }
}

impl ReadOptions {
    pub fn lenient() -> Self {
        Self { strict_xrefs: false, ..Self::default() }
    }
}

// ------------- Decoding -------------

/// Decodes raw file bytes to text, returning the name of the encoding used.
pub fn decode(bytes: &[u8], default_encoding: &str) -> (String, &'static str) {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return (String::from_utf8_lossy(rest).into_owned(), "UTF-8");
    }
    if let Some(rest) = bytes.strip_prefix(&[0x00, 0x00, 0xFE, 0xFF]) {
        return (decode_utf32(rest, u32::from_be_bytes), "UTF-32BE");
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE, 0x00, 0x00]) {
        return (decode_utf32(rest, u32::from_le_bytes), "UTF-32LE");
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let (text, _) = UTF_16BE.decode_without_bom_handling(rest);
        return (text.into_owned(), UTF_16BE.name());
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let (text, _) = UTF_16LE.decode_without_bom_handling(rest);
        return (text.into_owned(), UTF_16LE.name());
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(4096)]);
    let declared = CHAR_LINE
        .captures(&head)
        .map_or(CharacterSet::Ascii, |c| CharacterSet::from_tag(&c[1]));
    if declared.is_utf8() {
        return (String::from_utf8_lossy(bytes).into_owned(), "UTF-8");
    }
    match Encoding::for_label(default_encoding.as_bytes()) {
        Some(encoding) => {
            let (text, _) = encoding.decode_without_bom_handling(bytes);
            (text.into_owned(), encoding.name())
        }
        None => {
            warn!(label = %default_encoding, "unknown default encoding, reading as UTF-8");
            (String::from_utf8_lossy(bytes).into_owned(), "UTF-8")
        }
    }
}

fn decode_utf32(bytes: &[u8], to_u32: fn([u8; 4]) -> u32) -> String {
    bytes
        .chunks_exact(4)
        .map(|c| {
            let unit = to_u32([c[0], c[1], c[2], c[3]]);
            char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}

// ------------- Parsing -------------

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: usize,
    pub level: usize,
    pub xref: Option<String>,
    pub tag: String,
    pub value: String,
}

/// Splits text into lines, skipping blank ones. Every line must carry a
/// level and well-formed pointers.
pub fn parse_lines(text: &str) -> Result<Vec<Line>> {
    parse_lines_with(text, &ReadOptions { strict_xrefs: true, repair_stray_lines: false })
}

pub fn parse_lines_with(text: &str, options: &ReadOptions) -> Result<Vec<Line>> {
    let mut lines: Vec<Line> = Vec::new();
    // level of the note that a stray line continues
    let mut note_level: Option<usize> = None;
    let mut in_record = false;
    // stray lines turned into notes, placed where the current sub-tree ends
    let mut pending: Vec<Line> = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let raw = raw.trim_start_matches('\u{feff}');
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if options.repair_stray_lines && !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            let value = trimmed.to_string();
            match note_level {
                Some(level) => lines.push(Line { number, level: level + 1, xref: None, tag: "CONT".to_string(), value }),
                None if in_record => pending.push(Line { number, level: 1, xref: None, tag: "NOTE".to_string(), value }),
                None => warn!(line = number, "stray line outside a record dropped"),
            }
            continue;
        }
        let line = parse_line(raw, number, options.strict_xrefs)?;
        if line.level <= 1 {
            lines.append(&mut pending);
        }
        note_level = match line.tag.as_str() {
            "NOTE" => Some(line.level),
            "CONT" | "CONC" if note_level.is_some_and(|l| l + 1 == line.level) => note_level,
            _ => None,
        };
        if line.level == 0 {
            in_record = !matches!(line.tag.as_str(), "HEAD" | "TRLR");
        }
        lines.push(line);
    }
    lines.append(&mut pending);
    Ok(lines)
}

fn parse_line(raw: &str, number: usize, strict_xrefs: bool) -> Result<Line> {
    let captures = LINE
        .captures(raw)
        .ok_or_else(|| GedcomError::malformed(format!("unparseable line '{}'", raw), number))?;
    let level = captures[1]
        .parse()
        .map_err(|_| GedcomError::malformed("level out of range", number))?;
    let xref = match captures.get(2) {
        Some(token) => Some(read_xref(token.as_str(), strict_xrefs, number)?),
        None => None,
    };
    let tag = captures[3].to_string();
    if strict_xrefs && tag.starts_with('@') {
        return Err(xref_error(number, &format!("'{}' is not followed by a tag", tag)));
    }
    let value = captures.get(4).map_or(String::new(), |m| m.as_str().to_string());
    if strict_xrefs && holds_pointer(&tag, &value) {
        read_xref(value.trim(), true, number)?;
    }
    Ok(Line { number, level, xref, tag, value })
}

/// Reads an `@xref@` token; lenient reading keeps whatever is between the delimiters.
fn read_xref(token: &str, strict: bool, number: usize) -> Result<String> {
    let fallback = clean_xref(token);
    let (xref, rest) = extract_xref(token, strict, fallback).map_err(|e| match e {
        GedcomError::MalformedXRef(message) => xref_error(number, &message),
        other => other,
    })?;
    if strict && (xref.is_empty() || !rest.is_empty()) {
        return Err(xref_error(number, &format!("malformed pointer '{}'", token)));
    }
    Ok(xref)
}

fn xref_error(number: usize, message: &str) -> GedcomError {
    GedcomError::MalformedXRef(format!("line {}: {}", number, message))
}

fn holds_pointer(tag: &str, value: &str) -> bool {
    let value = value.trim();
    if !value.starts_with('@') || value.starts_with("@#") || value.starts_with("@@") {
        return false;
    }
    POINTER_TAGS.contains(&tag) || (POINTER_VALUED.contains(&tag) && !value.contains(char::is_whitespace))
}

/// Attaches the lines starting at `pos` with the given level to `parent`.
fn attach(factory: &TagFactory, parent: &mut TagNode, lines: &[Line], pos: &mut usize, level: usize) -> Result<()> {
    while let Some(line) = lines.get(*pos) {
        if line.level < level {
            return Ok(());
        }
        if line.level > level {
            return Err(GedcomError::malformed(
                format!("level jumps from {} to {}", level - 1, line.level),
                line.number,
            ));
        }
        *pos += 1;
        let child = parent.add_tag(factory, &line.tag, &line.value);
        attach(factory, child, lines, pos, level + 1)?;
    }
    Ok(())
}

/// Moves `_UID` and `CHAN` from the children into the record fields. A
/// `CHAN` that would not be written back the same way stays where it is.
fn lift_identity(record: &mut Record) {
    let uid = record.node().tag_string("_UID").to_string();
    if !uid.is_empty() {
        record.set_uid(&uid);
        record.node_mut().delete_tag("_UID");
    }
    let Some(chan) = record.node().find_tag("CHAN", 0) else {
        return;
    };
    let stamp = parse_change_date(chan)
        .filter(|stamp| node_to_string(chan, 1) == node_to_string(&change_date_node(record.owner(), *stamp), 1));
    match stamp {
        Some(stamp) => record.set_change_date(Some(stamp)),
        None => debug!(xref = %record.xref(), "change date kept verbatim"),
    }
}

impl Document {
    /// Replaces the content of this document with the given text. On error
    /// the document is left as it was.
    pub fn load_from_str(&mut self, text: &str) -> Result<()> {
        self.load_from_str_with(text, &ReadOptions::default())
    }
    pub fn load_from_str_with(&mut self, text: &str, options: &ReadOptions) -> Result<()> {
        let started = Instant::now();
        let lines = parse_lines_with(text, options)?;
        let mut loaded = self.blank();
        loaded.read_lines(&lines)?;
        *self = loaded;
        let elapsed_ms_f64 = started.elapsed().as_secs_f64() * 1000.0;
        info!(ms = elapsed_ms_f64, lines = lines.len(), records = self.len(), "document loaded");
        Ok(())
    }
    fn read_lines(&mut self, lines: &[Line]) -> Result<()> {
        let factory = self.factory().clone();
        let mut pos = 0;
        while let Some(line) = lines.get(pos) {
            if line.level != 0 {
                return Err(GedcomError::malformed("record does not start at level 0", line.number));
            }
            pos += 1;
            match line.tag.as_str() {
                "TRLR" => break,
                "HEAD" => {
                    let header = self.header_mut();
                    header.clear();
                    attach(&factory, header, lines, &mut pos, 1)?;
                }
                tag => {
                    let record_type = RecordType::from_tag(tag);
                    let xref = line.xref.as_deref().unwrap_or("");
                    let mut record = Record::with_tag(Some(self.id()), record_type, tag, xref);
                    record.node_mut().set_value(&line.value);
                    attach(&factory, record.node_mut(), lines, &mut pos, 1)?;
                    lift_identity(&mut record);
                    if let Err(e) = self.add_record(record) {
                        return Err(GedcomError::malformed(e.to_string(), line.number));
                    }
                }
            }
        }
        Ok(())
    }
    pub fn load_from_bytes(&mut self, bytes: &[u8], default_encoding: &str) -> Result<()> {
        let (text, encoding) = decode(bytes, default_encoding);
        debug!(encoding, bytes = bytes.len(), "document decoded");
        self.load_from_str(&text)
    }
    pub fn load<R: Read>(&mut self, mut reader: R, default_encoding: &str) -> Result<()> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.load_from_bytes(&bytes, default_encoding)
    }
    pub fn load_file(&mut self, path: impl AsRef<Path>, default_encoding: &str, options: &ReadOptions) -> Result<()> {
        let bytes = fs::read(path.as_ref())?;
        info!(path = %path.as_ref().display(), "loading document");
        let (text, encoding) = decode(&bytes, default_encoding);
        debug!(encoding, bytes = bytes.len(), "document decoded");
        self.load_from_str_with(&text, options)
    }
    /// A new document read from text.
    pub fn parse_str(text: &str) -> Result<Document> {
        let mut document = Document::new();
        document.load_from_str(text)?;
        Ok(document)
    }
    /// Like [`Document::parse_str`], taking malformed pointers as written.
    pub fn parse_str_lenient(text: &str) -> Result<Document> {
        let mut document = Document::new();
        document.load_from_str_with(text, &ReadOptions::lenient())?;
        Ok(document)
    }

    /// The character set declared in the header.
    pub fn charset(&self) -> CharacterSet {
        match self.header().find_tag("CHAR", 0) {
            Some(node) => CharacterSet::from_tag(node.value()),
            None => CharacterSet::Utf8,
        }
    }
    pub fn to_gedcom_string(&self) -> String {
        GedcomWriter::default().write_document(self)
    }
    /// Writes the document, encoding it for the declared character set.
    pub fn save<W: Write>(&self, writer: W, default_encoding: &str) -> Result<()> {
        self.save_with(writer, default_encoding, &GedcomWriter::default())
    }
    pub fn save_with<W: Write>(&self, mut writer: W, default_encoding: &str, gedcom: &GedcomWriter) -> Result<()> {
        let started = Instant::now();
        let text = gedcom.write_document(self);
        let bytes = match self.charset() {
            CharacterSet::Ascii | CharacterSet::Ansel => match Encoding::for_label(default_encoding.as_bytes()) {
                Some(encoding) => encoding.encode(&text).0.into_owned(),
                None => {
                    warn!(label = %default_encoding, "unknown default encoding, writing UTF-8");
                    text.into_bytes()
                }
            },
            _ => text.into_bytes(),
        };
        writer.write_all(&bytes)?;
        writer.flush()?;
        let elapsed_ms_f64 = started.elapsed().as_secs_f64() * 1000.0;
        info!(ms = elapsed_ms_f64, bytes = bytes.len(), records = self.len(), "document saved");
        Ok(())
    }
    pub fn save_file(&self, path: impl AsRef<Path>, default_encoding: &str, gedcom: &GedcomWriter) -> Result<()> {
        let file = fs::File::create(path.as_ref())?;
        info!(path = %path.as_ref().display(), "saving document");
        self.save_with(std::io::BufWriter::new(file), default_encoding, gedcom)
    }
}

// ------------- Writing -------------

/// Serializes nodes and records into lines terminated by CRLF.
#[derive(Debug, Clone, Copy)]
pub struct GedcomWriter {
    line_width: usize,
}

impl Default for GedcomWriter {
    fn default() -> Self {
        Self { line_width: MAX_LINE_VALUE }
    }
}

impl GedcomWriter {
    pub fn new(line_width: usize) -> Self {
        Self { line_width: line_width.max(1) }
    }
    fn write_line(&self, out: &mut String, level: usize, xref: Option<&str>, tag: &str, value: &str) {
        let _ = write!(out, "{}", level);
        if let Some(xref) = xref.filter(|x| !x.is_empty()) {
            let _ = write!(out, " {}", enclose_xref(xref));
        }
        let _ = write!(out, " {}", tag);
        if !value.is_empty() {
            let _ = write!(out, " {}", value);
        }
        out.push_str("\r\n");
    }
    /// Writes one value line, continuing it with `CONT` at newlines and
    /// `CONC` where a piece is too long.
    fn write_value(&self, out: &mut String, level: usize, xref: Option<&str>, tag: &str, value: &str) {
        for (i, piece) in value.split('\n').enumerate() {
            let piece = piece.strip_suffix('\r').unwrap_or(piece);
            let chars: Vec<char> = piece.chars().collect();
            let mut chunks = chars.chunks(self.line_width).map(|c| c.iter().collect::<String>());
            let first = chunks.next().unwrap_or_default();
            if i == 0 {
                self.write_line(out, level, xref, tag, &first);
            } else {
                self.write_line(out, level + 1, None, "CONT", &first);
            }
            for chunk in chunks {
                self.write_line(out, level + 1, None, "CONC", &chunk);
            }
        }
    }
    pub fn write_node(&self, out: &mut String, node: &TagNode, level: usize) {
        self.write_value(out, level, None, node.name(), node.value());
        self.write_children(out, node, level + 1);
    }
    fn write_children(&self, out: &mut String, node: &TagNode, level: usize) {
        for child in node.visible_children() {
            if skip_when_empty(child.name()) && child.is_empty() {
                continue;
            }
            self.write_node(out, child, level);
        }
    }
    pub fn write_record(&self, out: &mut String, record: &Record) {
        let node = record.node();
        self.write_value(out, 0, Some(record.xref()), node.name(), node.value());
        self.write_children(out, node, 1);
        if !record.uid().is_empty() {
            self.write_line(out, 1, None, "_UID", record.uid());
        }
        if let Some(stamp) = record.change_date() {
            self.write_node(out, &change_date_node(record.owner(), stamp), 1);
        }
    }
    pub fn write_document(&self, document: &Document) -> String {
        let mut out = String::new();
        self.write_node(&mut out, document.header(), 0);
        for record in document.records() {
            self.write_record(&mut out, record);
        }
        self.write_line(&mut out, 0, None, "TRLR", "");
        out
    }
}

/// Serializes a detached node tree starting at `level`.
pub fn node_to_string(node: &TagNode, level: usize) -> String {
    let mut out = String::new();
    GedcomWriter::default().write_node(&mut out, node, level);
    out
}

pub fn record_to_string(record: &Record) -> String {
    let mut out = String::new();
    GedcomWriter::default().write_record(&mut out, record);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_with_xref_and_value() {
        let lines = parse_lines("0 @I1@ INDI\r\n1 NAME Ivan /Dub/\r\n2 GIVN  Ivan").expect("lines");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].xref.as_deref(), Some("I1"));
        assert_eq!(lines[1].value, "Ivan /Dub/");
        assert_eq!(lines[2].value, " Ivan");
    }

    #[test]
    fn long_values_continue() {
        let writer = GedcomWriter::new(4);
        let mut out = String::new();
        writer.write_value(&mut out, 1, None, "NOTE", "abcdefg\nxy");
        assert_eq!(out, "1 NOTE abcd\r\n2 CONC efg\r\n2 CONT xy\r\n");
    }
}
