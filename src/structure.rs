//! Typed views over the sub-structures that records are built from.
//!
//! Each view is an owned value read out of a [`TagNode`] and, where it is
//! edited in place, written back with `apply`. Applying only touches the tags
//! the view knows about; anything else below the node is left as it was.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::date::{DateExact, DateValue, TimeValue};
use crate::enums::{MediaType, MultimediaFormat, NameType, TagEnum};
use crate::tag::{DocumentId, TagFactory, TagKind, TagNode};
use crate::utils::{enclose_xref, multimedia_link_uid};

// ------------- PersonalName -------------

/// The pieces of a name in the order they are written.
pub const NAME_PIECES: [&str; 10] = [
    "SURN", "GIVN", "_PATN", "NPFX", "NICK", "SPFX", "NSFX", "_MARN", "_RELN", "_CENN",
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersonalName {
    pub first_part: String,
    pub surname: String,
    pub last_part: String,
    pub name_type: NameType,
    /// Values for [`NAME_PIECES`], empty when absent.
    pub pieces: [String; 10],
}

impl PersonalName {
    pub fn new(first_part: &str, surname: &str, last_part: &str) -> Self {
        Self {
            first_part: first_part.trim().to_string(),
            surname: surname.trim().to_string(),
            last_part: last_part.trim().to_string(),
            ..Self::default()
        }
    }
    /// Splits `first /surname/ last`; without slashes everything is the first part.
    pub fn parse_value(value: &str) -> (String, String, String) {
        let mut parts = value.splitn(3, '/');
        let first = parts.next().unwrap_or("").trim().to_string();
        let surname = parts.next().unwrap_or("").trim().to_string();
        let last = parts.next().unwrap_or("").trim().to_string();
        (first, surname, last)
    }
    pub fn read(node: &TagNode) -> Self {
        let (first_part, surname, last_part) = Self::parse_value(node.value());
        let mut pieces: [String; 10] = Default::default();
        for (slot, tag) in pieces.iter_mut().zip(NAME_PIECES) {
            *slot = node.tag_string(tag).to_string();
        }
        Self {
            first_part,
            surname,
            last_part,
            name_type: NameType::from_tag(node.tag_string("TYPE")),
            pieces,
        }
    }
    pub fn value(&self) -> String {
        let mut result = String::new();
        if !self.first_part.is_empty() {
            result.push_str(&self.first_part);
            result.push(' ');
        }
        if !self.surname.is_empty() || !self.last_part.is_empty() {
            result.push('/');
            result.push_str(&self.surname);
            result.push('/');
        }
        if !self.last_part.is_empty() {
            result.push(' ');
            result.push_str(&self.last_part);
        }
        result.trim_end().to_string()
    }
    pub fn full_name(&self) -> String {
        [&self.first_part, &self.surname, &self.last_part]
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
    /// `(surname, name, patronymic)`, the patronymic being the rest of the first part.
    pub fn name_parts(&self) -> (String, String, String) {
        let (name, patronymic) = match self.first_part.split_once(' ') {
            Some((name, rest)) => (name.to_string(), rest.trim().to_string()),
            None => (self.first_part.clone(), String::new()),
        };
        (self.surname.clone(), name, patronymic)
    }
    pub fn piece(&self, tag: &str) -> &str {
        NAME_PIECES
            .iter()
            .position(|t| *t == tag)
            .map_or("", |i| self.pieces[i].as_str())
    }
    pub fn set_piece(&mut self, tag: &str, value: &str) {
        if let Some(i) = NAME_PIECES.iter().position(|t| *t == tag) {
            self.pieces[i] = value.to_string();
        }
    }
    pub fn nickname(&self) -> &str {
        self.piece("NICK")
    }
    pub fn is_empty(&self) -> bool {
        self.first_part.is_empty()
            && self.surname.is_empty()
            && self.last_part.is_empty()
            && self.pieces.iter().all(String::is_empty)
    }
    /// Writes the value, the type and the pieces, in that order.
    pub fn apply(&self, factory: &TagFactory, node: &mut TagNode) {
        node.set_value(&self.value());
        node.delete_tag("TYPE");
        for tag in NAME_PIECES {
            node.delete_tag(tag);
        }
        if self.name_type != NameType::None {
            node.add_tag(factory, "TYPE", self.name_type.tag());
        }
        for (tag, piece) in NAME_PIECES.iter().zip(&self.pieces) {
            if !piece.is_empty() {
                node.add_tag(factory, tag, piece);
            }
        }
    }
}

// ------------- Address -------------

pub const ADDRESS_LINES: [&str; 7] = ["ADR1", "ADR2", "ADR3", "CITY", "STAE", "POST", "CTRY"];

/// An `ADDR` structure together with the contact lines that sit beside it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Address {
    /// The free-form address, one entry per line.
    pub lines: Vec<String>,
    /// Values for [`ADDRESS_LINES`], empty when absent.
    pub parts: [String; 7],
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub faxes: Vec<String>,
    pub web_pages: Vec<String>,
}

impl Address {
    /// Reads the address below `parent`, which is the node holding `ADDR`.
    pub fn read(parent: &TagNode) -> Self {
        let mut parts: [String; 7] = Default::default();
        let lines = match parent.find_tag("ADDR", 0) {
            Some(addr) => {
                for (slot, tag) in parts.iter_mut().zip(ADDRESS_LINES) {
                    *slot = addr.tag_string(tag).to_string();
                }
                if addr.value().is_empty() {
                    Vec::new()
                } else {
                    addr.value().split('\n').map(str::to_string).collect()
                }
            }
            None => Vec::new(),
        };
        Self {
            lines,
            parts,
            phones: parent.tag_strings("PHON"),
            emails: parent.tag_strings("EMAIL"),
            faxes: parent.tag_strings("FAX"),
            web_pages: parent.tag_strings("WWW"),
        }
    }
    pub fn part(&self, tag: &str) -> &str {
        ADDRESS_LINES
            .iter()
            .position(|t| *t == tag)
            .map_or("", |i| self.parts[i].as_str())
    }
    pub fn set_part(&mut self, tag: &str, value: &str) {
        if let Some(i) = ADDRESS_LINES.iter().position(|t| *t == tag) {
            self.parts[i] = value.to_string();
        }
    }
    pub fn city(&self) -> &str {
        self.part("CITY")
    }
    pub fn country(&self) -> &str {
        self.part("CTRY")
    }
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(String::is_empty)
            && self.parts.iter().all(String::is_empty)
            && self.phones.is_empty()
            && self.emails.is_empty()
            && self.faxes.is_empty()
            && self.web_pages.is_empty()
    }
    pub fn apply(&self, factory: &TagFactory, parent: &mut TagNode) {
        parent.delete_tag("ADDR");
        if !self.lines.is_empty() || self.parts.iter().any(|p| !p.is_empty()) {
            let addr = parent.add_tag(factory, "ADDR", &self.lines.join("\n"));
            for (tag, part) in ADDRESS_LINES.iter().zip(&self.parts) {
                if !part.is_empty() {
                    addr.add_tag(factory, tag, part);
                }
            }
        }
        fn as_refs(v: &[String]) -> Vec<&str> {
            v.iter().map(String::as_str).collect()
        }
        parent.set_tag_strings(factory, "PHON", &as_refs(&self.phones));
        parent.set_tag_strings(factory, "EMAIL", &as_refs(&self.emails));
        parent.set_tag_strings(factory, "FAX", &as_refs(&self.faxes));
        parent.set_tag_strings(factory, "WWW", &as_refs(&self.web_pages));
    }
}

// ------------- Events -------------

/// An individual or family event (or an individual attribute) as read from its node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    pub name: String,
    pub value: String,
    pub date: DateValue,
    pub place: String,
    pub event_type: String,
    pub age: String,
    pub cause: String,
    pub agency: String,
}

impl Event {
    pub fn read(node: &TagNode) -> Self {
        Self {
            name: node.name().to_string(),
            value: node.value().to_string(),
            date: DateValue::parse_lenient(node.tag_string("DATE")),
            place: node.tag_string("PLAC").to_string(),
            event_type: node.tag_string("TYPE").to_string(),
            age: node.tag_string("AGE").to_string(),
            cause: node.tag_string("CAUS").to_string(),
            agency: node.tag_string("AGNC").to_string(),
        }
    }
    pub fn apply(&self, factory: &TagFactory, node: &mut TagNode) {
        node.set_value(&self.value);
        let date = self.date.to_string();
        for (tag, value) in [
            ("TYPE", &self.event_type),
            ("DATE", &date),
            ("PLAC", &self.place),
            ("AGE", &self.age),
            ("CAUS", &self.cause),
            ("AGNC", &self.agency),
        ] {
            if value.is_empty() {
                node.delete_tag(tag);
            } else {
                node.set_tag_string(factory, tag, value);
            }
        }
    }
}

/// Date of an event; absent or unparseable dates are empty.
pub fn event_date(node: &TagNode) -> DateValue {
    DateValue::parse_lenient(node.tag_string("DATE"))
}

// ------------- Change date -------------

pub fn change_date_node(owner: Option<DocumentId>, stamp: NaiveDateTime) -> TagNode {
    let mut chan = TagNode::new(owner, TagKind::ChangeDate, "CHAN", "");
    let date = DateExact::from_naive_date(stamp.date()).to_string();
    let time = TimeValue::from_naive_time(stamp.time()).to_string();
    let date_node = chan.append_child(TagNode::new(owner, TagKind::Date, "DATE", &date));
    if !time.is_empty() {
        date_node.append_child(TagNode::new(owner, TagKind::Time, "TIME", &time));
    }
    chan
}

pub fn parse_change_date(chan: &TagNode) -> Option<NaiveDateTime> {
    let date_node = chan.find_tag("DATE", 0)?;
    let date: NaiveDate = DateValue::parse_lenient(date_node.value()).to_naive_date()?;
    let time = TimeValue::parse(date_node.tag_string("TIME"))
        .map(|t| t.time())
        .unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

// ------------- Multimedia -------------

/// The crop rectangle of a multimedia link, `_POSITION x1 y1 x2 y2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CutoutPosition {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl CutoutPosition {
    pub fn parse(value: &str) -> Option<Self> {
        let numbers: Vec<u16> = value
            .split_whitespace()
            .map(str::parse::<u16>)
            .collect::<Result<_, _>>()
            .ok()?;
        match numbers.as_slice() {
            [x1, y1, x2, y2] => Some(Self { x1: *x1, y1: *y1, x2: *x2, y2: *y2 }),
            _ => None,
        }
    }
    pub fn is_empty(&self) -> bool {
        self.x1 == 0 && self.y1 == 0 && self.x2 == 0 && self.y2 == 0
    }
    pub fn as_tuple(&self) -> (u16, u16, u16, u16) {
        (self.x1, self.y1, self.x2, self.y2)
    }
}

impl fmt::Display for CutoutPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x1, self.y1, self.x2, self.y2)
    }
}

/// An `OBJE` link from a record to a multimedia record, possibly cropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultimediaLink {
    pub xref: String,
    pub title: String,
    pub is_primary: bool,
    pub cutout: Option<CutoutPosition>,
}

impl MultimediaLink {
    pub fn read(node: &TagNode) -> Self {
        Self {
            xref: node.xref().unwrap_or("").to_string(),
            title: node.tag_string("TITL").to_string(),
            is_primary: node.tag_string("_PRIM") == "Y",
            cutout: node
                .find_tag("_POSITION", 0)
                .and_then(|p| CutoutPosition::parse(p.value()))
                .filter(|c| !c.is_empty()),
        }
    }
    /// Identifier of the linked region, stable across xref renumbering.
    pub fn uid(&self, media_uid: &str) -> String {
        multimedia_link_uid(media_uid, self.cutout.map(|c| c.as_tuple()))
    }
    pub fn apply(&self, factory: &TagFactory, node: &mut TagNode) {
        node.set_value(&enclose_xref(&self.xref));
        node.delete_tag("TITL");
        node.delete_tag("_PRIM");
        node.delete_tag("_POSITION");
        if !self.title.is_empty() {
            node.add_tag(factory, "TITL", &self.title);
        }
        if self.is_primary {
            node.add_tag(factory, "_PRIM", "Y");
        }
        if let Some(cutout) = self.cutout {
            node.add_tag(factory, "_POSITION", &cutout.to_string());
        }
    }
}

/// A `FILE` entry of a multimedia record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileReference {
    pub file: String,
    pub title: String,
    pub format: MultimediaFormat,
    pub media_type: MediaType,
}

impl FileReference {
    pub fn new(file: &str, title: &str, media_type: MediaType) -> Self {
        Self {
            file: file.to_string(),
            title: title.to_string(),
            format: MultimediaFormat::recognize(file),
            media_type,
        }
    }
    pub fn read(node: &TagNode) -> Self {
        Self {
            file: node.value().to_string(),
            title: node.tag_string("TITL").to_string(),
            format: MultimediaFormat::from_tag(node.tag_string("FORM")),
            media_type: MediaType::from_tag(node.tag_string("FORM:TYPE")),
        }
    }
    pub fn apply(&self, factory: &TagFactory, node: &mut TagNode) {
        node.set_value(&self.file);
        node.delete_tag("TITL");
        node.delete_tag("FORM");
        if !self.title.is_empty() {
            node.add_tag(factory, "TITL", &self.title);
        }
        let form = node.add_tag(factory, "FORM", self.format.tag());
        if self.media_type != MediaType::Unknown {
            form.add_tag(factory, "TYPE", self.media_type.tag());
        }
    }
}

// ------------- Citations and associations -------------

/// A `SOUR` pointer with its page and quality of data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceCitation {
    pub xref: String,
    /// Citation text when the `SOUR` is not a pointer.
    pub description: String,
    pub page: String,
    pub certainty: i64,
}

impl SourceCitation {
    pub fn read(node: &TagNode) -> Self {
        let (xref, description) = match node.xref() {
            Some(xref) => (xref.to_string(), String::new()),
            None => (String::new(), node.value().to_string()),
        };
        Self {
            xref,
            description,
            page: node.tag_string("PAGE").to_string(),
            certainty: node.tag_integer("QUAY", -1),
        }
    }
}

/// An `ASSO` link to another individual with the relation described.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Association {
    pub xref: String,
    pub relation: String,
}

impl Association {
    pub fn read(node: &TagNode) -> Self {
        Self {
            xref: node.xref().unwrap_or("").to_string(),
            relation: node.tag_string("RELA").to_string(),
        }
    }
}
