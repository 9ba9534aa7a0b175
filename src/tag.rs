//! Tag nodes and the registry that decides what kind of node a tag becomes.
//!
//! A document is a forest of [`TagNode`]s. Every node keeps its raw value as
//! text, so anything read from a file can be written back untouched; typed
//! views (dates, names, addresses) parse that text on access.
//!
//! The [`TagFactory`] maps tag names to constructor functions. Constructors
//! see the kind of the parent they will be attached to, which is how `NAME`
//! under an individual becomes a personal name while `NAME` under a
//! repository stays plain text.

// other keepers use HashMap
use core::hash::BuildHasherDefault;
use std::collections::HashMap;
use seahash::SeaHasher;

// used to hand out document identities
use std::sync::atomic::{AtomicU64, Ordering};

// so the standard registry is built once
use lazy_static::lazy_static;

use crate::error::{GedcomError, Result};
use crate::record::RecordType;
use crate::utils::{clean_xref, enclose_xref, is_pointer};

pub type TagHasher = BuildHasherDefault<SeaHasher>;

// ------------- DocumentId -------------
static NEXT_DOCUMENT: AtomicU64 = AtomicU64::new(1);

/// Identity of the document a node belongs to. Nodes only ever hold this
/// copyable id, never a reference to the document itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn next() -> Self {
        Self(NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed))
    }
    pub fn value(&self) -> u64 {
        self.0
    }
}

// ------------- TagKind -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagKind {
    Generic,
    /// Invisible container holding the sub-tags of an event or attribute.
    Detail,
    Pointer,
    Text,
    Date,
    Time,
    ChangeDate,
    Address,
    PersonalName,
    IndividualEvent,
    FamilyEvent,
    Attribute,
    MultimediaLink,
    FileReference,
    CutoutPosition,
    Record(RecordType),
}

impl TagKind {
    pub fn is_event(&self) -> bool {
        matches!(self, TagKind::IndividualEvent | TagKind::FamilyEvent | TagKind::Attribute)
    }
    pub fn is_record(&self) -> bool {
        matches!(self, TagKind::Record(_))
    }
}

// ------------- TagNode -------------
#[derive(Clone, Debug, PartialEq)]
pub struct TagNode {
    name: String,
    value: String,
    kind: TagKind,
    children: Vec<TagNode>,
    owner: Option<DocumentId>,
}

impl TagNode {
    pub fn new(owner: Option<DocumentId>, kind: TagKind, name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            kind,
            children: Vec::new(),
            owner,
        }
    }
    pub fn generic(owner: Option<DocumentId>, name: &str, value: &str) -> Self {
        Self::new(owner, TagKind::Generic, name, value)
    }
    // It's intentional to encapsulate the fields in the struct
    // and only expose them using "getters", because the owner and
    // kind must stay consistent with where the node lives.
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value(&self) -> &str {
        &self.value
    }
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }
    pub fn kind(&self) -> TagKind {
        self.kind
    }
    pub fn owner(&self) -> Option<DocumentId> {
        self.owner
    }
    pub fn children(&self) -> &[TagNode] {
        &self.children
    }
    pub fn children_mut(&mut self) -> &mut Vec<TagNode> {
        &mut self.children
    }
    /// Re-owns this node and everything below it.
    pub fn reset_owner(&mut self, owner: Option<DocumentId>) {
        self.owner = owner;
        for child in &mut self.children {
            child.reset_owner(owner);
        }
    }
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.children.iter().all(TagNode::is_empty)
    }
    pub fn clear(&mut self) {
        self.value.clear();
        self.children.clear();
    }
    pub fn append_child(&mut self, mut node: TagNode) -> &mut TagNode {
        node.reset_owner(self.owner);
        self.children.push(node);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    // ------------- Routing -------------

    /// Adds a sub-tag the way the reader does: continuation lines extend this
    /// node's value and everything else lands on the routing target.
    pub fn add_tag(&mut self, factory: &TagFactory, name: &str, value: &str) -> &mut TagNode {
        match name {
            "CONT" => {
                self.value.push('\n');
                self.value.push_str(value);
                self
            }
            "CONC" => {
                self.value.push_str(value);
                self
            }
            _ => {
                let owner = self.owner;
                factory.create_or_generic(owner, self.body_mut(), name, value)
            }
        }
    }
    /// The node that holds sub-tags: the detail of an event, the node itself otherwise.
    pub fn body(&self) -> &TagNode {
        if self.kind.is_event() {
            if let Some(detail) = self.children.iter().find(|c| c.kind == TagKind::Detail) {
                return detail;
            }
        }
        self
    }
    pub fn body_mut(&mut self) -> &mut TagNode {
        if !self.kind.is_event() {
            return self;
        }
        let index = match self.children.iter().position(|c| c.kind == TagKind::Detail) {
            Some(index) => index,
            None => {
                self.children.insert(0, TagNode::new(self.owner, TagKind::Detail, "", ""));
                0
            }
        };
        &mut self.children[index]
    }
    /// Children as they appear in the file, with detail containers flattened.
    pub fn visible_children(&self) -> Vec<&TagNode> {
        let mut result = Vec::with_capacity(self.children.len());
        for child in &self.children {
            if child.kind == TagKind::Detail {
                result.extend(child.visible_children());
            } else {
                result.push(child);
            }
        }
        result
    }

    // ------------- Lookup -------------

    /// First sub-tag named `name` at or after position `start`.
    pub fn find_tag(&self, name: &str, start: usize) -> Option<&TagNode> {
        self.body().children.iter().skip(start).find(|c| c.name == name)
    }
    pub fn find_tag_mut(&mut self, name: &str) -> Option<&mut TagNode> {
        self.body_mut().children.iter_mut().find(|c| c.name == name)
    }
    pub fn tags<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TagNode> + 'a {
        self.body().children.iter().filter(move |c| c.name == name)
    }
    pub fn tag_count(&self, name: &str) -> usize {
        self.tags(name).count()
    }
    /// Follows a colon separated path such as `MAP:LATI`.
    pub fn find_path(&self, path: &str) -> Option<&TagNode> {
        let mut node = self;
        for part in path.split(':') {
            node = node.find_tag(part, 0)?;
        }
        Some(node)
    }
    pub fn tag_string(&self, path: &str) -> &str {
        self.find_path(path).map_or("", TagNode::value)
    }
    pub fn tag_integer(&self, path: &str, default: i64) -> i64 {
        self.tag_string(path).trim().parse().unwrap_or(default)
    }
    /// Sets the value at `path`, creating missing nodes through the factory.
    pub fn set_tag_string(&mut self, factory: &TagFactory, path: &str, value: &str) -> &mut TagNode {
        let mut node = self;
        for part in path.split(':') {
            node = node.child_or_create(factory, part);
        }
        node.value = value.to_string();
        node
    }
    fn child_or_create(&mut self, factory: &TagFactory, name: &str) -> &mut TagNode {
        let owner = self.owner;
        let body = self.body_mut();
        match body.children.iter().position(|c| c.name == name) {
            Some(index) => &mut body.children[index],
            None => factory.create_or_generic(owner, body, name, ""),
        }
    }
    pub fn set_tag_integer(&mut self, factory: &TagFactory, path: &str, value: i64) -> &mut TagNode {
        self.set_tag_string(factory, path, &value.to_string())
    }
    /// Removes every sub-tag named `name`, returning how many went away.
    pub fn delete_tag(&mut self, name: &str) -> usize {
        let body = self.body_mut();
        let before = body.children.len();
        body.children.retain(|c| c.name != name);
        before - body.children.len()
    }
    pub fn delete_child_at(&mut self, index: usize) -> Option<TagNode> {
        let body = self.body_mut();
        (index < body.children.len()).then(|| body.children.remove(index))
    }
    /// Multi-valued string children, e.g. the `PHON` lines of an address.
    pub fn tag_strings(&self, name: &str) -> Vec<String> {
        self.tags(name).map(|t| t.value.clone()).collect()
    }
    pub fn set_tag_strings(&mut self, factory: &TagFactory, name: &str, values: &[&str]) {
        self.delete_tag(name);
        for value in values {
            self.add_tag(factory, name, value);
        }
    }

    // ------------- Pointers -------------

    /// The target of a pointer value, without the `@` delimiters.
    pub fn xref(&self) -> Option<&str> {
        is_pointer(&self.value).then(|| clean_xref(&self.value))
    }
    pub fn points_to(&self, xref: &str) -> bool {
        self.xref() == Some(clean_xref(xref))
    }
    pub fn pointers(&self, name: &str) -> Vec<String> {
        self.tags(name).filter_map(|t| t.xref().map(str::to_string)).collect()
    }
    pub fn add_pointer(&mut self, factory: &TagFactory, name: &str, xref: &str) -> &mut TagNode {
        self.add_tag(factory, name, &enclose_xref(clean_xref(xref)))
    }
    /// Removes direct sub-tags `name` that point at `xref`.
    pub fn remove_pointer(&mut self, name: &str, xref: &str) -> bool {
        let body = self.body_mut();
        let before = body.children.len();
        body.children.retain(|c| !(c.name == name && c.points_to(xref)));
        before != body.children.len()
    }
    /// Removes pointer tags aiming at `xref` anywhere below this node.
    pub fn remove_pointers_to(&mut self, xref: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|c| !c.points_to(xref));
        let mut removed = before - self.children.len();
        for child in &mut self.children {
            removed += child.remove_pointers_to(xref);
        }
        removed
    }
    /// Rewrites every pointer value below and at this node through `map`.
    pub fn remap_pointers<F>(&mut self, map: &F)
    where
        F: Fn(&str) -> String,
    {
        if let Some(xref) = self.xref() {
            let new_xref = map(xref);
            self.value = enclose_xref(&new_xref);
        }
        for child in &mut self.children {
            child.remap_pointers(map);
        }
    }
}

// ------------- TagFactory -------------
pub type TagConstructor = fn(Option<DocumentId>, TagKind, &str, &str) -> TagNode;

/// Registry of tag constructors keyed by exact tag name.
#[derive(Clone)]
pub struct TagFactory {
    constructors: HashMap<String, TagConstructor, TagHasher>,
}

impl Default for TagFactory {
    fn default() -> Self {
        Self::standard()
    }
}

impl TagFactory {
    /// An empty registry; every name is unknown until registered.
    pub fn new() -> Self {
        Self { constructors: HashMap::default() }
    }
    /// The registry used when reading documents.
    pub fn standard() -> Self {
        let mut factory = Self::new();
        factory.register_tag("DATE", date_tag);
        factory.register_tag("_STARTDATE", date_tag);
        factory.register_tag("_STOPDATE", date_tag);
        factory.register_tag("TIME", time_tag);
        factory.register_tag("CHAN", change_date_tag);
        factory.register_tag("ADDR", address_tag);
        factory.register_tag("NAME", name_tag);
        factory.register_tag("NOTE", text_or_pointer_tag);
        factory.register_tag("SOUR", text_or_pointer_tag);
        factory.register_tag("OBJE", multimedia_link_tag);
        factory.register_tag("FILE", file_reference_tag);
        factory.register_tag("_POSITION", cutout_tag);
        for name in POINTER_TAGS {
            factory.register_tag(name, pointer_tag);
        }
        for name in INDIVIDUAL_EVENTS.iter().chain(FAMILY_EVENTS.iter()) {
            factory.register_tag(name, event_tag);
        }
        for name in INDIVIDUAL_ATTRIBUTES {
            factory.register_tag(name, attribute_tag);
        }
        factory
    }
    pub fn register_tag(&mut self, name: &str, constructor: TagConstructor) {
        self.constructors.insert(name.to_string(), constructor);
    }
    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
    /// Builds a node detached from any parent.
    pub fn build(&self, owner: Option<DocumentId>, parent: TagKind, name: &str, value: &str) -> Result<TagNode> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| GedcomError::UnknownTagKind(name.to_string()))?;
        Ok(constructor(owner, parent, name, value))
    }
    /// Creates a registered tag and appends it to `parent`.
    pub fn create_tag<'p>(
        &self,
        owner: Option<DocumentId>,
        parent: &'p mut TagNode,
        name: &str,
        value: &str,
    ) -> Result<&'p mut TagNode> {
        let node = self.build(owner, parent.kind, name, value)?;
        Ok(parent.append_child(node))
    }
    /// Like [`TagFactory::create_tag`], but unknown names become generic nodes.
    pub fn create_or_generic<'p>(
        &self,
        owner: Option<DocumentId>,
        parent: &'p mut TagNode,
        name: &str,
        value: &str,
    ) -> &'p mut TagNode {
        let node = self
            .build(owner, parent.kind, name, value)
            .unwrap_or_else(|_| TagNode::generic(owner, name, value));
        parent.append_child(node)
    }
}

lazy_static! {
    static ref STANDARD_FACTORY: TagFactory = TagFactory::standard();
}

/// The shared standard registry, used by the typed record layer.
pub fn standard_factory() -> &'static TagFactory {
    &STANDARD_FACTORY
}

pub const POINTER_TAGS: &[&str] = &[
    "FAMC", "FAMS", "HUSB", "WIFE", "CHIL", "ASSO", "REPO", "_GROUP", "_MEMBER", "_TASK",
    "_COMM", "_LOC", "FROM", "TO",
];

pub const INDIVIDUAL_EVENTS: &[&str] = &[
    "BIRT", "CHR", "DEAT", "BURI", "CREM", "ADOP", "BAPM", "BARM", "BASM", "BLES", "CHRA",
    "CONF", "FCOM", "ORDN", "NATU", "EMIG", "IMMI", "CENS", "PROB", "WILL", "GRAD", "RETI",
    "EVEN",
];

pub const FAMILY_EVENTS: &[&str] = &[
    "ANUL", "DIV", "DIVF", "ENGA", "MARR", "MARB", "MARC", "MARL", "MARS",
];

pub const INDIVIDUAL_ATTRIBUTES: &[&str] = &[
    "CAST", "DSCR", "EDUC", "IDNO", "NATI", "NCHI", "NMR", "OCCU", "PROP", "RELI", "RESI",
    "SSN", "TITL", "FACT", "_TRAVEL", "_HOBBY", "_AWARD", "_MILI", "_MILI_IND", "_MILI_DIS",
    "_MILI_RANK", "_BGRO", "_EYES", "_HAIR", "_MDNA",
];

// ------------- Standard constructors -------------

fn date_tag(owner: Option<DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
    TagNode::new(owner, TagKind::Date, name, value)
}

fn time_tag(owner: Option<DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
    TagNode::new(owner, TagKind::Time, name, value)
}

fn change_date_tag(owner: Option<DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
    TagNode::new(owner, TagKind::ChangeDate, name, value)
}

fn address_tag(owner: Option<DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
    TagNode::new(owner, TagKind::Address, name, value)
}

fn name_tag(owner: Option<DocumentId>, parent: TagKind, name: &str, value: &str) -> TagNode {
    let kind = match parent {
        TagKind::Record(RecordType::Individual) => TagKind::PersonalName,
        _ => TagKind::Generic,
    };
    TagNode::new(owner, kind, name, value)
}

fn text_or_pointer_tag(owner: Option<DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
    let kind = if is_pointer(value) { TagKind::Pointer } else { TagKind::Text };
    TagNode::new(owner, kind, name, value)
}

fn multimedia_link_tag(owner: Option<DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
    TagNode::new(owner, TagKind::MultimediaLink, name, value)
}

fn file_reference_tag(owner: Option<DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
    TagNode::new(owner, TagKind::FileReference, name, value)
}

fn cutout_tag(owner: Option<DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
    TagNode::new(owner, TagKind::CutoutPosition, name, value)
}

fn pointer_tag(owner: Option<DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
    let kind = if is_pointer(value) || value.is_empty() { TagKind::Pointer } else { TagKind::Generic };
    TagNode::new(owner, kind, name, value)
}

fn event_tag(owner: Option<DocumentId>, parent: TagKind, name: &str, value: &str) -> TagNode {
    let kind = match parent {
        TagKind::Record(RecordType::Individual) => TagKind::IndividualEvent,
        TagKind::Record(RecordType::Family) => TagKind::FamilyEvent,
        _ => TagKind::Generic,
    };
    TagNode::new(owner, kind, name, value)
}

fn attribute_tag(owner: Option<DocumentId>, parent: TagKind, name: &str, value: &str) -> TagNode {
    let kind = match parent {
        TagKind::Record(RecordType::Individual) => TagKind::Attribute,
        // RESI is also a family event
        TagKind::Record(RecordType::Family) if name == "RESI" => TagKind::FamilyEvent,
        _ => TagKind::Generic,
    };
    TagNode::new(owner, kind, name, value)
}

// ------------- Tag properties -------------

/// Tags that carry no meaning without a value or sub-tags and are dropped on write.
const SKIP_EMPTY: &[&str] = &[
    "ADDR", "AGNC", "AUTH", "CAUS", "CHAN", "CITY", "CTRY", "DATE", "PAGE", "PLAC", "POST",
    "PUBL", "RESN", "STAE", "TEXT", "TIME", "TYPE", "SUBM", "VERS", "LANG",
    // name pieces
    "NPFX", "GIVN", "NICK", "SPFX", "SURN", "NSFX", "_PATN", "_MARN", "_RELN", "_CENN",
    "_LOC", "_POSITION", "ALIA",
    "_BGRO", "_HAIR", "_EYES", "_MDNA", "_YDNA",
    // written empty by the typed setters
    "NOTE", "SOUR", "OBJE", "_UID", "RIN", "QUAY",
];

pub fn skip_when_empty(name: &str) -> bool {
    SKIP_EMPTY.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_created_once_and_first() {
        let factory = TagFactory::standard();
        let mut event = TagNode::new(None, TagKind::IndividualEvent, "BIRT", "");
        event.add_tag(&factory, "DATE", "1 JAN 1900");
        event.add_tag(&factory, "PLAC", "Nowhere");
        assert_eq!(event.children().len(), 1);
        assert_eq!(event.children()[0].kind(), TagKind::Detail);
        assert_eq!(event.tag_string("PLAC"), "Nowhere");
        assert_eq!(event.visible_children().len(), 2);
    }
}
