//! Records: the level-0 nodes of a document.
//!
//! A [`Record`] wraps the [`TagNode`] of the record together with the three
//! things the document tracks for it: the xref, the UID and the change date.
//! The UID (`_UID`) and change date (`CHAN`) are lifted out of the children
//! when a record is read and are written back after all other sub-tags.
//!
//! Typed accessors for every record type live on [`Record`] itself. They only
//! read and write sub-tags; calling an accessor that belongs to another record
//! type is harmless and simply finds nothing.

use std::fmt;

use chrono::{NaiveDateTime, Timelike, Utc};

use crate::date::DateValue;
use crate::enums::{
    CommunicationDir, CommunicationType, PedigreeLinkage, ResearchPriority, ResearchStatus,
    Restriction, Sex, TagEnum,
};
use crate::structure::{
    Address, Association, CutoutPosition, Event, FileReference, MultimediaLink, PersonalName,
    SourceCitation,
};
use crate::tag::{standard_factory, DocumentId, TagKind, TagNode};
use crate::utils::{clean_xref, enclose_xref};

// ------------- RecordType -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    Individual,
    Family,
    Note,
    Multimedia,
    Source,
    Repository,
    Group,
    Research,
    Task,
    Communication,
    Location,
    Submitter,
    Submission,
    /// Any other level-0 tag, kept as is.
    Other,
}

impl RecordType {
    pub const ALL: [RecordType; 13] = [
        RecordType::Individual,
        RecordType::Family,
        RecordType::Note,
        RecordType::Multimedia,
        RecordType::Source,
        RecordType::Repository,
        RecordType::Group,
        RecordType::Research,
        RecordType::Task,
        RecordType::Communication,
        RecordType::Location,
        RecordType::Submitter,
        RecordType::Submission,
    ];
    pub fn tag(&self) -> &'static str {
        match self {
            RecordType::Individual => "INDI",
            RecordType::Family => "FAM",
            RecordType::Note => "NOTE",
            RecordType::Multimedia => "OBJE",
            RecordType::Source => "SOUR",
            RecordType::Repository => "REPO",
            RecordType::Group => "_GROUP",
            RecordType::Research => "_RESEARCH",
            RecordType::Task => "_TASK",
            RecordType::Communication => "_COMM",
            RecordType::Location => "_LOC",
            RecordType::Submitter => "SUBM",
            RecordType::Submission => "SUBN",
            RecordType::Other => "",
        }
    }
    pub fn xref_prefix(&self) -> &'static str {
        match self {
            RecordType::Individual => "I",
            RecordType::Family => "F",
            RecordType::Note => "N",
            RecordType::Multimedia => "O",
            RecordType::Source => "S",
            RecordType::Repository => "R",
            RecordType::Group => "G",
            RecordType::Research => "RS",
            RecordType::Task => "TK",
            RecordType::Communication => "CM",
            RecordType::Location => "L",
            RecordType::Submitter => "SUBM",
            RecordType::Submission => "SUBN",
            RecordType::Other => "X",
        }
    }
    pub fn from_tag(tag: &str) -> Self {
        RecordType::ALL
            .into_iter()
            .find(|t| t.tag() == tag)
            .unwrap_or(RecordType::Other)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RecordType::Individual => "individual",
            RecordType::Family => "family",
            RecordType::Note => "note",
            RecordType::Multimedia => "multimedia",
            RecordType::Source => "source",
            RecordType::Repository => "repository",
            RecordType::Group => "group",
            RecordType::Research => "research",
            RecordType::Task => "task",
            RecordType::Communication => "communication",
            RecordType::Location => "location",
            RecordType::Submitter => "submitter",
            RecordType::Submission => "submission",
            RecordType::Other => "other",
        };
        write!(f, "{}", name)
    }
}

// ------------- Record -------------
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    record_type: RecordType,
    xref: String,
    uid: String,
    change_date: Option<NaiveDateTime>,
    node: TagNode,
}

impl Record {
    pub fn new(owner: Option<DocumentId>, record_type: RecordType, xref: &str) -> Self {
        Self::with_tag(owner, record_type, record_type.tag(), xref)
    }
    /// A record whose level-0 tag is given explicitly, as needed for [`RecordType::Other`].
    pub fn with_tag(owner: Option<DocumentId>, record_type: RecordType, tag: &str, xref: &str) -> Self {
        Self {
            record_type,
            xref: clean_xref(xref).to_string(),
            uid: String::new(),
            change_date: None,
            node: TagNode::new(owner, TagKind::Record(record_type), tag, ""),
        }
    }
    // It's intentional to encapsulate the identity fields in the struct
    // and only expose them using "getters", since the document indexes
    // records by them and must be the one changing them.
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }
    pub fn xref(&self) -> &str {
        &self.xref
    }
    pub(crate) fn set_xref(&mut self, xref: &str) {
        self.xref = clean_xref(xref).to_string();
    }
    pub fn uid(&self) -> &str {
        &self.uid
    }
    pub(crate) fn set_uid(&mut self, uid: &str) {
        self.uid = uid.to_string();
    }
    pub fn change_date(&self) -> Option<NaiveDateTime> {
        self.change_date
    }
    /// A new stamp replaces any `CHAN` that was kept verbatim from a file.
    pub fn set_change_date(&mut self, stamp: Option<NaiveDateTime>) {
        if stamp.is_some() {
            self.node.delete_tag("CHAN");
        }
        self.change_date = stamp;
    }
    /// Stamps the record as changed now, to the second.
    pub fn touch(&mut self) {
        let now = Utc::now().naive_utc();
        self.set_change_date(Some(now.with_nanosecond(0).unwrap_or(now)));
    }
    pub fn owner(&self) -> Option<DocumentId> {
        self.node.owner()
    }
    pub(crate) fn reset_owner(&mut self, owner: Option<DocumentId>) {
        self.node.reset_owner(owner);
    }
    pub fn node(&self) -> &TagNode {
        &self.node
    }
    pub fn node_mut(&mut self) -> &mut TagNode {
        &mut self.node
    }
    pub fn is_empty(&self) -> bool {
        self.node.is_empty()
    }
    pub fn clear(&mut self) {
        self.node.clear();
    }

    // ------------- Generic tag access -------------

    pub fn add_tag(&mut self, name: &str, value: &str) -> &mut TagNode {
        self.node.add_tag(standard_factory(), name, value)
    }
    pub fn tag_string(&self, path: &str) -> &str {
        self.node.tag_string(path)
    }
    /// Sets a sub-tag value; an empty value removes the tag instead.
    pub fn set_tag_string(&mut self, path: &str, value: &str) {
        if value.is_empty() && !path.contains(':') {
            self.node.delete_tag(path);
        } else {
            self.node.set_tag_string(standard_factory(), path, value);
        }
    }
    fn flag(&self, tag: &str) -> bool {
        self.node.tag_string(tag) == "Y"
    }
    fn set_flag(&mut self, tag: &str, on: bool) {
        self.set_tag_string(tag, if on { "Y" } else { "" });
    }
    /// Targets of the pointer sub-tags named `tag`.
    pub fn pointers(&self, tag: &str) -> Vec<String> {
        self.node.pointers(tag)
    }
    pub fn has_pointer(&self, tag: &str, xref: &str) -> bool {
        self.node.tags(tag).any(|t| t.points_to(xref))
    }
    /// Adds a pointer unless the same one is already there.
    pub fn add_pointer(&mut self, tag: &str, xref: &str) -> bool {
        if xref.is_empty() || self.has_pointer(tag, xref) {
            return false;
        }
        self.node.add_pointer(standard_factory(), tag, xref);
        true
    }
    pub fn remove_pointer(&mut self, tag: &str, xref: &str) -> bool {
        self.node.remove_pointer(tag, xref)
    }
    fn single_pointer(&self, tag: &str) -> Option<String> {
        self.node.find_tag(tag, 0).and_then(TagNode::xref).map(str::to_string)
    }
    fn set_single_pointer(&mut self, tag: &str, xref: Option<&str>) {
        match xref {
            Some(xref) if !xref.is_empty() => self.set_tag_string(tag, &enclose_xref(clean_xref(xref))),
            _ => {
                self.node.delete_tag(tag);
            }
        }
    }

    // ------------- Common to all records -------------

    pub fn notes(&self) -> Vec<&TagNode> {
        self.node.tags("NOTE").collect()
    }
    pub fn add_note_link(&mut self, note_xref: &str) -> bool {
        self.add_pointer("NOTE", note_xref)
    }
    pub fn add_note_text(&mut self, text: &str) -> &mut TagNode {
        self.add_tag("NOTE", text)
    }
    pub fn source_citations(&self) -> Vec<SourceCitation> {
        self.node.tags("SOUR").map(SourceCitation::read).collect()
    }
    pub fn add_source_citation(&mut self, source_xref: &str, page: &str, certainty: i64) -> &mut TagNode {
        let citation = self.node.add_pointer(standard_factory(), "SOUR", source_xref);
        if !page.is_empty() {
            citation.add_tag(standard_factory(), "PAGE", page);
        }
        if certainty >= 0 {
            citation.add_tag(standard_factory(), "QUAY", &certainty.to_string());
        }
        citation
    }
    pub fn multimedia_links(&self) -> Vec<MultimediaLink> {
        self.node.tags("OBJE").map(MultimediaLink::read).collect()
    }
    pub fn add_multimedia_link(&mut self, media_xref: &str, title: &str, cutout: Option<CutoutPosition>) -> &mut TagNode {
        let link = MultimediaLink {
            xref: clean_xref(media_xref).to_string(),
            title: title.to_string(),
            is_primary: false,
            cutout,
        };
        let node = self.add_tag("OBJE", "");
        link.apply(standard_factory(), node);
        node
    }
    pub fn user_references(&self) -> Vec<String> {
        self.node.tag_strings("REFN")
    }
    pub fn add_user_reference(&mut self, reference: &str) {
        self.add_tag("REFN", reference);
    }
    pub fn restriction(&self) -> Restriction {
        Restriction::from_tag(self.node.tag_string("RESN"))
    }
    pub fn set_restriction(&mut self, restriction: Restriction) {
        self.set_tag_string("RESN", restriction.tag());
    }
    pub fn auto_id(&self) -> &str {
        self.node.tag_string("RIN")
    }

    // ------------- Individual -------------

    pub fn sex(&self) -> Sex {
        Sex::from_tag(self.node.tag_string("SEX"))
    }
    pub fn set_sex(&mut self, sex: Sex) {
        self.set_tag_string("SEX", sex.tag());
    }
    pub fn personal_names(&self) -> Vec<PersonalName> {
        self.node.tags("NAME").map(PersonalName::read).collect()
    }
    /// The first personal name, or an empty one.
    pub fn primary_name(&self) -> PersonalName {
        self.node.find_tag("NAME", 0).map(PersonalName::read).unwrap_or_default()
    }
    pub fn add_personal_name(&mut self, name: &PersonalName) -> &mut TagNode {
        let node = self.add_tag("NAME", "");
        name.apply(standard_factory(), node);
        node
    }
    /// Replaces the `index`-th personal name; false when there is no such name.
    pub fn set_personal_name(&mut self, index: usize, name: &PersonalName) -> bool {
        match self.node.children_mut().iter_mut().filter(|c| c.name() == "NAME").nth(index) {
            Some(node) => {
                name.apply(standard_factory(), node);
                true
            }
            None => false,
        }
    }
    /// `(surname, name, patronymic)` of the primary name.
    pub fn name_parts(&self) -> (String, String, String) {
        self.primary_name().name_parts()
    }
    pub fn events(&self) -> Vec<Event> {
        self.node
            .children()
            .iter()
            .filter(|c| c.kind().is_event())
            .map(Event::read)
            .collect()
    }
    pub fn find_event(&self, name: &str) -> Option<Event> {
        self.node
            .children()
            .iter()
            .find(|c| c.kind().is_event() && c.name() == name)
            .map(Event::read)
    }
    pub fn find_event_node(&self, name: &str) -> Option<&TagNode> {
        self.node
            .children()
            .iter()
            .find(|c| c.kind().is_event() && c.name() == name)
    }
    /// Adds an event (or attribute) with the given date and place.
    pub fn add_event(&mut self, name: &str, value: &str, date: &str, place: &str) -> &mut TagNode {
        let node = self.add_tag(name, value);
        if !date.is_empty() {
            node.add_tag(standard_factory(), "DATE", date);
        }
        if !place.is_empty() {
            node.add_tag(standard_factory(), "PLAC", place);
        }
        node
    }
    pub fn birth_date(&self) -> DateValue {
        self.find_event("BIRT").map(|e| e.date).unwrap_or_default()
    }
    pub fn death_date(&self) -> DateValue {
        self.find_event("DEAT").map(|e| e.date).unwrap_or_default()
    }
    /// Families this individual is a child of (`FAMC`).
    pub fn child_to_family_links(&self) -> Vec<String> {
        self.pointers("FAMC")
    }
    /// Families this individual is a spouse in (`FAMS`).
    pub fn spouse_to_family_links(&self) -> Vec<String> {
        self.pointers("FAMS")
    }
    pub fn pedigree_linkage(&self, family_xref: &str) -> PedigreeLinkage {
        self.node
            .tags("FAMC")
            .find(|t| t.points_to(family_xref))
            .map_or(PedigreeLinkage::None, |t| PedigreeLinkage::from_tag(t.tag_string("PEDI")))
    }
    pub fn group_links(&self) -> Vec<String> {
        self.pointers("_GROUP")
    }
    pub fn patriarch(&self) -> bool {
        self.flag("_PATRIARCH")
    }
    pub fn set_patriarch(&mut self, on: bool) {
        self.set_flag("_PATRIARCH", on);
    }
    pub fn bookmark(&self) -> bool {
        self.flag("_BOOKMARK")
    }
    pub fn set_bookmark(&mut self, on: bool) {
        self.set_flag("_BOOKMARK", on);
    }
    pub fn associations(&self) -> Vec<Association> {
        self.node.tags("ASSO").map(Association::read).collect()
    }
    pub fn add_association(&mut self, relation: &str, xref: &str) -> &mut TagNode {
        let asso = self.node.add_pointer(standard_factory(), "ASSO", xref);
        asso.add_tag(standard_factory(), "RELA", relation);
        asso
    }

    // ------------- Family -------------

    pub fn husband(&self) -> Option<String> {
        self.single_pointer("HUSB")
    }
    pub fn set_husband(&mut self, xref: Option<&str>) {
        self.set_single_pointer("HUSB", xref);
    }
    pub fn wife(&self) -> Option<String> {
        self.single_pointer("WIFE")
    }
    pub fn set_wife(&mut self, xref: Option<&str>) {
        self.set_single_pointer("WIFE", xref);
    }
    pub fn children(&self) -> Vec<String> {
        self.pointers("CHIL")
    }
    pub fn marriage_date(&self) -> DateValue {
        self.find_event("MARR").map(|e| e.date).unwrap_or_default()
    }

    // ------------- Note -------------

    /// Full note text, lines joined with `\n`.
    pub fn text(&self) -> &str {
        match self.record_type {
            RecordType::Note => self.node.value(),
            _ => self.node.tag_string("TEXT"),
        }
    }
    pub fn set_text(&mut self, text: &str) {
        match self.record_type {
            RecordType::Note => self.node.set_value(text),
            _ => self.set_tag_string("TEXT", text),
        }
    }
    /// Appends one line to a note.
    pub fn add_text_line(&mut self, line: &str) {
        let mut text = self.text().to_string();
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(line);
        self.set_text(&text);
    }

    // ------------- Source -------------

    pub fn title(&self) -> &str {
        self.node.tag_string("TITL")
    }
    pub fn set_title(&mut self, title: &str) {
        self.set_tag_string("TITL", title);
    }
    pub fn originator(&self) -> &str {
        self.node.tag_string("AUTH")
    }
    pub fn set_originator(&mut self, author: &str) {
        self.set_tag_string("AUTH", author);
    }
    pub fn publication(&self) -> &str {
        self.node.tag_string("PUBL")
    }
    pub fn set_publication(&mut self, publication: &str) {
        self.set_tag_string("PUBL", publication);
    }
    pub fn short_title(&self) -> &str {
        self.node.tag_string("ABBR")
    }
    pub fn set_short_title(&mut self, short_title: &str) {
        self.set_tag_string("ABBR", short_title);
    }
    pub fn repository_citations(&self) -> Vec<String> {
        self.pointers("REPO")
    }

    // ------------- Multimedia -------------

    pub fn file_references(&self) -> Vec<FileReference> {
        self.node.tags("FILE").map(FileReference::read).collect()
    }
    pub fn add_file_reference(&mut self, file: &FileReference) -> &mut TagNode {
        let node = self.add_tag("FILE", "");
        file.apply(standard_factory(), node);
        node
    }

    // ------------- Repository, group, location, submitter -------------

    pub fn name(&self) -> &str {
        self.node.tag_string("NAME")
    }
    pub fn set_name(&mut self, name: &str) {
        self.set_tag_string("NAME", name);
    }
    pub fn address(&self) -> Address {
        Address::read(&self.node)
    }
    pub fn set_address(&mut self, address: &Address) {
        address.apply(standard_factory(), &mut self.node);
    }
    /// Individuals listed in a group (`_MEMBER`).
    pub fn members(&self) -> Vec<String> {
        self.pointers("_MEMBER")
    }
    /// `(latitude, longitude)` of a location.
    pub fn map(&self) -> (&str, &str) {
        (self.node.tag_string("MAP:LATI"), self.node.tag_string("MAP:LONG"))
    }
    pub fn set_map(&mut self, latitude: &str, longitude: &str) {
        self.set_tag_string("MAP:LATI", latitude);
        self.set_tag_string("MAP:LONG", longitude);
    }

    // ------------- Research and task -------------

    pub fn priority(&self) -> ResearchPriority {
        ResearchPriority::from_tag(self.node.tag_string("_PRIORITY"))
    }
    pub fn set_priority(&mut self, priority: ResearchPriority) {
        self.set_tag_string("_PRIORITY", priority.tag());
    }
    pub fn status(&self) -> ResearchStatus {
        ResearchStatus::from_tag(self.node.tag_string("_STATUS"))
    }
    pub fn set_status(&mut self, status: ResearchStatus) {
        self.set_tag_string("_STATUS", status.tag());
    }
    pub fn start_date(&self) -> DateValue {
        DateValue::parse_lenient(self.node.tag_string("_STARTDATE"))
    }
    pub fn set_start_date(&mut self, date: &DateValue) {
        self.set_tag_string("_STARTDATE", &date.to_string());
    }
    pub fn stop_date(&self) -> DateValue {
        DateValue::parse_lenient(self.node.tag_string("_STOPDATE"))
    }
    pub fn set_stop_date(&mut self, date: &DateValue) {
        self.set_tag_string("_STOPDATE", &date.to_string());
    }
    pub fn percent(&self) -> i64 {
        self.node.tag_integer("_PERCENT", 0)
    }
    pub fn set_percent(&mut self, percent: i64) {
        self.set_tag_string("_PERCENT", &percent.to_string());
    }
    pub fn tasks(&self) -> Vec<String> {
        self.pointers("_TASK")
    }
    pub fn communications(&self) -> Vec<String> {
        self.pointers("_COMM")
    }
    /// The `_GOAL` of a task: free text or a pointer to the record aimed at.
    pub fn goal(&self) -> &str {
        self.node.tag_string("_GOAL")
    }
    pub fn set_goal(&mut self, goal: &str) {
        self.set_tag_string("_GOAL", goal);
    }

    // ------------- Communication -------------

    pub fn communication_type(&self) -> CommunicationType {
        CommunicationType::from_tag(self.node.tag_string("TYPE"))
    }
    pub fn set_communication_type(&mut self, kind: CommunicationType) {
        self.set_tag_string("TYPE", kind.tag());
    }
    pub fn date(&self) -> DateValue {
        DateValue::parse_lenient(self.node.tag_string("DATE"))
    }
    pub fn set_date(&mut self, date: &DateValue) {
        self.set_tag_string("DATE", &date.to_string());
    }
    pub fn corresponder(&self) -> Option<(CommunicationDir, String)> {
        [CommunicationDir::From, CommunicationDir::To]
            .into_iter()
            .find_map(|dir| self.single_pointer(dir.tag()).map(|xref| (dir, xref)))
    }
    pub fn set_corresponder(&mut self, dir: CommunicationDir, xref: &str) {
        self.node.delete_tag("FROM");
        self.node.delete_tag("TO");
        self.set_single_pointer(dir.tag(), Some(xref));
    }

    /// The text a record is known by: the name, title, goal or note text
    /// depending on its type.
    pub fn principal_name(&self) -> String {
        match self.record_type {
            RecordType::Individual => self.primary_name().full_name(),
            RecordType::Source => {
                let title = self.title().trim();
                if title.is_empty() { self.short_title().trim().to_string() } else { title.to_string() }
            }
            RecordType::Note => self.text().trim().to_string(),
            RecordType::Multimedia => self
                .file_references()
                .first()
                .map_or(String::new(), |f| f.title.trim().to_string()),
            RecordType::Task => self.goal().trim().to_string(),
            RecordType::Family => String::new(),
            _ => self.name().trim().to_string(),
        }
    }
}
