//! The document: an arena of records plus the indexes that find them.
//!
//! Records live in `slots` and are addressed by [`RecordId`]. Deleting a
//! record empties its slot, so ids handed out earlier never alias another
//! record. The serialization order is kept separately in `order`.
//!
//! Relationships between records (child and spouse links, group membership)
//! are xref strings on both sides. Every operation that edits one side here
//! also edits the other, and deleting a record first strips the links that
//! point at it.

// used to keep the one-to-one mapping between old and new xrefs on import
use bimap::BiMap;

// the indexes use HashMap with a fast hasher
use core::hash::BuildHasherDefault;
use std::collections::HashMap;
use seahash::SeaHasher;

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::enums::{GoalType, Sex};
use crate::error::{GedcomError, Result};
use crate::record::{Record, RecordType};
use crate::structure::PersonalName;
use crate::tag::{DocumentId, TagFactory, TagKind, TagNode};
use crate::utils::{clean_xref, encode_uid, is_pointer};

pub type XRefHasher = BuildHasherDefault<SeaHasher>;
pub type RecordId = usize;

// ------------- XRefGenerator -------------

/// Hands out xrefs per prefix, always above the highest one seen.
///
/// Unlike identities that are only ever referenced internally, xrefs of
/// deleted records are never handed out again, since external notes and
/// earlier exports may still mention them.
#[derive(Debug, Default)]
pub struct XRefGenerator {
    lower_bounds: HashMap<String, u64, XRefHasher>,
}

impl XRefGenerator {
    pub fn new() -> Self {
        Self { lower_bounds: HashMap::default() }
    }
    /// Splits `RS12` into `("RS", 12)`; xrefs without a numeric tail give `None`.
    pub fn split(xref: &str) -> Option<(&str, u64)> {
        let xref = clean_xref(xref);
        let digits = xref.bytes().rev().take_while(u8::is_ascii_digit).count();
        if digits == 0 || digits == xref.len() {
            return None;
        }
        let (prefix, number) = xref.split_at(xref.len() - digits);
        number.parse().ok().map(|n| (prefix, n))
    }
    // The retain function is necessary when loading an existing
    // document, so that generated xrefs do not collide with read ones.
    pub fn retain(&mut self, xref: &str) {
        if let Some((prefix, number)) = Self::split(xref) {
            let bound = self.lower_bounds.entry(prefix.to_string()).or_insert(0);
            if number > *bound {
                *bound = number;
            }
        }
    }
    pub fn generate(&mut self, prefix: &str) -> String {
        let bound = self.lower_bounds.entry(prefix.to_string()).or_insert(0);
        *bound += 1;
        format!("{}{}", prefix, bound)
    }
    pub fn clear(&mut self) {
        self.lower_bounds.clear();
    }
}

// ------------- XRefReplacer -------------

/// Old to new xref mapping built while records are copied between documents.
#[derive(Debug, Default)]
pub struct XRefReplacer {
    map: BiMap<String, String>,
}

impl XRefReplacer {
    pub fn new() -> Self {
        Self { map: BiMap::new() }
    }
    pub fn add_xref(&mut self, old: &str, new: &str) {
        self.map.insert(clean_xref(old).to_string(), clean_xref(new).to_string());
    }
    /// The new xref for `old`, or `old` itself when it was not remapped.
    pub fn find_new_xref(&self, old: &str) -> String {
        let old = clean_xref(old);
        self.map.get_by_left(old).map_or_else(|| old.to_string(), String::clone)
    }
    pub fn find_old_xref(&self, new: &str) -> Option<&str> {
        self.map.get_by_right(clean_xref(new)).map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(old, new)| (old.as_str(), new.as_str()))
    }
}

// ------------- Document -------------

pub struct Document {
    id: DocumentId,
    header: TagNode,
    // owns the records, deleted ones leave an empty slot
    slots: Vec<Option<Record>>,
    order: Vec<RecordId>,
    // lookups, similar to database indexes
    xref_index: HashMap<String, RecordId, XRefHasher>,
    uid_index: HashMap<String, RecordId, XRefHasher>,
    factory: TagFactory,
    xref_generator: XRefGenerator,
    uid_counter: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_factory(TagFactory::standard())
    }
    pub fn with_factory(factory: TagFactory) -> Self {
        let id = DocumentId::next();
        Self {
            id,
            header: TagNode::new(Some(id), TagKind::Generic, "HEAD", ""),
            slots: Vec::new(),
            order: Vec::new(),
            xref_index: HashMap::default(),
            uid_index: HashMap::default(),
            factory,
            xref_generator: XRefGenerator::new(),
            uid_counter: 0,
        }
    }
    /// An empty document with this one's identity and registry, to be filled
    /// and then swapped in.
    pub(crate) fn blank(&self) -> Document {
        let mut document = Self::with_factory(self.factory.clone());
        document.id = self.id;
        document.header.reset_owner(Some(self.id));
        document
    }
    pub fn id(&self) -> DocumentId {
        self.id
    }
    pub fn header(&self) -> &TagNode {
        &self.header
    }
    pub fn header_mut(&mut self) -> &mut TagNode {
        &mut self.header
    }
    pub fn factory(&self) -> &TagFactory {
        &self.factory
    }
    pub fn factory_mut(&mut self) -> &mut TagFactory {
        &mut self.factory
    }
    /// Number of live records.
    pub fn len(&self) -> usize {
        self.order.len()
    }
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
    /// Records in serialization order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.order.iter().filter_map(move |id| self.slots[*id].as_ref())
    }
    pub fn records_of(&self, record_type: RecordType) -> impl Iterator<Item = &Record> {
        self.records().filter(move |r| r.record_type() == record_type)
    }
    /// Live record count per type, in type order.
    pub fn statistics(&self) -> Vec<(RecordType, usize)> {
        let mut counts: Vec<(RecordType, usize)> = Vec::new();
        for record in self.records() {
            match counts.iter_mut().find(|(t, _)| *t == record.record_type()) {
                Some((_, n)) => *n += 1,
                None => counts.push((record.record_type(), 1)),
            }
        }
        counts.sort();
        counts
    }

    // ------------- Lookup -------------

    pub fn record_id(&self, xref: &str) -> Option<RecordId> {
        self.xref_index.get(clean_xref(xref)).copied()
    }
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.slots.get(id).and_then(Option::as_ref)
    }
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }
    pub fn find_by_xref(&self, xref: &str) -> Option<&Record> {
        self.get(self.record_id(xref)?)
    }
    pub fn find_by_xref_mut(&mut self, xref: &str) -> Option<&mut Record> {
        let id = self.record_id(xref)?;
        self.get_mut(id)
    }
    pub fn find_by_uid(&self, uid: &str) -> Option<&Record> {
        if uid.is_empty() {
            return None;
        }
        self.get(*self.uid_index.get(uid)?)
    }
    /// Position of a record in serialization order.
    pub fn index_of(&self, xref: &str) -> Option<usize> {
        let id = self.record_id(xref)?;
        self.order.iter().position(|x| *x == id)
    }
    fn find_typed(&self, xref: &str, record_type: RecordType) -> Option<RecordId> {
        let id = self.record_id(xref)?;
        (self.get(id)?.record_type() == record_type).then_some(id)
    }
    /// Both records mutably at once; `None` if either is missing or they are the same.
    fn pair_mut(&mut self, a: RecordId, b: RecordId) -> Option<(&mut Record, &mut Record)> {
        if a == b || a >= self.slots.len() || b >= self.slots.len() {
            return None;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (left, right) = self.slots.split_at_mut(high);
        let low_record = left[low].as_mut()?;
        let high_record = right[0].as_mut()?;
        if a < b {
            Some((low_record, high_record))
        } else {
            Some((high_record, low_record))
        }
    }

    // ------------- Adding records -------------

    /// Registers a record built elsewhere. An empty xref gets a generated one,
    /// except on unrecognized records, which stay unaddressable and are only
    /// kept for writing back. A UID already in use is replaced.
    pub fn add_record(&mut self, mut record: Record) -> Result<RecordId> {
        let addressable = !record.xref().is_empty() || record.record_type() != RecordType::Other;
        if record.xref().is_empty() && addressable {
            let xref = self.next_xref(record.record_type());
            record.set_xref(&xref);
        }
        if addressable && self.xref_index.contains_key(record.xref()) {
            return Err(GedcomError::MalformedXRef(format!("duplicate xref '{}'", record.xref())));
        }
        if self.uid_index.contains_key(record.uid()) {
            let uid = self.new_uid();
            warn!(xref = %record.xref(), old = %record.uid(), new = %uid, "duplicate uid replaced");
            record.set_uid(&uid);
        }
        record.reset_owner(Some(self.id));
        let id = self.slots.len();
        if addressable {
            self.xref_generator.retain(record.xref());
            self.xref_index.insert(record.xref().to_string(), id);
        }
        if !record.uid().is_empty() {
            self.uid_index.insert(record.uid().to_string(), id);
        }
        self.slots.push(Some(record));
        self.order.push(id);
        Ok(id)
    }
    fn next_xref(&mut self, record_type: RecordType) -> String {
        loop {
            let xref = self.xref_generator.generate(record_type.xref_prefix());
            if !self.xref_index.contains_key(&xref) {
                return xref;
            }
        }
    }
    /// A fresh checksum UID keyed on this document, a counter and the clock.
    pub fn new_uid(&mut self) -> String {
        self.uid_counter += 1;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.id.value().to_le_bytes());
        hasher.update(&self.uid_counter.to_le_bytes());
        hasher.update(&nanos.to_le_bytes());
        let hash = hasher.finalize();
        encode_uid(&hash.as_bytes()[..16])
    }
    /// Creates an empty record with a new xref, UID and change date.
    pub fn create_record(&mut self, record_type: RecordType) -> &mut Record {
        let xref = self.next_xref(record_type);
        let uid = self.new_uid();
        let mut record = Record::new(Some(self.id), record_type, &xref);
        record.set_uid(&uid);
        record.touch();
        let id = self.slots.len();
        debug!(xref = %xref, kind = %record_type, "record created");
        self.xref_index.insert(xref, id);
        self.uid_index.insert(uid, id);
        self.slots.push(None);
        self.order.push(id);
        self.slots[id].get_or_insert(record)
    }
    pub fn create_individual(&mut self) -> &mut Record {
        self.create_record(RecordType::Individual)
    }
    /// An individual with one personal name and a sex.
    pub fn create_individual_with(&mut self, first_part: &str, surname: &str, last_part: &str, sex: Sex) -> &mut Record {
        let record = self.create_individual();
        record.add_personal_name(&PersonalName::new(first_part, surname, last_part));
        record.set_sex(sex);
        record
    }
    pub fn create_family(&mut self) -> &mut Record {
        self.create_record(RecordType::Family)
    }
    pub fn create_note(&mut self) -> &mut Record {
        self.create_record(RecordType::Note)
    }
    pub fn create_source(&mut self) -> &mut Record {
        self.create_record(RecordType::Source)
    }
    pub fn create_repository(&mut self) -> &mut Record {
        self.create_record(RecordType::Repository)
    }
    pub fn create_multimedia(&mut self) -> &mut Record {
        self.create_record(RecordType::Multimedia)
    }
    pub fn create_group(&mut self) -> &mut Record {
        self.create_record(RecordType::Group)
    }
    pub fn create_research(&mut self) -> &mut Record {
        self.create_record(RecordType::Research)
    }
    pub fn create_task(&mut self) -> &mut Record {
        self.create_record(RecordType::Task)
    }
    pub fn create_communication(&mut self) -> &mut Record {
        self.create_record(RecordType::Communication)
    }
    pub fn create_location(&mut self) -> &mut Record {
        self.create_record(RecordType::Location)
    }
    pub fn create_submitter(&mut self) -> &mut Record {
        self.create_record(RecordType::Submitter)
    }
    pub fn create_submission(&mut self) -> &mut Record {
        self.create_record(RecordType::Submission)
    }

    // ------------- Removing records -------------

    /// Detaches a record without touching the links that point at it.
    pub fn extract(&mut self, xref: &str) -> Option<Record> {
        let id = self.record_id(xref)?;
        let mut record = self.slots.get_mut(id)?.take()?;
        self.xref_index.remove(record.xref());
        if self.uid_index.get(record.uid()) == Some(&id) {
            self.uid_index.remove(record.uid());
        }
        self.order.retain(|x| *x != id);
        record.reset_owner(None);
        Some(record)
    }
    /// Deletes a record of any type after cleaning the links to it.
    pub fn delete_record(&mut self, xref: &str) -> bool {
        let Some(id) = self.record_id(xref) else {
            return false;
        };
        let Some(record_type) = self.get(id).map(Record::record_type) else {
            return false;
        };
        let xref = clean_xref(xref).to_string();
        match record_type {
            RecordType::Family => self.clean_family(&xref),
            RecordType::Individual => self.clean_individual(&xref),
            RecordType::Group => self.clean_group(&xref),
            _ => {}
        }
        let swept = self.sweep_pointers(&xref);
        debug!(xref = %xref, kind = %record_type, swept, "record deleted");
        self.extract(&xref).is_some()
    }
    fn delete_typed(&mut self, xref: Option<&str>, record_type: RecordType) -> bool {
        match xref {
            Some(xref) if self.find_typed(xref, record_type).is_some() => self.delete_record(xref),
            _ => false,
        }
    }
    pub fn delete_family_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Family)
    }
    pub fn delete_individual_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Individual)
    }
    pub fn delete_group_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Group)
    }
    pub fn delete_note_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Note)
    }
    pub fn delete_source_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Source)
    }
    pub fn delete_repository_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Repository)
    }
    pub fn delete_media_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Multimedia)
    }
    pub fn delete_research_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Research)
    }
    pub fn delete_task_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Task)
    }
    pub fn delete_communication_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Communication)
    }
    pub fn delete_location_record(&mut self, xref: Option<&str>) -> bool {
        self.delete_typed(xref, RecordType::Location)
    }
    /// Empties the document, keeping its identity and registry.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
        self.xref_index.clear();
        self.uid_index.clear();
        self.xref_generator.clear();
        self.header.clear();
    }

    // ------------- Cascading cleanup -------------

    fn clean_family(&mut self, family: &str) {
        let Some(record) = self.find_by_xref(family) else {
            return;
        };
        let children = record.children();
        let spouses: Vec<String> = record.husband().into_iter().chain(record.wife()).collect();
        for child in &children {
            if let Some(child) = self.find_by_xref_mut(child) {
                child.remove_pointer("FAMC", family);
            }
        }
        for spouse in &spouses {
            if let Some(spouse) = self.find_by_xref_mut(spouse) {
                spouse.remove_pointer("FAMS", family);
            }
        }
        if let Some(record) = self.find_by_xref_mut(family) {
            record.set_husband(None);
            record.set_wife(None);
            record.node_mut().delete_tag("CHIL");
        }
    }
    fn clean_individual(&mut self, individual: &str) {
        let Some(record) = self.find_by_xref(individual) else {
            return;
        };
        let parents = record.child_to_family_links();
        let families = record.spouse_to_family_links();
        let groups = record.group_links();
        for family in &parents {
            if let Some(family) = self.find_by_xref_mut(family) {
                family.remove_pointer("CHIL", individual);
            }
        }
        for family in &families {
            if let Some(family) = self.find_by_xref_mut(family) {
                if family.husband().as_deref() == Some(clean_xref(individual)) {
                    family.set_husband(None);
                }
                if family.wife().as_deref() == Some(clean_xref(individual)) {
                    family.set_wife(None);
                }
            }
        }
        for group in &groups {
            if let Some(group) = self.find_by_xref_mut(group) {
                group.remove_pointer("_MEMBER", individual);
            }
        }
    }
    fn clean_group(&mut self, group: &str) {
        let members = self.find_by_xref(group).map(Record::members).unwrap_or_default();
        for member in &members {
            if let Some(member) = self.find_by_xref_mut(member) {
                member.remove_pointer("_GROUP", group);
            }
        }
    }
    /// Drops every remaining pointer to `xref`, wherever it sits.
    fn sweep_pointers(&mut self, xref: &str) -> usize {
        self.slots
            .iter_mut()
            .flatten()
            .filter(|r| r.xref() != xref)
            .map(|r| r.node_mut().remove_pointers_to(xref))
            .sum()
    }

    // ------------- Relationships -------------

    fn linked_pair(&mut self, a: &str, a_type: RecordType, b: &str, b_type: RecordType) -> Option<(&mut Record, &mut Record)> {
        let a = self.find_typed(a, a_type)?;
        let b = self.find_typed(b, b_type)?;
        self.pair_mut(a, b)
    }
    pub fn add_child(&mut self, family: &str, individual: &str) -> bool {
        match self.linked_pair(family, RecordType::Family, individual, RecordType::Individual) {
            Some((fam, indi)) => {
                let (f, i) = (fam.xref().to_string(), indi.xref().to_string());
                fam.add_pointer("CHIL", &i);
                indi.add_pointer("FAMC", &f);
                true
            }
            None => false,
        }
    }
    pub fn remove_child(&mut self, family: &str, individual: &str) -> bool {
        match self.linked_pair(family, RecordType::Family, individual, RecordType::Individual) {
            Some((fam, indi)) => {
                let (f, i) = (fam.xref().to_string(), indi.xref().to_string());
                let removed = fam.remove_pointer("CHIL", &i);
                indi.remove_pointer("FAMC", &f) || removed
            }
            None => false,
        }
    }
    /// Links a spouse by sex: males become `HUSB`, females `WIFE`.
    pub fn add_spouse(&mut self, family: &str, individual: &str) -> bool {
        let Some((fam, indi)) = self.linked_pair(family, RecordType::Family, individual, RecordType::Individual) else {
            return false;
        };
        let (f, i) = (fam.xref().to_string(), indi.xref().to_string());
        let previous = match indi.sex() {
            Sex::Male => {
                let previous = fam.husband();
                fam.set_husband(Some(&i));
                previous
            }
            Sex::Female => {
                let previous = fam.wife();
                fam.set_wife(Some(&i));
                previous
            }
            _ => return false,
        };
        indi.add_pointer("FAMS", &f);
        if let Some(previous) = previous.filter(|p| *p != i) {
            if let Some(previous) = self.find_by_xref_mut(&previous) {
                previous.remove_pointer("FAMS", &f);
            }
        }
        true
    }
    pub fn remove_spouse(&mut self, family: &str, individual: &str) -> bool {
        let Some((fam, indi)) = self.linked_pair(family, RecordType::Family, individual, RecordType::Individual) else {
            return false;
        };
        let (f, i) = (fam.xref().to_string(), indi.xref().to_string());
        if fam.husband().as_deref() == Some(i.as_str()) {
            fam.set_husband(None);
        }
        if fam.wife().as_deref() == Some(i.as_str()) {
            fam.set_wife(None);
        }
        indi.remove_pointer("FAMS", &f);
        true
    }
    pub fn add_group_member(&mut self, group: &str, individual: &str) -> bool {
        match self.linked_pair(group, RecordType::Group, individual, RecordType::Individual) {
            Some((grp, indi)) => {
                let (g, i) = (grp.xref().to_string(), indi.xref().to_string());
                grp.add_pointer("_MEMBER", &i);
                indi.add_pointer("_GROUP", &g);
                true
            }
            None => false,
        }
    }
    pub fn remove_group_member(&mut self, group: &str, individual: &str) -> bool {
        match self.linked_pair(group, RecordType::Group, individual, RecordType::Individual) {
            Some((grp, indi)) => {
                let (g, i) = (grp.xref().to_string(), indi.xref().to_string());
                let removed = grp.remove_pointer("_MEMBER", &i);
                indi.remove_pointer("_GROUP", &g) || removed
            }
            None => false,
        }
    }
    /// Resolves a task's goal: a pointer to a known record or free text.
    pub fn task_goal(&self, task: &Record) -> (GoalType, Option<&Record>) {
        let goal = task.goal();
        if !is_pointer(goal) {
            return (GoalType::Other, None);
        }
        match self.find_by_xref(goal) {
            Some(target) => {
                let kind = match target.record_type() {
                    RecordType::Individual => GoalType::Individual,
                    RecordType::Family => GoalType::Family,
                    RecordType::Source => GoalType::Source,
                    _ => GoalType::Other,
                };
                (kind, Some(target))
            }
            None => (GoalType::Other, None),
        }
    }

    // ------------- Import -------------

    /// Copies every record of `other` into this document under fresh xrefs.
    ///
    /// Pointers inside the copies are rewritten to the new xrefs. UIDs are kept
    /// unless they are already taken, here or earlier in the same batch.
    pub fn import_records(&mut self, other: &Document) -> XRefReplacer {
        let mut replacer = XRefReplacer::new();
        let mut imported = Vec::with_capacity(other.len());
        for record in other.records() {
            let mut copy = record.clone();
            if !record.xref().is_empty() {
                let xref = self.next_xref(copy.record_type());
                replacer.add_xref(record.xref(), &xref);
                copy.set_xref(&xref);
            }
            if copy.uid().is_empty() && !copy.xref().is_empty() {
                let uid = self.new_uid();
                copy.set_uid(&uid);
            }
            imported.push(copy);
        }
        for mut copy in imported {
            copy.node_mut().remap_pointers(&|old: &str| replacer.find_new_xref(old));
            if let Err(e) = self.add_record(copy) {
                debug!(error = %e, "imported record skipped");
            }
        }
        debug!(records = replacer.len(), "records imported");
        replacer
    }
}
