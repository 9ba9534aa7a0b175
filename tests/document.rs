use gedcore::enums::{GoalType, Sex};
use gedcore::record::{Record, RecordType};
use gedcore::tree::Document;

struct Family {
    document: Document,
    family: String,
    father: String,
    mother: String,
    child: String,
}

fn setup() -> Family {
    let mut document = Document::new();
    let father = document.create_individual_with("Ivan", "Dub", "", Sex::Male).xref().to_string();
    let mother = document.create_individual_with("Anna", "Dub", "", Sex::Female).xref().to_string();
    let child = document.create_individual_with("Petr", "Dub", "", Sex::Male).xref().to_string();
    let family = document.create_family().xref().to_string();
    assert!(document.add_spouse(&family, &father));
    assert!(document.add_spouse(&family, &mother));
    assert!(document.add_child(&family, &child));
    Family { document, family, father, mother, child }
}

#[test]
fn factories_assign_identity() {
    let mut document = Document::new();
    let id = document.id();
    let individual = document.create_individual();
    assert_eq!(individual.xref(), "I1");
    assert!(!individual.uid().is_empty());
    assert!(individual.change_date().is_some());
    assert_eq!(individual.owner(), Some(id));
    assert_eq!(document.create_research().xref(), "RS1");
    assert_eq!(document.create_task().xref(), "TK1");
    assert_eq!(document.create_communication().xref(), "CM1");
    assert_eq!(document.create_submitter().xref(), "SUBM1");
    assert_eq!(document.create_submission().xref(), "SUBN1");
    assert_eq!(document.create_multimedia().xref(), "O1");
    assert_eq!(document.create_location().xref(), "L1");
    assert_eq!(document.create_repository().xref(), "R1");
    assert_eq!(document.create_individual().xref(), "I2");
    assert_eq!(document.len(), 10);
}

#[test]
fn lookups_accept_enclosed_xrefs() {
    let family = setup();
    let document = &family.document;
    let father = document.find_by_xref(&format!("@{}@", family.father)).expect("father by enclosed xref");
    assert_eq!(father.xref(), family.father);
    let uid = father.uid().to_string();
    assert_eq!(document.find_by_uid(&uid).map(Record::xref), Some(family.father.as_str()));
    assert!(document.find_by_uid("").is_none());
    assert!(document.find_by_xref("I99").is_none());
    assert_eq!(document.index_of(&family.family), Some(3));
    assert_eq!(document.records_of(RecordType::Individual).count(), 3);
}

#[test]
fn uids_are_unique() {
    let mut document = Document::new();
    let a = document.create_note().uid().to_string();
    let b = document.create_note().uid().to_string();
    assert_ne!(a, b);
    assert_eq!(a.len(), 36);
}

#[test]
fn relationships_are_kept_on_both_sides() {
    let family = setup();
    let document = &family.document;
    let record = document.find_by_xref(&family.family).expect("family exists");
    assert_eq!(record.husband().as_deref(), Some(family.father.as_str()));
    assert_eq!(record.wife().as_deref(), Some(family.mother.as_str()));
    assert_eq!(record.children(), vec![family.child.clone()]);
    let child = document.find_by_xref(&family.child).expect("child exists");
    assert_eq!(child.child_to_family_links(), vec![family.family.clone()]);
    let father = document.find_by_xref(&family.father).expect("father exists");
    assert_eq!(father.spouse_to_family_links(), vec![family.family.clone()]);
}

#[test]
fn adding_twice_does_not_duplicate() {
    let mut family = setup();
    assert!(family.document.add_child(&family.family, &family.child));
    let record = family.document.find_by_xref(&family.family).expect("family exists");
    assert_eq!(record.children().len(), 1);
}

#[test]
fn spouse_needs_a_known_sex() {
    let mut family = setup();
    let unknown = family.document.create_individual().xref().to_string();
    assert!(!family.document.add_spouse(&family.family, &unknown));
    assert!(!family.document.add_spouse(&family.family, "I99"));
    // wrong record types
    assert!(!family.document.add_child(&family.father, &family.child));
}

#[test]
fn replacing_a_spouse_unlinks_the_previous_one() {
    let mut family = setup();
    let second = family
        .document
        .create_individual_with("Oleg", "Sokol", "", Sex::Male)
        .xref()
        .to_string();
    assert!(family.document.add_spouse(&family.family, &second));
    let record = family.document.find_by_xref(&family.family).expect("family exists");
    assert_eq!(record.husband().as_deref(), Some(second.as_str()));
    let father = family.document.find_by_xref(&family.father).expect("father exists");
    assert!(father.spouse_to_family_links().is_empty());
}

#[test]
fn removing_links() {
    let mut family = setup();
    assert!(family.document.remove_child(&family.family, &family.child));
    assert!(family.document.remove_spouse(&family.family, &family.mother));
    let record = family.document.find_by_xref(&family.family).expect("family exists");
    assert!(record.children().is_empty());
    assert_eq!(record.wife(), None);
    let mother = family.document.find_by_xref(&family.mother).expect("mother exists");
    assert!(mother.spouse_to_family_links().is_empty());
}

#[test]
fn deleting_a_family_cleans_its_members() {
    let mut family = setup();
    assert!(family.document.delete_family_record(Some(family.family.as_str())));
    assert!(family.document.find_by_xref(&family.family).is_none());
    for xref in [&family.father, &family.mother, &family.child] {
        let member = family.document.find_by_xref(xref).expect("member survives");
        assert!(member.child_to_family_links().is_empty());
        assert!(member.spouse_to_family_links().is_empty());
    }
    assert_eq!(family.document.len(), 3);
}

#[test]
fn deleting_an_individual_cleans_families_and_groups() {
    let mut family = setup();
    let group = family.document.create_group().xref().to_string();
    assert!(family.document.add_group_member(&group, &family.child));
    let uid = family.document.find_by_xref(&family.child).expect("child").uid().to_string();
    assert!(family.document.delete_individual_record(Some(family.child.as_str())));
    assert!(family.document.find_by_uid(&uid).is_none());
    let record = family.document.find_by_xref(&family.family).expect("family exists");
    assert!(record.children().is_empty());
    let group = family.document.find_by_xref(&group).expect("group exists");
    assert!(group.members().is_empty());

    assert!(family.document.delete_individual_record(Some(family.father.as_str())));
    let record = family.document.find_by_xref(&family.family).expect("family exists");
    assert_eq!(record.husband(), None);
    assert_eq!(record.wife().as_deref(), Some(family.mother.as_str()));
}

#[test]
fn deleting_a_group_cleans_its_members() {
    let mut family = setup();
    let group = family.document.create_group().xref().to_string();
    assert!(family.document.add_group_member(&group, &family.father));
    assert!(family.document.add_group_member(&group, &family.mother));
    assert_eq!(family.document.find_by_xref(&group).expect("group").members().len(), 2);
    assert!(family.document.delete_group_record(Some(group.as_str())));
    let father = family.document.find_by_xref(&family.father).expect("father");
    assert!(father.group_links().is_empty());
}

#[test]
fn deleting_other_records_sweeps_pointers() {
    let mut family = setup();
    let note = family.document.create_note().xref().to_string();
    let source = family.document.create_source().xref().to_string();
    {
        let father = family.document.find_by_xref_mut(&family.father).expect("father");
        father.add_note_link(&note);
        father.add_source_citation(&source, "p. 12", 3);
        let birth = father.add_event("BIRT", "", "1900", "");
        birth.add_pointer(gedcore::tag::standard_factory(), "SOUR", &source);
    }
    assert!(family.document.delete_note_record(Some(note.as_str())));
    assert!(family.document.delete_source_record(Some(source.as_str())));
    let father = family.document.find_by_xref(&family.father).expect("father");
    assert!(father.notes().is_empty());
    assert!(father.source_citations().is_empty());
    let birth = father.find_event_node("BIRT").expect("birth survives");
    assert_eq!(birth.tag_count("SOUR"), 0);
    assert_eq!(birth.tag_string("DATE"), "1900");
}

#[test]
fn typed_deletes_refuse_wrong_input() {
    let mut family = setup();
    assert!(!family.document.delete_family_record(None));
    assert!(!family.document.delete_family_record(Some("F99")));
    assert!(!family.document.delete_family_record(Some(family.father.as_str())));
    assert!(!family.document.delete_note_record(Some(family.family.as_str())));
    assert!(!family.document.delete_media_record(Some(family.family.as_str())));
    assert!(!family.document.delete_repository_record(Some(family.family.as_str())));
    assert!(!family.document.delete_research_record(Some(family.family.as_str())));
    assert!(!family.document.delete_task_record(Some(family.family.as_str())));
    assert!(!family.document.delete_communication_record(Some(family.family.as_str())));
    assert!(!family.document.delete_location_record(Some(family.family.as_str())));
    assert_eq!(family.document.len(), 4);
}

#[test]
fn deleted_xrefs_are_not_reused() {
    let mut document = Document::new();
    let first = document.create_note().xref().to_string();
    assert!(document.delete_record(&first));
    assert_eq!(document.create_note().xref(), "N2");
}

#[test]
fn extract_keeps_links() {
    let mut family = setup();
    let child = family.document.extract(&family.child).expect("child extracted");
    assert_eq!(child.owner(), None);
    assert!(family.document.find_by_xref(&family.child).is_none());
    let record = family.document.find_by_xref(&family.family).expect("family exists");
    assert_eq!(record.children(), vec![family.child.clone()]);
    // the extracted record can be added back under the same xref
    family.document.add_record(child).expect("xref is free again");
    assert!(family.document.find_by_xref(&family.child).is_some());
    assert!(family.document.add_record(Record::new(None, RecordType::Note, &family.child)).is_err());
}

#[test]
fn task_goals_resolve() {
    let mut family = setup();
    let task = family.document.create_task();
    task.set_goal(&format!("@{}@", family.father));
    let task = task.xref().to_string();
    let other = family.document.create_task();
    other.set_goal("Find the parish register");
    let other = other.xref().to_string();

    let document = &family.document;
    let (kind, target) = document.task_goal(document.find_by_xref(&task).expect("task"));
    assert_eq!(kind, GoalType::Individual);
    assert_eq!(target.map(Record::xref), Some(family.father.as_str()));
    let (kind, target) = document.task_goal(document.find_by_xref(&other).expect("task"));
    assert_eq!(kind, GoalType::Other);
    assert!(target.is_none());
}

#[test]
fn import_renumbers_and_rewrites_pointers() {
    let family = setup();
    let mut target = Document::new();
    target.create_individual();
    let replacer = target.import_records(&family.document);
    assert_eq!(replacer.len(), 4);
    assert_eq!(target.len(), 5);
    let new_family = replacer.find_new_xref(&family.family);
    let new_father = replacer.find_new_xref(&family.father);
    assert_eq!(new_father, "I2");
    let record = target.find_by_xref(&new_family).expect("imported family");
    assert_eq!(record.husband(), Some(new_father.clone()));
    assert_eq!(record.owner(), Some(target.id()));
    let father = target.find_by_xref(&new_father).expect("imported father");
    assert_eq!(father.spouse_to_family_links(), vec![new_family]);
}

#[test]
fn clear_empties_everything() {
    let mut family = setup();
    family.document.clear();
    assert!(family.document.is_empty());
    assert!(family.document.find_by_xref(&family.father).is_none());
    assert_eq!(family.document.create_individual().xref(), "I1");
}

#[test]
fn duplicate_uids_are_replaced_on_load() {
    let text = "0 HEAD\r\n0 @I1@ INDI\r\n1 _UID ABC\r\n0 @I2@ INDI\r\n1 _UID ABC\r\n0 TRLR\r\n";
    let mut document = Document::parse_str(text).expect("loads");
    assert_eq!(document.find_by_uid("ABC").map(Record::xref), Some("I1"));
    let second = document.find_by_xref("I2").map(|r| r.uid().to_string()).unwrap_or_default();
    assert!(!second.is_empty());
    assert_ne!(second, "ABC");
    assert_eq!(document.find_by_uid(&second).map(Record::xref), Some("I2"));

    assert!(document.delete_record("I2"));
    assert_eq!(document.find_by_uid("ABC").map(Record::xref), Some("I1"));
    assert!(document.find_by_uid(&second).is_none());
}
