use gedcore::error::GedcomError;
use gedcore::io::node_to_string;
use gedcore::record::RecordType;
use gedcore::tag::{TagFactory, TagKind, TagNode};

fn setup() -> (TagFactory, TagNode) {
    let factory = TagFactory::standard();
    let individual = TagNode::new(None, TagKind::Record(RecordType::Individual), "INDI", "");
    (factory, individual)
}

#[test]
fn registered_and_unknown_tags() {
    let (factory, mut individual) = setup();
    let date = factory
        .create_tag(None, &mut individual, "DATE", "20 JAN 2013")
        .expect("DATE is registered");
    assert_eq!(date.kind(), TagKind::Date);
    let err = factory.create_tag(None, &mut individual, "TEST", "").unwrap_err();
    assert!(matches!(err, GedcomError::UnknownTagKind(ref name) if name == "TEST"));
    // the failed creation leaves no child behind
    assert_eq!(individual.children().len(), 1);
}

#[test]
fn empty_registry_knows_nothing() {
    let factory = TagFactory::new();
    assert!(!factory.is_registered("DATE"));
    assert!(factory.build(None, TagKind::Generic, "DATE", "").is_err());
}

#[test]
fn kinds_depend_on_parent() {
    let (factory, mut individual) = setup();
    assert_eq!(individual.add_tag(&factory, "NAME", "Ivan /Dub/").kind(), TagKind::PersonalName);
    assert_eq!(individual.add_tag(&factory, "BIRT", "").kind(), TagKind::IndividualEvent);
    assert_eq!(individual.add_tag(&factory, "OCCU", "smith").kind(), TagKind::Attribute);
    let mut repository = TagNode::new(None, TagKind::Record(RecordType::Repository), "REPO", "");
    assert_eq!(repository.add_tag(&factory, "NAME", "Archive").kind(), TagKind::Generic);
    let mut family = TagNode::new(None, TagKind::Record(RecordType::Family), "FAM", "");
    assert_eq!(family.add_tag(&factory, "MARR", "").kind(), TagKind::FamilyEvent);
    assert_eq!(family.add_tag(&factory, "RESI", "").kind(), TagKind::FamilyEvent);
    assert_eq!(family.add_tag(&factory, "HUSB", "@I1@").kind(), TagKind::Pointer);
}

#[test]
fn notes_are_text_or_pointer() {
    let (factory, mut individual) = setup();
    assert_eq!(individual.add_tag(&factory, "NOTE", "@N1@").kind(), TagKind::Pointer);
    assert_eq!(individual.add_tag(&factory, "NOTE", "free text").kind(), TagKind::Text);
}

#[test]
fn continuation_lines_extend_the_value() {
    let (factory, mut individual) = setup();
    let note = individual.add_tag(&factory, "NOTE", "first");
    note.add_tag(&factory, "CONT", "second");
    note.add_tag(&factory, "CONC", " and more");
    assert_eq!(note.value(), "first\nsecond and more");
    assert!(note.children().is_empty());
}

#[test]
fn attribute_routes_details_but_not_continuations() {
    let (factory, mut individual) = setup();
    let occupation = individual.add_tag(&factory, "OCCU", "black");
    occupation.add_tag(&factory, "CONC", "smith");
    occupation.add_tag(&factory, "DATE", "1900");
    assert_eq!(occupation.value(), "blacksmith");
    assert_eq!(occupation.children().len(), 1);
    assert_eq!(occupation.children()[0].kind(), TagKind::Detail);
    assert_eq!(occupation.tag_string("DATE"), "1900");
    assert_eq!(node_to_string(occupation, 1), "1 OCCU blacksmith\r\n2 DATE 1900\r\n");
}

#[test]
fn unknown_tags_round_trip_as_generic() {
    let (factory, mut individual) = setup();
    let custom = individual.add_tag(&factory, "_CUSTOM", "value");
    assert_eq!(custom.kind(), TagKind::Generic);
    custom.add_tag(&factory, "_SUB", "inner");
    assert_eq!(node_to_string(&individual, 0), "0 INDI\r\n1 _CUSTOM value\r\n2 _SUB inner\r\n");
}

#[test]
fn custom_constructor_overrides_standard() {
    fn always_text(owner: Option<gedcore::tag::DocumentId>, _parent: TagKind, name: &str, value: &str) -> TagNode {
        TagNode::new(owner, TagKind::Text, name, value)
    }
    let (mut factory, mut individual) = setup();
    factory.register_tag("DATE", always_text);
    assert_eq!(individual.add_tag(&factory, "DATE", "x").kind(), TagKind::Text);
}

#[test]
fn paths_and_pointer_edits() {
    let (factory, mut individual) = setup();
    individual.set_tag_string(&factory, "MAP:LATI", "N55.75");
    assert_eq!(individual.tag_string("MAP:LATI"), "N55.75");
    assert_eq!(individual.tag_integer("MAP:LATI", -1), -1);
    individual.add_pointer(&factory, "FAMS", "F1");
    individual.add_pointer(&factory, "FAMS", "@F2@");
    assert_eq!(individual.pointers("FAMS"), vec!["F1".to_string(), "F2".to_string()]);
    assert!(individual.remove_pointer("FAMS", "@F1@"));
    assert!(!individual.remove_pointer("FAMS", "F1"));
    assert_eq!(individual.tag_count("FAMS"), 1);
}
