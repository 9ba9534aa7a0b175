use gedcore::date::DateValue;
use gedcore::enums::{
    BaptismDateStatus, ChildSealingDateStatus, CommunicationDir, CommunicationType, EndowmentDateStatus, MediaType,
    MultimediaFormat, NameType, OrdinanceProcessFlag, PedigreeLinkage, ResearchPriority, ResearchStatus, Restriction,
    Sex, SpouseSealingDateStatus, TagEnum,
};
use gedcore::io::{node_to_string, record_to_string};
use gedcore::record::{Record, RecordType};
use gedcore::structure::{Address, CutoutPosition, FileReference, PersonalName};
use gedcore::tree::Document;

const INDIVIDUAL: &str = "0 HEAD\r\n\
1 CHAR UTF-8\r\n\
0 @I1@ INDI\r\n\
1 NAME Petr /Test/ Fedoroff\r\n\
2 TYPE birth\r\n\
2 SURN Test\r\n\
2 GIVN Petr\r\n\
2 NICK Pit\r\n\
1 SEX M\r\n\
1 BIRT\r\n\
2 DATE 20 SEP 1970\r\n\
2 PLAC test place\r\n\
1 FAMC @F1@\r\n\
2 PEDI adopted\r\n\
0 TRLR\r\n";

fn setup() -> Document {
    Document::parse_str(INDIVIDUAL).expect("sample should load")
}

#[test]
fn personal_name_stream() {
    let document = setup();
    let individual = document.find_by_xref("I1").expect("individual loaded");
    let name = individual.primary_name();
    assert_eq!(name.first_part, "Petr");
    assert_eq!(name.surname, "Test");
    assert_eq!(name.last_part, "Fedoroff");
    assert_eq!(name.name_type, NameType::Birth);
    assert_eq!(name.piece("GIVN"), "Petr");
    assert_eq!(name.nickname(), "Pit");
    assert_eq!(name.full_name(), "Petr Test Fedoroff");
    assert_eq!(individual.sex(), Sex::Male);
    assert_eq!(individual.pedigree_linkage("@F1@"), PedigreeLinkage::Adopted);

    let expected = &INDIVIDUAL["0 HEAD\r\n1 CHAR UTF-8\r\n".len()..INDIVIDUAL.len() - "0 TRLR\r\n".len()];
    assert_eq!(record_to_string(individual), expected);
}

#[test]
fn name_edits_keep_piece_order() {
    let mut document = setup();
    let individual = document.find_by_xref_mut("I1").expect("individual loaded");
    let mut name = individual.primary_name();
    name.name_type = NameType::Married;
    name.set_piece("NPFX", "Dr.");
    name.set_piece("GIVN", "");
    assert!(individual.set_personal_name(0, &name));
    assert!(!individual.set_personal_name(3, &name));
    let node = individual.node().find_tag("NAME", 0).expect("name node");
    assert_eq!(
        node_to_string(node, 1),
        "1 NAME Petr /Test/ Fedoroff\r\n2 TYPE married\r\n2 SURN Test\r\n2 NPFX Dr.\r\n2 NICK Pit\r\n"
    );
}

#[test]
fn name_parts_and_full_names() {
    let mut record = Record::new(None, RecordType::Individual, "I2");
    record.add_personal_name(&PersonalName::new("Ivan Ivanovich", "Fedoroff", ""));
    assert_eq!(
        record.name_parts(),
        ("Fedoroff".to_string(), "Ivan".to_string(), "Ivanovich".to_string())
    );
    assert_eq!(PersonalName::new("Petr", "Ivanov", "Fedoroff").full_name(), "Petr Ivanov Fedoroff");
    assert!(Record::new(None, RecordType::Individual, "I3").primary_name().is_empty());
}

#[test]
fn event_stream() {
    let document = setup();
    let individual = document.find_by_xref("I1").expect("individual loaded");
    let birth = individual.find_event_node("BIRT").expect("birth event");
    assert_eq!(node_to_string(birth, 0), "0 BIRT\r\n1 DATE 20 SEP 1970\r\n1 PLAC test place\r\n");
    let event = individual.find_event("BIRT").expect("birth event");
    assert_eq!(event.place, "test place");
    assert_eq!(event.date.to_string(), "20 SEP 1970");
    assert_eq!(individual.birth_date(), DateValue::parse("20 SEP 1970").expect("valid date"));
    assert!(individual.death_date().is_empty());
    assert_eq!(individual.events().len(), 1);
}

#[test]
fn research_record() {
    let mut research = Record::new(None, RecordType::Research, "RS1");
    research.set_name("Parish books");
    research.set_priority(ResearchPriority::Normal);
    research.set_status(ResearchStatus::OnHold);
    research.set_start_date(&DateValue::parse("20 JAN 2013").expect("valid date"));
    research.set_percent(33);
    assert_eq!(
        record_to_string(&research),
        "0 @RS1@ _RESEARCH\r\n1 NAME Parish books\r\n1 _PRIORITY normal\r\n1 _STATUS onhold\r\n\
1 _STARTDATE 20 JAN 2013\r\n1 _PERCENT 33\r\n"
    );
    assert_eq!(research.priority(), ResearchPriority::Normal);
    assert_eq!(research.status(), ResearchStatus::OnHold);
    assert_eq!(research.start_date().to_string(), "20 JAN 2013");
    assert!(research.stop_date().is_empty());
    assert_eq!(research.percent(), 33);
    research.set_priority(ResearchPriority::None);
    assert_eq!(research.tag_string("_PRIORITY"), "");
}

#[test]
fn group_record() {
    let mut group = Record::new(None, RecordType::Group, "G2");
    group.set_name("Test Group");
    assert_eq!(record_to_string(&group), "0 @G2@ _GROUP\r\n1 NAME Test Group\r\n");
    assert_eq!(group.principal_name(), "Test Group");
}

#[test]
fn address_stream() {
    let mut repository = Record::new(None, RecordType::Repository, "R1");
    let mut address = Address {
        lines: vec!["This".to_string(), "address".to_string(), "test".to_string()],
        phones: vec!["8 800 555".to_string()],
        emails: vec!["test@example.org".to_string()],
        faxes: vec!["8 800 556".to_string()],
        web_pages: vec!["www.example.org".to_string()],
        ..Address::default()
    };
    address.set_part("CITY", "Moscow");
    repository.set_address(&address);
    assert_eq!(
        record_to_string(&repository),
        "0 @R1@ REPO\r\n1 ADDR This\r\n2 CONT address\r\n2 CONT test\r\n2 CITY Moscow\r\n\
1 PHON 8 800 555\r\n1 EMAIL test@example.org\r\n1 FAX 8 800 556\r\n1 WWW www.example.org\r\n"
    );
    let read = repository.address();
    assert_eq!(read, address);
    assert_eq!(read.city(), "Moscow");
    repository.set_address(&Address::default());
    assert!(repository.address().is_empty());
}

#[test]
fn family_record() {
    let mut family = Record::new(None, RecordType::Family, "F1");
    family.set_restriction(Restriction::Locked);
    family.set_husband(Some("@I1@"));
    family.add_pointer("CHIL", "I3");
    family.add_event("MARR", "", "1 JUN 1990", "");
    assert_eq!(
        record_to_string(&family),
        "0 @F1@ FAM\r\n1 RESN locked\r\n1 HUSB @I1@\r\n1 CHIL @I3@\r\n1 MARR\r\n2 DATE 1 JUN 1990\r\n"
    );
    assert_eq!(family.restriction(), Restriction::Locked);
    assert_eq!(family.husband().as_deref(), Some("I1"));
    assert_eq!(family.wife(), None);
    assert_eq!(family.marriage_date().to_string(), "01 JUN 1990");
    // duplicates are refused
    assert!(!family.add_pointer("CHIL", "@I3@"));
}

#[test]
fn multimedia_record() {
    let mut media = Record::new(None, RecordType::Multimedia, "O1");
    media.add_file_reference(&FileReference::new("sample.JPG", "Sample", MediaType::Photo));
    assert_eq!(
        record_to_string(&media),
        "0 @O1@ OBJE\r\n1 FILE sample.JPG\r\n2 TITL Sample\r\n2 FORM jpg\r\n3 TYPE photo\r\n"
    );
    let files = media.file_references();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].format, MultimediaFormat::Jpg);
    assert_eq!(files[0].media_type, MediaType::Photo);
    assert_eq!(media.principal_name(), "Sample");

    assert_eq!(MultimediaFormat::recognize(""), MultimediaFormat::Unknown);
    assert_eq!(MultimediaFormat::recognize("sample.xxx"), MultimediaFormat::Unknown);
    assert_eq!(MultimediaFormat::recognize("scan.TIFF"), MultimediaFormat::Tif);
    assert_eq!(MultimediaFormat::recognize("dir.v1/file"), MultimediaFormat::Unknown);
    assert_eq!(MediaType::tag_at(15), "");
}

#[test]
fn cutout_links() {
    let mut individual = Record::new(None, RecordType::Individual, "I1");
    individual.add_multimedia_link("@O1@", "Face", CutoutPosition::parse("11 15 576 611"));
    assert_eq!(
        record_to_string(&individual),
        "0 @I1@ INDI\r\n1 OBJE @O1@\r\n2 TITL Face\r\n2 _POSITION 11 15 576 611\r\n"
    );
    let links = individual.multimedia_links();
    assert_eq!(links[0].xref, "O1");
    assert_eq!(links[0].cutout.map(|c| c.as_tuple()), Some((11, 15, 576, 611)));
    assert!(CutoutPosition::parse("11 15 576").is_none());
    assert!(CutoutPosition::parse("a b c d").is_none());
}

#[test]
fn communication_record() {
    let mut communication = Record::new(None, RecordType::Communication, "CM1");
    communication.set_name("Letter to the archive");
    communication.set_communication_type(CommunicationType::Letter);
    communication.set_date(&DateValue::parse("5 MAR 2014").expect("valid date"));
    communication.set_corresponder(CommunicationDir::From, "I1");
    communication.set_corresponder(CommunicationDir::To, "I2");
    assert_eq!(communication.communication_type(), CommunicationType::Letter);
    assert_eq!(communication.date().to_string(), "05 MAR 2014");
    assert_eq!(communication.corresponder(), Some((CommunicationDir::To, "I2".to_string())));
    assert_eq!(communication.node().tag_count("FROM"), 0);
}

#[test]
fn source_citations() {
    let mut individual = Record::new(None, RecordType::Individual, "I1");
    individual.add_source_citation("S1", "p. 12", 3);
    individual.add_tag("SOUR", "Family bible");
    let citations = individual.source_citations();
    assert_eq!(citations.len(), 2);
    assert_eq!(citations[0].xref, "S1");
    assert_eq!(citations[0].page, "p. 12");
    assert_eq!(citations[0].certainty, 3);
    assert_eq!(citations[1].xref, "");
    assert_eq!(citations[1].description, "Family bible");
    assert_eq!(citations[1].certainty, -1);
}

#[test]
fn source_and_note_records() {
    let mut source = Record::new(None, RecordType::Source, "S1");
    source.set_title("Parish register");
    source.set_originator("Church");
    source.set_publication("1890");
    source.add_pointer("REPO", "R1");
    assert_eq!(source.repository_citations(), vec!["R1".to_string()]);
    assert_eq!(source.principal_name(), "Parish register");

    let mut note = Record::new(None, RecordType::Note, "N1");
    note.add_text_line("first");
    note.add_text_line("second");
    assert_eq!(note.text(), "first\nsecond");
    assert_eq!(record_to_string(&note), "0 @N1@ NOTE first\r\n1 CONT second\r\n");
}

#[test]
fn individual_flags_and_associations() {
    let mut individual = Record::new(None, RecordType::Individual, "I1");
    individual.set_patriarch(true);
    individual.set_bookmark(true);
    individual.set_bookmark(false);
    individual.add_association("godfather", "I9");
    individual.add_user_reference("ref-1");
    assert!(individual.patriarch());
    assert!(!individual.bookmark());
    let associations = individual.associations();
    assert_eq!(associations[0].xref, "I9");
    assert_eq!(associations[0].relation, "godfather");
    assert_eq!(individual.user_references(), vec!["ref-1".to_string()]);
}

#[test]
fn enum_texts() {
    assert_eq!(Sex::from_tag(" m "), Sex::Male);
    assert_eq!(Sex::from_tag("x"), Sex::None);
    assert_eq!(Restriction::Locked.tag(), "locked");
    assert_eq!(ResearchStatus::from_tag("bogus"), ResearchStatus::Defined);
    assert_eq!(ResearchStatus::InProgress.to_string(), "inprogress");
    assert_eq!(CommunicationType::from_tag("EMAIL"), CommunicationType::EMail);
    assert_eq!(RecordType::from_tag("_LOC"), RecordType::Location);
    assert_eq!(RecordType::from_tag("_CUSTOM"), RecordType::Other);
    assert_eq!(RecordType::Submission.xref_prefix(), "SUBN");
}

#[test]
fn ordinance_statuses() {
    assert_eq!(BaptismDateStatus::from_tag("stillborn"), BaptismDateStatus::Stillborn);
    assert_eq!(BaptismDateStatus::Pre1970.tag(), "PRE-1970");
    assert_eq!(EndowmentDateStatus::from_tag(" Infant "), EndowmentDateStatus::Infant);
    assert_eq!(EndowmentDateStatus::from_tag("BIC"), EndowmentDateStatus::None);
    assert_eq!(ChildSealingDateStatus::from_tag("BIC"), ChildSealingDateStatus::Bic);
    assert_eq!(SpouseSealingDateStatus::from_tag("dns/can"), SpouseSealingDateStatus::DnsCan);
    assert_eq!(SpouseSealingDateStatus::Canceled.to_string(), "CANCELED");
    assert_eq!(OrdinanceProcessFlag::from_tag("YES"), OrdinanceProcessFlag::Yes);
    assert_eq!(OrdinanceProcessFlag::No.tag(), "no");
    assert_eq!(OrdinanceProcessFlag::from_tag(""), OrdinanceProcessFlag::None);
}

#[test]
fn empty_detail_tags_are_not_written() {
    let mut document = Document::new();
    let source = document.create_source();
    for tag in ["AUTH", "PUBL", "TEXT", "AGNC", "LANG"] {
        source.node_mut().add_tag(gedcore::tag::standard_factory(), tag, "");
    }
    source.node_mut().add_tag(gedcore::tag::standard_factory(), "_CUSTOM", "");
    let text = record_to_string(document.find_by_xref("S1").expect("source created"));
    assert!(text.starts_with("0 @S1@ SOUR\r\n1 _CUSTOM\r\n1 _UID "));
}
