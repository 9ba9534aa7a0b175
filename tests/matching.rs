use gedcore::date::DateValue;
use gedcore::enums::Sex;
use gedcore::interface::TracingProgress;
use gedcore::matching::{indistinct_ratio, match_dates, match_events, match_names, MatchParams, Matcher};
use gedcore::record::RecordType;
use gedcore::structure::PersonalName;
use gedcore::tree::Document;

fn setup() -> (Document, String, String) {
    let mut document = Document::new();
    let first = document.create_individual_with("Ivan Ivanov", "Fedoroff", "", Sex::Male);
    first.add_event("BIRT", "", "20 SEP 2013", "");
    let first = first.xref().to_string();
    let second = document.create_individual_with("Ivan Ivanovich", "Fedoroff", "", Sex::Male);
    second.add_event("BIRT", "", "20 SEP 2009", "");
    let second = second.xref().to_string();
    (document, first, second)
}

fn date(s: &str) -> DateValue {
    DateValue::parse(s).expect("date should parse")
}

#[test]
fn individuals_with_close_names_and_births() {
    let (document, first, second) = setup();
    let strict = MatchParams { names_indistinct_threshold: 1.0, dates_check: true, years_inaccuracy: 3 };
    let matcher = Matcher::within(&document, &strict);
    let score = matcher.match_records(document.find_by_xref(&first), document.find_by_xref(&second));
    assert_eq!(score, 0.0);

    let tolerant = MatchParams { names_indistinct_threshold: 0.85, dates_check: true, years_inaccuracy: 4 };
    let matcher = Matcher::within(&document, &tolerant);
    let score = matcher.match_records(document.find_by_xref(&first), document.find_by_xref(&second));
    assert_eq!(score, 100.0);
}

#[test]
fn births_too_far_apart() {
    let (document, first, second) = setup();
    let params = MatchParams { names_indistinct_threshold: 0.85, dates_check: true, years_inaccuracy: 3 };
    let matcher = Matcher::within(&document, &params);
    assert_eq!(matcher.match_records(document.find_by_xref(&first), document.find_by_xref(&second)), 0.0);
    let unchecked = MatchParams { dates_check: false, ..params };
    let matcher = Matcher::within(&document, &unchecked);
    assert_eq!(matcher.match_records(document.find_by_xref(&first), document.find_by_xref(&second)), 100.0);
}

#[test]
fn different_sexes_never_match() {
    let (mut document, first, _) = setup();
    let other = document.create_individual_with("Ivan Ivanov", "Fedoroff", "", Sex::Female).xref().to_string();
    let params = MatchParams::default();
    let matcher = Matcher::within(&document, &params);
    assert_eq!(matcher.match_records(document.find_by_xref(&first), document.find_by_xref(&other)), 0.0);
    assert_eq!(matcher.match_records(document.find_by_xref(&first), None), 0.0);
}

#[test]
fn name_weights() {
    let ivan_dub = PersonalName::new("Ivan", "Dub", "");
    let name = |first: &str, surname: &str| PersonalName::new(first, surname, "");
    assert_eq!(match_names(Some(&ivan_dub), Some(&name("Ivan", "Dub")), false, 1.0), 100.0);
    assert_eq!(match_names(Some(&ivan_dub), Some(&name("Ivan", "Dub2")), false, 1.0), 12.5);
    assert_eq!(match_names(Some(&ivan_dub), Some(&name("Ivan2", "Dub")), false, 1.0), 50.0);
    assert_eq!(match_names(Some(&ivan_dub), Some(&name("Petr", "Sokol")), false, 1.0), 0.0);
    assert_eq!(match_names(Some(&ivan_dub), None, false, 1.0), 0.0);
    assert_eq!(match_names(Some(&name("", "")), Some(&name("", "")), false, 1.0), 0.0);
    // only the first word of the given part counts when asked
    let patronymic = name("Ivan Petrovich", "Dub");
    assert_eq!(match_names(Some(&ivan_dub), Some(&patronymic), true, 1.0), 100.0);
    assert_eq!(match_names(Some(&ivan_dub), Some(&patronymic), false, 1.0), 50.0);
}

#[test]
fn ratio_of_reference_names() {
    let ratio = indistinct_ratio("Ivan Ivanov Fedoroff", "Ivan Ivanovich Fedoroff");
    assert!(ratio > 0.85 && ratio < 0.9, "ratio was {}", ratio);
    assert_eq!(indistinct_ratio("", ""), 1.0);
}

#[test]
fn dates_within_tolerance() {
    let params = MatchParams::default();
    assert_eq!(match_dates(Some(&date("1900")), Some(&date("1903")), &params), 100.0);
    assert_eq!(match_dates(Some(&date("1900")), Some(&date("1904")), &params), 0.0);
    assert_eq!(match_dates(Some(&date("1900")), Some(&DateValue::Empty), &params), 0.0);
    assert_eq!(match_dates(Some(&date("1900")), None, &params), 0.0);
    let unchecked = MatchParams { dates_check: false, ..params };
    assert_eq!(match_dates(Some(&date("1900")), Some(&date("1990")), &unchecked), 100.0);
    assert_eq!(match_dates(Some(&DateValue::Empty), Some(&date("1990")), &unchecked), 0.0);
}

#[test]
fn events_compare_tags_then_dates() {
    let (document, first, second) = setup();
    let params = MatchParams { years_inaccuracy: 5, ..MatchParams::default() };
    let a = document.find_by_xref(&first).and_then(|r| r.find_event_node("BIRT"));
    let b = document.find_by_xref(&second).and_then(|r| r.find_event_node("BIRT"));
    assert_eq!(match_events(a, b, &params), 100.0);
    assert_eq!(match_events(a, None, &params), 0.0);
}

#[test]
fn families_through_their_spouses() {
    let mut document = Document::new();
    let husband = document.create_individual_with("Ivan", "Dub", "", Sex::Male).xref().to_string();
    let wife = document.create_individual_with("Anna", "Dub", "", Sex::Female).xref().to_string();
    let family = document.create_family().xref().to_string();
    assert!(document.add_spouse(&family, &husband));
    assert!(document.add_spouse(&family, &wife));
    document
        .find_by_xref_mut(&family)
        .expect("family exists")
        .add_event("MARR", "", "1 JUN 1990", "");
    let empty_family = document.create_family().xref().to_string();

    let params = MatchParams::default();
    let matcher = Matcher::within(&document, &params);
    let same = document.find_by_xref(&family);
    assert_eq!(matcher.match_records(same, same), 100.0);
    let empty = document.find_by_xref(&empty_family);
    assert_eq!(matcher.match_records(empty, empty), 100.0);
}

#[test]
fn notes_and_sources() {
    let mut document = Document::new();
    let first = document.create_note();
    first.set_text("Some text");
    let first = first.xref().to_string();
    let second = document.create_note();
    second.set_text("Some text");
    let second = second.xref().to_string();
    let source_a = document.create_source();
    source_a.set_title("  Parish Register ");
    let source_a = source_a.xref().to_string();
    let source_b = document.create_source();
    source_b.set_short_title("parish register");
    let source_b = source_b.xref().to_string();

    let params = MatchParams::default();
    {
        let matcher = Matcher::within(&document, &params);
        assert_eq!(matcher.match_records(document.find_by_xref(&first), document.find_by_xref(&second)), 100.0);
        assert_eq!(matcher.match_records(document.find_by_xref(&source_a), document.find_by_xref(&source_b)), 100.0);
        assert_eq!(matcher.match_records(document.find_by_xref(&first), document.find_by_xref(&source_a)), 0.0);
    }
    document.find_by_xref_mut(&second).expect("note exists").set_text("");
    let matcher = Matcher::within(&document, &params);
    assert_eq!(matcher.match_records(document.find_by_xref(&first), document.find_by_xref(&second)), 0.0);
    assert_eq!(matcher.match_records(document.find_by_xref(&second), document.find_by_xref(&first)), 0.0);
    assert_eq!(matcher.match_records(document.find_by_xref(&source_a), None), 0.0);
}

#[test]
fn untitled_sources_match_each_other() {
    let mut document = Document::new();
    let empty_a = document.create_source().xref().to_string();
    let empty_b = document.create_source().xref().to_string();
    let titled = document.create_source();
    titled.set_title("Census 1897");
    let titled = titled.xref().to_string();
    let params = MatchParams::default();
    let matcher = Matcher::within(&document, &params);
    assert_eq!(matcher.match_records(document.find_by_xref(&empty_a), document.find_by_xref(&empty_b)), 100.0);
    assert_eq!(matcher.match_records(document.find_by_xref(&empty_a), document.find_by_xref(&titled)), 0.0);
}

#[test]
fn duplicate_scan_reports_pairs() {
    let (mut document, first, second) = setup();
    let third = document.create_individual_with("Petr", "Sokol", "", Sex::Male).xref().to_string();
    let params = MatchParams { names_indistinct_threshold: 0.85, dates_check: false, years_inaccuracy: 0 };
    let matcher = Matcher::within(&document, &params);
    let mut progress = TracingProgress::default();
    let pairs = matcher.find_duplicates(RecordType::Individual, 100.0, &mut progress);
    assert_eq!(pairs, vec![(first, second, 100.0)]);
    assert_eq!(progress.max(), 3);
    assert_eq!(progress.position(), 3);
    assert!(pairs.iter().all(|(a, b, _)| *a != third && *b != third));
}

#[test]
fn matching_across_documents() {
    let (left, first, _) = setup();
    let mut right = Document::new();
    let copy = right.create_individual_with("Ivan Ivanov", "Fedoroff", "", Sex::Male);
    copy.add_event("BIRT", "", "1 JAN 2014", "");
    let copy = copy.xref().to_string();
    let params = MatchParams::default();
    let matcher = Matcher::new(&left, &right, &params);
    assert_eq!(matcher.match_records(left.find_by_xref(&first), right.find_by_xref(&copy)), 100.0);
}
