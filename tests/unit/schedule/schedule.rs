use super::*;

const SCHEDULE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<schedule>
  <conference><title>Datenspuren 2014</title></conference>
  <day index="1" date="2014-09-13">
    <room name="Großer Saal">
      <event id="5924">
        <title>Digitale Selbstverteidigung</title>
        <subtitle>Wie schütze ich mich?</subtitle>
        <persons>
          <person id="1">Eva Olivin</person>
          <person id="2">Robert Verch</person>
        </persons>
      </event>
      <event id="5930">
        <title>Keynote</title>
        <persons/>
      </event>
    </room>
  </day>
  <day index="2" date="2014-09-14">
    <room name="Kleiner Saal">
      <event id="6001">
        <title>An extremely long title that will never fit</title>
        <subtitle/>
        <persons><person id="3">A &amp; B</person></persons>
      </event>
    </room>
  </day>
</schedule>
"#;

#[test]
fn events_come_out_in_document_order_with_parameters() {
    let events = parse_schedule(SCHEDULE, &TitleMap::new()).unwrap();
    let ids: Vec<u64> = events.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![5924, 5930, 6001]);

    let first = &events[0];
    assert_eq!(first.personnames(), "Eva Olivin, Robert Verch");
    let params = first.parameters();
    assert_eq!(params["$id"], "5924");
    assert_eq!(params["$title"], "Digitale Selbstverteidigung");
    assert_eq!(params["$subtitle"], "Wie schütze ich mich?");
    assert_eq!(params["$personnames"], "Eva Olivin, Robert Verch");
}

#[test]
fn missing_subtitle_and_persons_are_empty() {
    let events = parse_schedule(SCHEDULE, &TitleMap::new()).unwrap();
    assert_eq!(events[1].subtitle, "");
    assert!(events[1].persons.is_empty());
    assert_eq!(events[1].personnames(), "");
    assert_eq!(events[2].subtitle, "");
    assert_eq!(events[2].persons, vec!["A & B".to_string()]);
}

#[test]
fn title_map_overrides_schedule_titles() {
    let titles = TitleMap::from([(6001, "Short title".to_string())]);
    let events = parse_schedule(SCHEDULE, &titles).unwrap();
    assert_eq!(events[2].title, "Short title");
    assert_eq!(events[0].title, "Digitale Selbstverteidigung");
}

#[test]
fn malformed_schedules_are_schedule_errors() {
    let err = parse_schedule("<schedule><day>", &TitleMap::new()).unwrap_err();
    assert!(matches!(err, ReelError::Schedule(_)));

    let bad_id = r#"<schedule><day><room><event id="x"><title>t</title></event></room></day></schedule>"#;
    let err = parse_schedule(bad_id, &TitleMap::new()).unwrap_err();
    assert!(err.to_string().contains("not a number"));
}

#[test]
fn file_source_reads_local_schedule() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("schedule.xml");
    std::fs::write(&path, SCHEDULE).unwrap();

    let events = load_schedule(&ScheduleSource::File(path), &TitleMap::new()).unwrap();
    assert_eq!(events.len(), 3);

    let missing = ScheduleSource::File(tmp.path().join("nope.xml"));
    assert!(matches!(missing.load(), Err(ReelError::Schedule(_))));
}
