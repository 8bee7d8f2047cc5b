use super::*;
use crate::foundation::error::Severity;
use crate::raster::CommandRasterizer;

const CONFIG: &str = r#"{
    "schedule_url": "https://example.org/schedule.xml",
    "fps": { "num": 25, "den": 1 },
    "title_map": { "6001": "Short title" },
    "intro": {
        "template": "intro.svg",
        "output": "{id}.dv",
        "phases": [
            { "seconds": 0.5, "tracks": [
                { "id": "names", "key": "opacity", "curve": "hold", "value": 0 }
            ] },
            { "seconds": 1, "tracks": [
                { "id": "names", "key": "opacity", "curve": "ease", "ease": "OutCubic", "from": 0, "to": 1 }
            ] }
        ]
    },
    "outro": {
        "template": "outro.svg",
        "output": "outro.dv",
        "phases": [ { "seconds": 2 } ]
    },
    "preview": { "parameters": { "$title": "Preview" } },
    "rasterizer": { "kind": "inkscape" },
    "encoder": { "profile": "mp4" },
    "on_encoder_failure": "fatal"
}"#;

fn project_dir(config: &str) -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let art = tmp.path().join(ARTWORK_DIR);
    std::fs::create_dir_all(&art).unwrap();
    std::fs::write(art.join("intro.svg"), "<svg/>").unwrap();
    std::fs::write(art.join("outro.svg"), "<svg/>").unwrap();
    std::fs::write(tmp.path().join(CONFIG_FILE), config).unwrap();
    tmp
}

fn event(id: u64) -> Event {
    Event {
        id,
        title: format!("Talk {id}"),
        subtitle: String::new(),
        persons: vec!["Eva".to_string()],
    }
}

#[test]
fn config_parses_every_section() {
    let cfg = ProjectConfig::from_json_str(CONFIG).unwrap();
    assert_eq!(cfg.title_map.get(&6001).map(String::as_str), Some("Short title"));
    assert_eq!(cfg.intro.phases.len(), 2);
    assert_eq!(cfg.rasterizer, RasterizerConfig::Inkscape);
    assert_eq!(cfg.encoder.profile, crate::encode::ffmpeg::EncodeProfile::Mp4);
    assert_eq!(cfg.encoder.program, "ffmpeg");
    assert_eq!(cfg.failures.encoder, Severity::Fatal);
    assert_eq!(cfg.failures.rasterizer, Severity::Fatal);
    assert_eq!(cfg.preview.output, PathBuf::from("intro.dv"));
}

#[test]
fn minimal_config_uses_defaults() {
    let cfg = ProjectConfig::from_json_str(
        r#"{ "intro": { "template": "intro.svg", "output": "{id}.dv", "phases": [ { "seconds": 1 } ] } }"#,
    )
    .unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.fps, Fps::default());
    assert_eq!(cfg.failures, FailurePolicy::default());
    assert_eq!(cfg.rasterizer, RasterizerConfig::Resvg);
    assert!(cfg.outro.is_none());
}

#[test]
fn custom_rasterizer_command_is_accepted() {
    let cfg = ProjectConfig::from_json_str(
        r#"{
            "intro": { "template": "intro.svg", "output": "{id}.dv", "phases": [ { "seconds": 1 } ] },
            "rasterizer": { "kind": "command", "program": "rsvg-convert", "args": ["-o", "{output}", "{input}"] }
        }"#,
    )
    .unwrap();
    assert_eq!(
        cfg.rasterizer,
        RasterizerConfig::Command(CommandRasterizer {
            program: "rsvg-convert".to_string(),
            args: vec!["-o".into(), "{output}".into(), "{input}".into()],
        })
    );
}

#[test]
fn validation_rejects_outputs_that_would_collide() {
    let mut cfg = ProjectConfig::from_json_str(CONFIG).unwrap();
    cfg.intro.output = "intro.dv".to_string();
    assert!(cfg.validate().unwrap_err().to_string().contains("{id}"));

    let mut cfg = ProjectConfig::from_json_str(CONFIG).unwrap();
    if let Some(outro) = cfg.outro.as_mut() {
        outro.output = "{id}-outro.dv".to_string();
    }
    assert!(cfg.validate().is_err());

    let mut cfg = ProjectConfig::from_json_str(CONFIG).unwrap();
    cfg.intro.phases.clear();
    assert!(cfg.validate().is_err());

    let mut cfg = ProjectConfig::from_json_str(CONFIG).unwrap();
    cfg.fps = Fps { num: 25, den: 0 };
    assert!(cfg.validate().is_err());
}

#[test]
fn open_checks_artwork_and_templates() {
    let tmp = project_dir(CONFIG);
    let project = Project::open(tmp.path()).unwrap();
    assert_eq!(project.assets_dir(), tmp.path().join(ARTWORK_DIR));
    assert_eq!(project.intro().total_frames(), 12 + 25);

    std::fs::remove_file(tmp.path().join(ARTWORK_DIR).join("outro.svg")).unwrap();
    let err = Project::open(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("outro.svg"));

    let empty = tempfile::tempdir().unwrap();
    assert!(matches!(Project::open(empty.path()), Err(ReelError::Config(_))));
}

#[test]
fn tasks_cover_every_event_and_the_outro() {
    let tmp = project_dir(CONFIG);
    let project = Project::open(tmp.path()).unwrap();

    let tasks = project.tasks(&[event(5924), event(5930)]).unwrap();
    let outputs: Vec<&Path> = tasks.iter().map(|t| t.output.as_path()).collect();
    assert_eq!(
        outputs,
        vec![
            Path::new("5924.dv"),
            Path::new("5930.dv"),
            Path::new("outro.dv")
        ]
    );
    assert_eq!(tasks[0].label, "5924");
    assert_eq!(tasks[0].template, Path::new("intro.svg"));
    assert_eq!(tasks[0].parameters["$title"], "Talk 5924");
    assert_eq!(tasks[0].parameters["$personnames"], "Eva");
    assert!(tasks[2].parameters.is_empty());
    assert_eq!(tasks[2].template, Path::new("outro.svg"));

    assert!(project.tasks(&[event(1), event(1)]).is_err());
}

#[test]
fn preview_renders_in_place_into_the_project_dir() {
    let tmp = project_dir(CONFIG);
    let project = Project::open(tmp.path()).unwrap();
    let task = project.preview_task();

    assert_eq!(task.workdir, project.assets_dir());
    assert_eq!(task.template_path(), project.assets_dir().join("intro.svg"));
    assert_eq!(task.output_path(), project.dir().join("intro.dv"));
    assert_eq!(task.parameters["$title"], "Preview");
}

#[test]
fn schedule_source_prefers_explicit_file_then_offline_copy() {
    let tmp = project_dir(CONFIG);
    let project = Project::open(tmp.path()).unwrap();

    assert_eq!(
        project.schedule_source(false, None).unwrap(),
        ScheduleSource::Url("https://example.org/schedule.xml".to_string())
    );
    assert_eq!(
        project.schedule_source(true, None).unwrap(),
        ScheduleSource::File(project.dir().join(OFFLINE_SCHEDULE))
    );
    assert_eq!(
        project
            .schedule_source(false, Some(Path::new("/tmp/s.xml")))
            .unwrap(),
        ScheduleSource::File(PathBuf::from("/tmp/s.xml"))
    );
}

#[test]
fn pool_opts_carry_the_failure_policy() {
    let tmp = project_dir(CONFIG);
    let project = Project::open(tmp.path()).unwrap();
    let opts = project.pool_opts(Some(3));
    assert_eq!(opts.workers, 3);
    assert_eq!(opts.policy.encoder, Severity::Fatal);
    assert!(project.pool_opts(None).workers >= 1);
}
