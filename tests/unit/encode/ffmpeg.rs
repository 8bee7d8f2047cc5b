use std::path::PathBuf;

use super::*;
use crate::foundation::core::Fps;

fn job<'a>(dir: &'a Path, out: &'a Path, frames: u64) -> EncodeJob<'a> {
    EncodeJob {
        frames_dir: dir,
        frame_count: frames,
        fps: Fps::integer(25).unwrap(),
        out_path: out,
    }
}

fn pos(args: &[String], needle: &str) -> usize {
    args.iter()
        .position(|a| a == needle)
        .unwrap_or_else(|| panic!("missing {needle} in {args:?}"))
}

#[test]
fn pal_dv_args_match_the_classic_command() {
    let dir = PathBuf::from("/w/.frames");
    let out = PathBuf::from("/out/5924.dv");
    let args = FfmpegEncoder::default().build_args(&job(&dir, &out, 10));

    assert!(args.contains(&"anullsrc=r=48000:cl=stereo".to_string()));
    assert!(args.contains(&"pal-dv".to_string()));
    assert!(args.contains(&"16:9".to_string()));
    assert!(args.contains(&"-shortest".to_string()));
    assert!(pos(&args, "-framerate") < pos(&args, "/w/.frames/%04d.png"));
    assert_eq!(args.last().unwrap(), "/out/5924.dv");
}

#[test]
fn mp4_profile_without_audio() {
    let dir = PathBuf::from("frames");
    let out = PathBuf::from("out.mp4");
    let enc = FfmpegEncoder {
        silent_audio: false,
        ..FfmpegEncoder::new(EncodeProfile::Mp4)
    };
    let args = enc.build_args(&job(&dir, &out, 10));
    assert!(args.contains(&"libx264".to_string()));
    assert!(args.contains(&"yuv420p".to_string()));
    assert!(!args.contains(&"lavfi".to_string()));
    assert!(!args.contains(&"-shortest".to_string()));
    assert!(!args.contains(&"aac".to_string()));
}

#[test]
fn empty_sequences_are_rejected_before_spawning() {
    let dir = PathBuf::from("frames");
    let out = PathBuf::from("out.dv");
    let enc = FfmpegEncoder {
        program: "svgreel-no-such-encoder".to_string(),
        ..FfmpegEncoder::default()
    };
    let err = enc.encode(&job(&dir, &out, 0)).unwrap_err();
    assert_eq!(err.0, "no frames to encode");
}

#[test]
fn missing_program_is_reported() {
    let dir = PathBuf::from("frames");
    let out = PathBuf::from("out.dv");
    let enc = FfmpegEncoder {
        program: "svgreel-no-such-encoder".to_string(),
        ..FfmpegEncoder::default()
    };
    let err = enc.encode(&job(&dir, &out, 3)).unwrap_err();
    assert!(err.0.contains("failed to spawn"));
}

#[test]
fn encoder_settings_deserialize_with_defaults() {
    let enc: FfmpegEncoder = serde_json::from_str(r#"{ "profile": "mp4" }"#).unwrap();
    assert_eq!(enc.profile, EncodeProfile::Mp4);
    assert_eq!(enc.program, "ffmpeg");
    assert!(enc.silent_audio);
}

#[test]
fn ensure_parent_dir_creates_missing_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("a").join("b").join("out.dv");
    ensure_parent_dir(&out).unwrap();
    assert!(tmp.path().join("a").join("b").is_dir());
    ensure_parent_dir(Path::new("relative.dv")).unwrap();
}
