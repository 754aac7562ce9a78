use super::*;
use song_schema::{
    BpmSegment, ChartLayout, Difficulty, DisplayBpm, HoldEvent, HoldRole, Song, TapEvent, TapRole,
    TimingData,
};
use std::fs;

fn beatmap(mode: &str, lanes: &str, timing_points: &[&str], hit_objects: &[&str]) -> String {
    format!(
        "osu file format v14

[General]
AudioFilename: audio.mp3
AudioLeadIn: 250
PreviewTime: 1500
Mode: {mode}

[Editor]
DistanceSpacing: 1

[Metadata]
Title:Test Song
Artist:Someone
Version:Hard

[Difficulty]
CircleSize:{lanes}
OverallDifficulty:8

[Events]
//Background and Video events

[TimingPoints]
{}

[HitObjects]
{}
",
        timing_points.join("\n"),
        hit_objects.join("\n")
    )
}

fn mania(timing_points: &[&str], hit_objects: &[&str]) -> String {
    beatmap("3", "4", timing_points, hit_objects)
}

fn song_with(src: &str) -> Song {
    let mut song = Song::default();
    import_chart_str(src, &mut song, "test.osu", true, &ImportOptions::default()).unwrap();
    song
}

fn segments(song: &Song) -> Vec<(u32, f64)> {
    song.timing
        .bpm_segments
        .iter()
        .map(|s| (s.row, s.bpm))
        .collect()
}

fn timing_at(bpm: f64) -> TimingData {
    let mut timing = TimingData::default();
    timing.add_bpm_segment(BpmSegment::new(0, bpm));
    timing
}

#[test]
fn end_to_end_minimal_file() {
    let src = mania(
        &["0,500,4,2,0,100,1,0"],
        &["256,192,200,128,0,400:0:0:0:0:", "0,192,100,1,0,0:0:0:0:"],
    );
    let song = song_with(&src);

    assert_eq!(song.charts.len(), 1);
    let chart = &song.charts[0];
    assert_eq!(chart.layout, Some(ChartLayout::DanceSingle));

    // earliest event is the tap at 100ms; the hold spans 100ms..300ms after it
    let taps: Vec<TapEvent> = chart.note_data.taps().collect();
    assert_eq!(
        taps,
        vec![
            TapEvent {
                lane: 0,
                row: 0,
                role: TapRole::OriginalTap,
            },
            TapEvent {
                lane: 2,
                row: 29,
                role: TapRole::OriginalLift,
            },
        ]
    );
    let holds: Vec<HoldEvent> = chart.note_data.holds().collect();
    assert_eq!(
        holds,
        vec![HoldEvent {
            lane: 2,
            start_row: 10,
            end_row: 28,
            role: HoldRole::OriginalHoldHead,
        }]
    );
    assert_eq!(song.timing.beat0_offset_seconds, -0.1);
}

#[test]
fn lane_index_divides_playfield_width() {
    let src = mania(
        &["0,500,4,2,0,100,1,0"],
        &[
            "0,192,100,1,0,0:0:0:0:",
            "256,192,200,128,0,400:0:0:0:0:",
            "511,192,300,1,0,0:0:0:0:",
        ],
    );
    let song = song_with(&src);
    let nd = &song.charts[0].note_data;

    let tap_lanes: Vec<u8> = nd
        .taps()
        .filter(|t| t.role == TapRole::OriginalTap)
        .map(|t| t.lane)
        .collect();
    assert_eq!(tap_lanes, vec![0, 3]);
    assert_eq!(nd.holds().next().map(|h| h.lane), Some(2));
    assert_eq!(lane_index(475, ChartLayout::Kb7Single), 6);
    assert_eq!(lane_index(511, ChartLayout::Kb7Single), 6);
    assert_eq!(lane_index(-5, ChartLayout::DanceDouble), 0);
}

#[test]
fn tempo_points_become_row_segments() {
    let song = song_with(&mania(
        &["0,500,4,2,0,100,1,0", "1000,250,4,2,0,100,1,0"],
        &["0,192,0,1,0,0:0:0:0:"],
    ));
    // one second at 120 bpm is two beats
    assert_eq!(segments(&song), vec![(0, 120.0), (96, 240.0)]);
    assert_eq!(song.display_bpm, DisplayBpm::Actual);
}

#[test]
fn tempo_points_are_sorted_before_resolving() {
    let points = [
        TempoChangePoint {
            offset_ms: 1000,
            value: 250.0,
        },
        TempoChangePoint {
            offset_ms: 0,
            value: 500.0,
        },
    ];
    assert_eq!(resolve_bpms(&points), vec![(0, 120.0), (1000, 240.0)]);
}

#[test]
fn duplicate_clamped_offset_keeps_later_point() {
    let song = song_with(&mania(
        &["-20,500,4,2,0,100,1,0", "0,250,4,2,0,100,1,0"],
        &["0,192,0,1,0,0:0:0:0:"],
    ));
    assert_eq!(segments(&song), vec![(0, 240.0)]);
}

#[test]
fn inherited_point_scales_last_absolute_tempo() {
    let song = song_with(&mania(
        &["0,500,4,2,0,100,1,0", "500,-50,4,2,0,100,0,0"],
        &["0,192,0,1,0,0:0:0:0:"],
    ));
    assert_eq!(segments(&song), vec![(0, 120.0), (48, 60.0)]);
}

#[test]
fn inherited_point_before_any_absolute_tempo_is_zero() {
    let points = [TempoChangePoint {
        offset_ms: 0,
        value: -100.0,
    }];
    assert_eq!(resolve_bpms(&points), vec![(0, 0.0)]);
}

#[test]
fn missing_tempo_points_default_to_120_bpm() {
    let song = song_with(&mania(&[], &["0,192,1000,1,0,0:0:0:0:"]));
    assert_eq!(segments(&song), vec![(0, 120.0)]);
}

#[test]
fn late_first_tempo_point_seeds_row_zero_and_repeats() {
    let song = song_with(&mania(
        &["1000,500,4,2,0,100,1,0"],
        &["0,192,1000,1,0,0:0:0:0:"],
    ));
    assert_eq!(segments(&song), vec![(0, 120.0), (96, 120.0)]);
}

#[test]
fn ms_to_row_ignores_and_preserves_stored_offset() {
    let mut timing = timing_at(120.0);
    timing.beat0_offset_seconds = -3.0;
    assert_eq!(ms_to_row(&timing, 1000).unwrap(), 96);
    assert_eq!(ms_to_row(&timing, -500).unwrap(), 48);
    assert_eq!(timing.beat0_offset_seconds, -3.0);
}

#[test]
fn ms_to_row_without_segments_is_timing_error() {
    let err = ms_to_row(&TimingData::default(), 10).unwrap_err();
    assert_eq!(err.code, "E5001");
    assert_eq!(err.kind, ImportErrorKind::Timing);
}

#[test]
fn sample_preview_comes_from_general() {
    let song = song_with(&mania(&["0,500,4,2,0,100,1,0"], &["0,192,0,1,0,0:0:0:0:"]));
    assert_eq!(song.music_sample_start_seconds, 0.25);
    assert_eq!(song.music_sample_length_seconds, 1.5);
}

#[test]
fn metadata_is_copied_and_trimmed() {
    let song = song_with(&mania(&["0,500,4,2,0,100,1,0"], &["0,192,0,1,0,0:0:0:0:"]));
    assert_eq!(song.main_title, "Test Song");
    assert_eq!(song.song_file_name, "Test Song");
    assert_eq!(song.sub_title, "Hard");
    assert_eq!(song.artist, "Someone");
    assert_eq!(song.genre, "");
    assert_eq!(song.music_file, "audio.mp3");
}

#[test]
fn hold_with_equal_rows_is_not_pulled_back() {
    let song = song_with(&mania(
        &["0,500,4,2,0,100,1,0"],
        &["0,192,0,128,0,0:0:0:0:0:"],
    ));
    let nd = &song.charts[0].note_data;
    let hold = nd.holds().next().unwrap();
    assert_eq!((hold.start_row, hold.end_row), (0, 0));
    let lift = nd.taps().next().unwrap();
    assert_eq!((lift.row, lift.role), (1, TapRole::OriginalLift));
}

#[test]
fn hold_end_row_is_pulled_back_by_one() {
    let song = song_with(&mania(
        &["0,500,4,2,0,100,1,0"],
        &["0,192,0,128,0,500:0:0:0:0:"],
    ));
    let hold = song.charts[0].note_data.holds().next().unwrap();
    assert_eq!((hold.start_row, hold.end_row), (0, 47));
}

#[test]
fn earliest_hold_start_lands_on_row_zero() {
    let song = song_with(&mania(
        &["0,500,4,2,0,100,1,0"],
        &["192,192,3000,128,0,3500:0:0:0:0:", "64,192,2500,128,0,2750:0:0:0:0:"],
    ));
    let holds: Vec<HoldEvent> = song.charts[0].note_data.holds().collect();
    assert_eq!(holds.iter().map(|h| h.start_row).min(), Some(0));
    assert_eq!(song.timing.beat0_offset_seconds, -2.5);
}

#[test]
fn non_tap_non_hold_objects_are_ignored() {
    let src = mania(
        &["0,500,4,2,0,100,1,0"],
        &[
            "64,192,0,2,0,B|100:100,1,100",
            "64,192,500,12,0,1000",
            "192,192,250,5,0,0:0:0:0:",
        ],
    );
    let events = parse_hit_events(&parse_document(&src)).unwrap();
    assert_eq!(
        events,
        vec![RawHitEvent {
            lane: 192,
            offset_ms: 250,
            kind: HitKind::Tap,
            hold_end_ms: None,
        }]
    );
}

#[test]
fn chart_without_hit_objects_is_empty() {
    let song = song_with(&mania(&["0,500,4,2,0,100,1,0"], &[]));
    let chart = &song.charts[0];
    assert!(chart.note_data.is_empty());
    assert_eq!(chart.note_data.num_tracks(), 4);
    assert_eq!(song.timing.beat0_offset_seconds, 0.0);
}

#[test]
fn every_supported_lane_count_has_its_own_layout() {
    for (lanes, layout) in [
        ("4", ChartLayout::DanceSingle),
        ("5", ChartLayout::PumpSingle),
        ("6", ChartLayout::DanceSolo),
        ("7", ChartLayout::Kb7Single),
        ("8", ChartLayout::DanceDouble),
    ] {
        let song = song_with(&beatmap("3", lanes, &["0,500,4,2,0,100,1,0"], &[]));
        assert_eq!(song.charts[0].layout, Some(layout));
        assert_eq!(song.charts[0].note_data.num_tracks(), layout.lane_count() as usize);
    }
}

#[test]
fn unsupported_lane_count_is_rejected_without_chart() {
    let mut song = Song::default();
    let src = beatmap("3", "9", &["0,500,4,2,0,100,1,0"], &[]);
    let err = import_chart_str(&src, &mut song, "x.osu", true, &ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.code, "E4002");
    assert_eq!(err.kind, ImportErrorKind::UnsupportedLaneCount);
    assert_eq!(err.file.as_deref(), Some("x.osu"));
    assert!(song.charts.is_empty());
}

#[test]
fn non_mania_mode_is_rejected() {
    let mut song = Song::default();
    let src = beatmap("0", "4", &["0,500,4,2,0,100,1,0"], &[]);
    let err = import_chart_str(&src, &mut song, "x.osu", true, &ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.code, "E4001");
    assert_eq!(err.kind, ImportErrorKind::UnsupportedMode);
    assert!(song.charts.is_empty());
}

#[test]
fn malformed_lane_count_is_recoverable_error() {
    let mut song = Song::default();
    let src = beatmap("3", "four", &["0,500,4,2,0,100,1,0"], &[]);
    let err = import_chart_str(&src, &mut song, "x.osu", true, &ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.code, "E3001");
    assert_eq!(err.kind, ImportErrorKind::MalformedNumber);
    assert_eq!(err.key.as_deref(), Some("CircleSize"));
}

#[test]
fn malformed_hit_object_reports_its_line() {
    let mut song = Song::default();
    let src = mania(&["0,500,4,2,0,100,1,0"], &["0,192,100,1,0,0:0:0:0:", "0,192,oops,1"]);
    let err = import_chart_str(&src, &mut song, "x.osu", true, &ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.code, "E3001");
    assert_eq!(err.section.as_deref(), Some("HitObjects"));
    assert_eq!(err.line_index, Some(2));
    assert!(song.charts.is_empty());
}

#[test]
fn offsets_spanning_the_integer_range_are_recoverable() {
    let mut song = Song::default();
    let src = mania(
        &["0,500,4,2,0,100,1,0"],
        &[
            "0,192,-9223372036854775808,1,0,0:0:0:0:",
            "128,192,9223372036854775807,1,0,0:0:0:0:",
        ],
    );
    let err = import_chart_str(&src, &mut song, "x.osu", true, &ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.code, "E3001");
    assert_eq!(err.kind, ImportErrorKind::MalformedNumber);
    assert!(song.charts.is_empty());
}

#[test]
fn hold_past_last_row_is_recoverable() {
    let mut song = Song::default();
    let src = mania(
        &["0,500,4,2,0,100,1,0"],
        &[
            "0,192,0,1,0,0:0:0:0:",
            "256,192,100000000000000,128,0,100000000000000:0:0:0:0:",
        ],
    );
    let err = import_chart_str(&src, &mut song, "x.osu", true, &ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.code, "E3001");
    assert!(song.charts.is_empty());

    let timing = timing_at(120.0);
    assert_eq!(ms_to_row(&timing, i64::MAX).unwrap_err().code, "E3001");
    assert_eq!(ms_to_row(&timing, 1000).unwrap(), 96);
}

#[test]
fn malformed_primary_timing_leaves_song_untouched() {
    let mut song = Song::default();
    let src = mania(&["0,500,4,2,0,100,1,0"], &["0,192,0,1,0,0:0:0:0:"])
        .replace("AudioLeadIn: 250", "AudioLeadIn: soon");
    let err = import_chart_str(&src, &mut song, "x.osu", true, &ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.code, "E3001");
    assert_eq!(song, Song::default());
}

#[test]
fn hold_without_end_field_is_short_record() {
    let src = mania(&["0,500,4,2,0,100,1,0"], &["0,192,100,128,0"]);
    let err = parse_hit_events(&parse_document(&src)).unwrap_err();
    assert_eq!(err.code, "E3003");
}

#[test]
fn wrong_section_count_is_structural_rejection() {
    let mut song = Song::default();
    let src = format!(
        "{}\n[Colours]\nCombo1 : 255,0,0\n",
        mania(&["0,500,4,2,0,100,1,0"], &[])
    );
    let err = import_chart_str(&src, &mut song, "x.osu", true, &ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.kind, ImportErrorKind::Structure);
    assert!(song.timing.is_empty());
}

#[test]
fn difficulty_follows_chart_count() {
    let mut song = Song::default();
    let options = ImportOptions::default();
    let src = mania(&["0,500,4,2,0,100,1,0"], &["0,192,0,1,0,0:0:0:0:"]);
    for i in 0..7 {
        import_chart_str(&src, &mut song, "x.osu", i == 0, &options).unwrap();
    }
    let tiers: Vec<Difficulty> = song.charts.iter().map(|c| c.difficulty).collect();
    assert_eq!(
        tiers,
        vec![
            Difficulty::Beginner,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Challenge,
            Difficulty::Edit,
            Difficulty::Edit,
        ]
    );
    assert_eq!(song.charts[6].meter, 6);
    assert!(song.charts.iter().all(|c| c.finalized && c.saved_to_disk));
}

#[test]
fn secondary_chart_without_song_timing_fails() {
    let mut song = Song::default();
    let src = mania(&["0,500,4,2,0,100,1,0"], &["0,192,0,1,0,0:0:0:0:"]);
    let err = import_chart_str(&src, &mut song, "x.osu", false, &ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.code, "E5001");
}

#[test]
fn crlf_files_parse_like_lf_files() {
    let src = mania(
        &["0,500,4,2,0,100,1,0"],
        &["0,192,100,1,0,0:0:0:0:", "256,192,200,128,0,400:0:0:0:0:"],
    );
    let lf = song_with(&src);
    let crlf = song_with(&src.replace('\n', "\r\n"));
    assert_eq!(lf, crlf);
}

#[test]
fn load_song_from_dir_skips_failing_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let base = ["0,500,4,2,0,100,1,0"];
    let hits = ["0,192,100,1,0,0:0:0:0:"];

    fs::write(dir.path().join("a.osu"), mania(&base, &hits)).unwrap();
    fs::write(dir.path().join("b.osu"), beatmap("3", "7", &base, &hits)).unwrap();
    fs::write(dir.path().join("c.osu"), beatmap("1", "4", &base, &hits)).unwrap();
    fs::write(dir.path().join("d.OSU"), "not a beatmap").unwrap();
    fs::write(dir.path().join("e.osu"), beatmap("3", "x", &base, &hits)).unwrap();
    fs::write(dir.path().join("notes.txt"), mania(&base, &hits)).unwrap();

    let options = ImportOptions::default();
    let files = applicable_files(dir.path(), &options).unwrap();
    assert_eq!(files.len(), 5);

    let song = load_song_from_dir(dir.path(), &options).unwrap();
    assert_eq!(song.main_title, "Test Song");
    assert_eq!(song.charts.len(), 2);
    assert_eq!(song.charts[0].layout, Some(ChartLayout::DanceSingle));
    assert_eq!(song.charts[1].layout, Some(ChartLayout::Kb7Single));
    assert_eq!(song.charts[1].difficulty, Difficulty::Easy);
    assert!(song.charts[0].filename.ends_with("a.osu"));
}

#[test]
fn load_song_from_missing_dir_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = load_song_from_dir(&missing, &ImportOptions::default()).unwrap_err();
    assert_eq!(err.code, "E2002");
    assert_eq!(err.kind, ImportErrorKind::Io);
}

#[test]
fn note_data_reloads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.osu");
    fs::write(
        &path,
        mania(&["0,500,4,2,0,100,1,0"], &["0,192,100,1,0,0:0:0:0:", "128,192,600,1,0,0:0:0:0:"]),
    )
    .unwrap();

    let mut song = load_song_from_dir(dir.path(), &ImportOptions::default()).unwrap();
    let mut chart = song.charts[0].clone();
    chart.set_note_data(Default::default());

    load_note_data_from_file(&path, &mut song.timing, &mut chart).unwrap();
    assert_eq!(chart.note_data, song.charts[0].note_data);
    assert_eq!(chart.note_data.taps().map(|t| (t.lane, t.row)).collect::<Vec<_>>(), vec![(0, 0), (1, 48)]);
}

#[test]
fn byte_order_mark_is_stripped() {
    assert_eq!(decode_text(b"\xEF\xBB\xBFosu"), "osu");
    assert_eq!(decode_text(b"osu"), "osu");
}
