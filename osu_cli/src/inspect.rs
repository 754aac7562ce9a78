use std::collections::BTreeSet;

use anyhow::anyhow;
use song_schema::{Song, TapNote, TapRole, ROWS_PER_BEAT};

pub fn print_chart(song: &Song, index: usize) -> anyhow::Result<()> {
    let chart = song.charts.get(index).ok_or_else(|| {
        anyhow!(
            "chart {index} not found ({} charts loaded)",
            song.charts.len()
        )
    })?;

    println!("{} - {} [{}]", song.artist, song.main_title, chart.filename);

    if chart.note_data.is_empty() {
        println!("Chart is empty.");
        return Ok(());
    }

    println!(
        "{} taps, {} holds, last row {}",
        chart.note_data.taps().count(),
        chart.note_data.holds().count(),
        chart.note_data.last_row().unwrap_or(0)
    );

    // rows where something starts, ends or changes tempo
    let mut rows = BTreeSet::new();
    for tap in chart.note_data.taps() {
        rows.insert(tap.row);
    }
    for hold in chart.note_data.holds() {
        rows.insert(hold.start_row);
        rows.insert(hold.end_row);
    }
    for seg in &song.timing.bpm_segments {
        rows.insert(seg.row);
    }

    let lanes = chart.note_data.num_tracks();
    let lane_header: Vec<String> = (1..=lanes).map(|l| (l % 10).to_string()).collect();
    println!("   Row | {} | Info", lane_header.join(" "));
    println!("-------|{}|------------------", "-".repeat(lanes * 2 + 1));

    let holds: Vec<_> = chart.note_data.holds().collect();
    for &row in &rows {
        let mut cells = Vec::with_capacity(lanes);
        for lane in 0..lanes as u8 {
            let cell = match chart.note_data.track(lane).and_then(|t| t.get(&row)) {
                Some(TapNote::Tap {
                    role: TapRole::OriginalTap,
                }) => 'N',
                Some(TapNote::Tap {
                    role: TapRole::OriginalLift,
                }) => 'L',
                Some(TapNote::HoldHead { .. }) => 'H',
                None if holds
                    .iter()
                    .any(|h| h.lane == lane && h.start_row < row && row <= h.end_row) =>
                {
                    '|'
                }
                None => '.',
            };
            cells.push(cell.to_string());
        }

        let beat = row as f64 / ROWS_PER_BEAT as f64;
        let mut info = format!("beat {beat:.3}");
        if let Some(seconds) = song.timing.elapsed_time_from_beat(beat) {
            info.push_str(&format!(", {seconds:.3}s"));
        }
        if song.timing.bpm_segments.iter().any(|s| s.row == row) {
            if let Some(bpm) = song.timing.bpm_at_row(row) {
                info.push_str(&format!(", bpm {bpm:.2}"));
            }
        }
        println!("{row:>6} | {} | {info}", cells.join(" "));
    }

    Ok(())
}
