use song_schema::Song;

use crate::document::ParsedDocument;

fn text(doc: &ParsedDocument, section: &str, key: &str) -> String {
    doc.value(section, key).unwrap_or_default().trim().to_string()
}

pub fn set_metadata(doc: &ParsedDocument, song: &mut Song) {
    let title = text(doc, "Metadata", "Title");
    song.song_file_name = title.clone();
    song.main_title = title;
    song.sub_title = text(doc, "Metadata", "Version");
    song.artist = text(doc, "Metadata", "Artist");
    song.genre = String::new();

    song.music_file = text(doc, "General", "AudioFilename");
}
