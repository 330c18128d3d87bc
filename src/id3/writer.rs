use crate::id3::frames;
use crate::id3::header::BitPaddedInt;
use crate::id3::specs::Encoding;
use crate::tagmap::TagMap;

/// Render a complete ID3v2.4 tag block: one UTF-8 text frame per canonical
/// field, behind a header with the syncsafe total size. An empty map
/// renders nothing at all, so tagless files carry no ID3 block.
pub fn render_tag(tags: &TagMap) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, value) in tags.iter() {
        let Some(id) = frames::v24_frame_id(field) else {
            continue;
        };
        let text = value.to_string();

        body.extend_from_slice(id.as_bytes());
        body.extend_from_slice(&BitPaddedInt::encode(text.len() as u32 + 1, 4, 7));
        body.extend_from_slice(&[0u8; 2]); // frame flags
        body.push(Encoding::Utf8 as u8);
        body.extend_from_slice(text.as_bytes());
    }

    if body.is_empty() {
        return Vec::new();
    }

    let mut tag = Vec::with_capacity(10 + body.len());
    tag.extend_from_slice(b"ID3\x04\x00\x00");
    tag.extend_from_slice(&BitPaddedInt::encode(body.len() as u32, 4, 7));
    tag.extend_from_slice(&body);
    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3::frames::read_frames;
    use crate::id3::header::Id3Header;
    use crate::tagmap::TagValue;

    #[test]
    fn empty_map_renders_nothing() {
        assert!(render_tag(&TagMap::new()).is_empty());
    }

    #[test]
    fn rendered_tag_parses_back() {
        let mut tags = TagMap::new();
        tags.insert("title", "Track Name");
        tags.insert("album", "ァアィイ");
        tags.insert("tracknumber", "1/2");

        let rendered = render_tag(&tags);
        let header = Id3Header::parse(&rendered).unwrap().unwrap();
        assert_eq!(header.version, (4, 0));
        assert_eq!(header.size as usize, rendered.len() - 10);

        let parsed = read_frames(&rendered[10..], &header).unwrap();
        assert_eq!(parsed, tags);
    }

    #[test]
    fn list_values_are_joined() {
        let mut tags = TagMap::new();
        tags.insert(
            "genre",
            TagValue::List(vec!["Blues".into(), "Classic Rock".into()]),
        );

        let rendered = render_tag(&tags);
        let header = Id3Header::parse(&rendered).unwrap().unwrap();
        let parsed = read_frames(&rendered[10..], &header).unwrap();
        assert_eq!(
            parsed.get("genre"),
            Some(&TagValue::Text("Blues/Classic Rock".into()))
        );
    }
}
