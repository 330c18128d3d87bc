use crate::tagmap::TagValue;

/// Text encoding index at the start of every ID3v2 text frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Encoding {
    Latin1 = 0,
    Utf16 = 1,
    Utf16Be = 2,
    Utf8 = 3,
}

impl Encoding {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Encoding::Latin1),
            1 => Some(Encoding::Utf16),
            2 => Some(Encoding::Utf16Be),
            3 => Some(Encoding::Utf8),
            _ => None,
        }
    }
}

/// Decode frame text leniently; undecodable sequences are replaced rather
/// than failing the whole frame.
pub fn decode_text(data: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Latin1 => data.iter().map(|&b| b as char).collect(),
        Encoding::Utf16 => {
            if data.len() < 2 {
                return String::new();
            }
            // BOM decides the byte order; default to LE without one.
            let (decoder, start) = match (data[0], data[1]) {
                (0xFF, 0xFE) => (encoding_rs::UTF_16LE, 2),
                (0xFE, 0xFF) => (encoding_rs::UTF_16BE, 2),
                _ => (encoding_rs::UTF_16LE, 0),
            };
            let (text, _, _) = decoder.decode(&data[start..]);
            text.into_owned()
        }
        Encoding::Utf16Be => {
            let (text, _, _) = encoding_rs::UTF_16BE.decode(data);
            text.into_owned()
        }
        Encoding::Utf8 => String::from_utf8_lossy(data).into_owned(),
    }
}

/// The canonical ID3v1 genre table. An ID3v1 genre byte and the numeric
/// references in ID3v2.2/2.3 `TCO`/`TCON` frames index into it.
pub const GENRES: [&str; 148] = [
    "Blues",
    "Classic Rock",
    "Country",
    "Dance",
    "Disco",
    "Funk",
    "Grunge",
    "Hip-Hop",
    "Jazz",
    "Metal",
    "New Age",
    "Oldies",
    "Other",
    "Pop",
    "R&B",
    "Rap",
    "Reggae",
    "Rock",
    "Techno",
    "Industrial",
    "Alternative",
    "Ska",
    "Death Metal",
    "Pranks",
    "Soundtrack",
    "Euro-Techno",
    "Ambient",
    "Trip-Hop",
    "Vocal",
    "Jazz+Funk",
    "Fusion",
    "Trance",
    "Classical",
    "Instrumental",
    "Acid",
    "House",
    "Game",
    "Sound Clip",
    "Gospel",
    "Noise",
    "AlternRock",
    "Bass",
    "Soul",
    "Punk",
    "Space",
    "Meditative",
    "Instrumental Pop",
    "Instrumental Rock",
    "Ethnic",
    "Gothic",
    "Darkwave",
    "Techno-Industrial",
    "Electronic",
    "Pop-Folk",
    "Eurodance",
    "Dream",
    "Southern Rock",
    "Comedy",
    "Cult",
    "Gangsta",
    "Top 40",
    "Christian Rap",
    "Pop/Funk",
    "Jungle",
    "Native American",
    "Cabaret",
    "New Wave",
    "Psychedelic",
    "Rave",
    "Showtunes",
    "Trailer",
    "Lo-Fi",
    "Tribal",
    "Acid Punk",
    "Acid Jazz",
    "Polka",
    "Retro",
    "Musical",
    "Rock & Roll",
    "Hard Rock",
    "Folk",
    "Folk-Rock",
    "National Folk",
    "Swing",
    "Fast Fusion",
    "Bebop",
    "Latin",
    "Revival",
    "Celtic",
    "Bluegrass",
    "Avantgarde",
    "Gothic Rock",
    "Progressive Rock",
    "Psychedelic Rock",
    "Symphonic Rock",
    "Slow Rock",
    "Big Band",
    "Chorus",
    "Easy Listening",
    "Acoustic",
    "Humour",
    "Speech",
    "Chanson",
    "Opera",
    "Chamber Music",
    "Sonata",
    "Symphony",
    "Booty Bass",
    "Primus",
    "Porn Groove",
    "Satire",
    "Slow Jam",
    "Club",
    "Tango",
    "Samba",
    "Folklore",
    "Ballad",
    "Power Ballad",
    "Rhythmic Soul",
    "Freestyle",
    "Duet",
    "Punk Rock",
    "Drum Solo",
    "A capella",
    "Euro-House",
    "Dance Hall",
    "Goa",
    "Drum & Bass",
    "Club-House",
    "Hardcore Techno",
    "Terror",
    "Indie",
    "BritPop",
    "Negerpunk",
    "Polsk Punk",
    "Beat",
    "Christian Gangsta Rap",
    "Heavy Metal",
    "Black Metal",
    "Crossover",
    "Contemporary Christian",
    "Christian Rock",
    "Merengue",
    "Salsa",
    "Thrash Metal",
    "Anime",
    "Jpop",
    "Synthpop",
];

/// Expand a `(n)(m)…` genre reference body through the genre table: one
/// code becomes its plain name, several become an ordered list. Any piece
/// that fails to parse returns the raw text unchanged.
pub fn expand_genre_codes(text: &str) -> TagValue {
    let mut genres = Vec::new();
    for part in text.split(")(") {
        let code = part.trim_matches(|c| c == '(' || c == ')');
        match code.parse::<usize>().ok().and_then(|n| GENRES.get(n)) {
            Some(name) => genres.push((*name).to_string()),
            None => return TagValue::Text(text.to_string()),
        }
    }

    if genres.len() == 1 {
        TagValue::Text(genres.swap_remove(0))
    } else {
        TagValue::List(genres)
    }
}
