// used to print out readable forms of an enumerated value
use std::fmt;

/// Enumerated tag values that have a fixed textual form on the wire.
///
/// Implementations come from `tag_enum!`, which keeps the variant and its
/// text side by side. Parsing is forgiving: surrounding blanks and letter case
/// are ignored and unknown text yields `DEFAULT`.
pub trait TagEnum: Sized + Copy + Eq + 'static {
    // static stuff which needs to be implemented downstream
    const NAME: &'static str;
    const VALUES: &'static [(Self, &'static str)];
    const DEFAULT: Self;
    // instance callable with pre-made implementation
    fn from_tag(s: &str) -> Self {
        let s = s.trim();
        Self::VALUES
            .iter()
            .find(|(_, text)| text.eq_ignore_ascii_case(s))
            .map_or(Self::DEFAULT, |(value, _)| *value)
    }
    fn tag(&self) -> &'static str {
        Self::VALUES
            .iter()
            .find(|(value, _)| value == self)
            .map_or("", |(_, text)| *text)
    }
    /// Text at a position of the value table; out of range yields `""`.
    fn tag_at(index: usize) -> &'static str {
        Self::VALUES.get(index).map_or("", |(_, text)| *text)
    }
}

macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident,
        { $($variant:ident => $($text:literal)|+),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }
        impl TagEnum for $name {
            const NAME: &'static str = stringify!($name);
            const VALUES: &'static [(Self, &'static str)] = &[
                $($(($name::$variant, $text),)+)+
            ];
            const DEFAULT: Self = $name::$default;
        }
        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.tag())
            }
        }
    };
}

// ------------- Individuals -------------
tag_enum!(Sex, default = None, {
    None => "",
    Male => "M",
    Female => "F",
    Undetermined => "U",
});

tag_enum!(
    /// `TYPE` of a personal name.
    NameType, default = None, {
    None => "",
    Aka => "aka",
    Birth => "birth",
    Immigrant => "immigrant",
    Maiden => "maiden",
    Married => "married",
});

tag_enum!(
    /// `PEDI` of a child-to-family link.
    PedigreeLinkage, default = None, {
    None => "",
    Adopted => "adopted",
    Birth => "birth",
    Foster => "foster",
    Sealing => "sealing",
});

tag_enum!(ChildLinkageStatus, default = None, {
    None => "",
    Challenged => "challenged",
    Disproven => "disproven",
    Proven => "proven",
});

tag_enum!(Restriction, default = None, {
    None => "",
    Confidential => "confidential",
    Locked => "locked",
    Privacy => "privacy",
});

// ------------- LDS ordinances -------------
tag_enum!(
    /// `STAT` of an LDS baptism.
    BaptismDateStatus, default = None, {
    None => "",
    Child => "CHILD",
    Completed => "COMPLETED",
    Excluded => "EXCLUDED",
    Pre1970 => "PRE-1970",
    Stillborn => "STILLBORN",
    Submitted => "SUBMITTED",
    Uncleared => "UNCLEARED",
});

tag_enum!(
    /// `STAT` of an LDS endowment.
    EndowmentDateStatus, default = None, {
    None => "",
    Child => "CHILD",
    Completed => "COMPLETED",
    Excluded => "EXCLUDED",
    Infant => "INFANT",
    Pre1970 => "PRE-1970",
    Stillborn => "STILLBORN",
    Submitted => "SUBMITTED",
    Uncleared => "UNCLEARED",
});

tag_enum!(
    /// `STAT` of a child-to-parents sealing.
    ChildSealingDateStatus, default = None, {
    None => "",
    Bic => "BIC",
    Excluded => "EXCLUDED",
    Pre1970 => "PRE-1970",
    Stillborn => "STILLBORN",
    Submitted => "SUBMITTED",
    Uncleared => "UNCLEARED",
});

tag_enum!(
    /// `STAT` of a spouse sealing.
    SpouseSealingDateStatus, default = None, {
    None => "",
    Canceled => "CANCELED",
    Completed => "COMPLETED",
    Excluded => "EXCLUDED",
    Dns => "DNS",
    DnsCan => "DNS/CAN",
    Pre1970 => "PRE-1970",
    Submitted => "SUBMITTED",
    Uncleared => "UNCLEARED",
});

tag_enum!(OrdinanceProcessFlag, default = None, {
    None => "",
    Yes => "yes",
    No => "no",
});

// ------------- Research -------------
tag_enum!(ResearchStatus, default = Defined, {
    Defined => "defined",
    InProgress => "inprogress",
    OnHold => "onhold",
    Problems => "problems",
    Completed => "completed",
    Withdrawn => "withdrawn",
});

tag_enum!(ResearchPriority, default = None, {
    None => "",
    Low => "low",
    Normal => "normal",
    High => "high",
    Top => "top",
});

tag_enum!(CommunicationType, default = Visit, {
    Call => "call",
    EMail => "email",
    Fax => "fax",
    Letter => "letter",
    Tape => "tape",
    Visit => "visit",
});

/// Which side of a communication the corresponder is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommunicationDir {
    From,
    To,
}

impl CommunicationDir {
    pub fn tag(&self) -> &'static str {
        match self {
            CommunicationDir::From => "FROM",
            CommunicationDir::To => "TO",
        }
    }
}

/// What a task record is aimed at, resolved from its `_GOAL` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GoalType {
    Individual,
    Family,
    Source,
    Other,
}

// ------------- Multimedia -------------
tag_enum!(MultimediaFormat, default = None, {
    None => "",
    Bmp => "bmp",
    Gif => "gif",
    Jpg => "jpg" | "jpeg",
    Ole => "ole",
    Pcx => "pcx",
    Tif => "tif" | "tiff",
    Wav => "wav",
    Txt => "txt",
    Rtf => "rtf",
    Avi => "avi",
    Tga => "tga",
    Png => "png",
    Mpg => "mpg" | "mpeg",
    Htm => "htm" | "html",
    Raw => "raw",
    Mp3 => "mp3",
    Wma => "wma",
    Psd => "psd",
    Pdf => "pdf",
    Mp4 => "mp4",
    Ogv => "ogv",
    Mka => "mka",
    Wmv => "wmv",
    Mkv => "mkv",
    Mov => "mov",
    Unknown => "unk",
});

impl MultimediaFormat {
    /// Guesses the format from a file name's extension.
    pub fn recognize(file_name: &str) -> Self {
        let ext = match file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() && !ext.contains(['/', '\\']) => ext,
            _ => return MultimediaFormat::Unknown,
        };
        match MultimediaFormat::from_tag(ext) {
            MultimediaFormat::None => MultimediaFormat::Unknown,
            format => format,
        }
    }
}

tag_enum!(
    /// `TYPE` under a multimedia `FORM` or a source `CALN`.
    MediaType, default = Unknown, {
    Unknown => "",
    Audio => "audio",
    Book => "book",
    Card => "card",
    Electronic => "electronic",
    Fiche => "fiche",
    Film => "film",
    Magazine => "magazine",
    Manuscript => "manuscript",
    Map => "map",
    Newspaper => "newspaper",
    Photo => "photo",
    Tombstone => "tombstone",
    Video => "video",
});

// ------------- Header -------------
tag_enum!(CharacterSet, default = Ascii, {
    Ascii => "ASCII" | "ANSI" | "IBMPC",
    Ansel => "ANSEL",
    Unicode => "UNICODE",
    Utf8 => "UTF-8" | "UTF8",
});

impl CharacterSet {
    /// Whether text in this character set is stored as UTF-8 on the wire.
    pub fn is_utf8(&self) -> bool {
        matches!(self, CharacterSet::Unicode | CharacterSet::Utf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_parse_but_write_primary() {
        assert_eq!(MultimediaFormat::from_tag("JPEG"), MultimediaFormat::Jpg);
        assert_eq!(MultimediaFormat::Jpg.tag(), "jpg");
        assert_eq!(CharacterSet::from_tag("ibmpc"), CharacterSet::Ascii);
        assert_eq!(CharacterSet::Utf8.tag(), "UTF-8");
    }

    #[test]
    fn unknown_text_is_default() {
        assert_eq!(MediaType::from_tag("test"), MediaType::Unknown);
        assert_eq!(CommunicationType::from_tag(""), CommunicationType::Visit);
        assert_eq!(MediaType::tag_at(15), "");
        assert_eq!(MediaType::tag_at(7), "magazine");
    }
}
