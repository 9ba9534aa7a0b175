use serde::{Deserialize, Serialize};

use crate::enums::{CharacterSet, TagEnum};
use crate::error::{GedcomError, Result};
use crate::io::{DEFAULT_ENCODING, MAX_LINE_VALUE};
use crate::matching::MatchParams;

/// Settings read from an optional `gedcore` file and `GEDCORE_*` variables.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Code page for files without a byte order mark or UTF-8 declaration
    #[serde(default = "default_encoding")]
    pub default_encoding: String,

    /// Filter directive for the log subscriber, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Character set written into the header of new documents
    #[serde(default = "default_charset")]
    pub charset: String,

    #[serde(default)]
    pub match_params: MatchParams,

    /// Longest value on one line before it continues with `CONC`
    #[serde(default = "default_line_width")]
    pub line_width: usize,

    /// Malformed pointers abort a load
    #[serde(default = "default_strict_xrefs")]
    pub strict_xrefs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_encoding: default_encoding(),
            log_filter: default_log_filter(),
            charset: default_charset(),
            match_params: MatchParams::default(),
            line_width: default_line_width(),
            strict_xrefs: default_strict_xrefs(),
        }
    }
}

impl Settings {
    /// Loads `gedcore.{json,toml,yaml}` from the working directory when
    /// present, then applies `GEDCORE_*` environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from("gedcore")
    }
    /// Like [`Settings::load`] with an explicit file name (extension optional).
    pub fn load_from(name: &str) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("GEDCORE").separator("__"));
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
    pub fn validate(&self) -> Result<()> {
        let threshold = self.match_params.names_indistinct_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(GedcomError::Config(format!("names_indistinct_threshold {} is outside 0..1", threshold)));
        }
        if self.match_params.years_inaccuracy < 0 {
            return Err(GedcomError::Config(format!(
                "years_inaccuracy {} is negative",
                self.match_params.years_inaccuracy
            )));
        }
        if encoding_rs::Encoding::for_label(self.default_encoding.as_bytes()).is_none() {
            return Err(GedcomError::Config(format!("unknown encoding '{}'", self.default_encoding)));
        }
        if self.line_width == 0 {
            return Err(GedcomError::Config("line_width must be positive".to_string()));
        }
        Ok(())
    }
    pub fn charset(&self) -> CharacterSet {
        CharacterSet::from_tag(&self.charset)
    }
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

fn default_line_width() -> usize {
    MAX_LINE_VALUE
}

fn default_strict_xrefs() -> bool {
    true
}
