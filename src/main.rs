use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use gedcore::config::Settings;
use gedcore::enums::TagEnum;
use gedcore::io::{GedcomWriter, ReadOptions};
use gedcore::interface::TracingProgress;
use gedcore::matching::Matcher;
use gedcore::record::RecordType;
use gedcore::tag::standard_factory;
use gedcore::tree::Document;

#[derive(Parser, Debug)]
#[command(name = "gedcore")]
#[command(about = "Loads a genealogy file, reports duplicates and writes it back")]
#[command(version)]
struct Cli {
    /// File to read
    input: PathBuf,

    /// Write the document to this file after loading
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print record pairs scoring at least this much as JSON
    #[arg(long, value_name = "MIN_SCORE")]
    duplicates: Option<f32>,

    /// Settings file, extension optional
    #[arg(long, env = "GEDCORE_CONFIG")]
    config: Option<String>,

    /// Take malformed pointers as written instead of failing
    #[arg(long)]
    lenient: bool,
}

#[derive(Serialize)]
struct DuplicatePair {
    kind: String,
    left: String,
    right: String,
    score: f32,
}

fn run(cli: &Cli) -> gedcore::error::Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    gedcore::logging::init(&settings.log_filter);

    let read_options = ReadOptions {
        strict_xrefs: settings.strict_xrefs && !cli.lenient,
        ..ReadOptions::default()
    };
    let mut document = Document::new();
    document.load_file(&cli.input, &settings.default_encoding, &read_options)?;
    for (kind, count) in document.statistics() {
        info!(kind = %kind, count, "records");
    }

    if let Some(min_score) = cli.duplicates {
        let matcher = Matcher::within(&document, &settings.match_params);
        let mut progress = TracingProgress::default();
        let mut pairs = Vec::new();
        for kind in [RecordType::Individual, RecordType::Family, RecordType::Source, RecordType::Note] {
            for (left, right, score) in matcher.find_duplicates(kind, min_score, &mut progress) {
                pairs.push(DuplicatePair { kind: kind.to_string(), left, right, score });
            }
        }
        match serde_json::to_string_pretty(&pairs) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "could not serialize duplicates"),
        }
    }

    if let Some(out) = &cli.out {
        if document.header().find_tag("CHAR", 0).is_none() {
            let charset = settings.charset();
            document.header_mut().set_tag_string(standard_factory(), "CHAR", charset.tag());
        }
        let writer = GedcomWriter::new(settings.line_width);
        document.save_file(out, &settings.default_encoding, &writer)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gedcore: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_parse() {
        let cli = Cli::try_parse_from(["gedcore", "tree.ged", "--out", "copy.ged", "--duplicates", "75", "--lenient"])
            .expect("valid arguments");
        assert_eq!(cli.input, PathBuf::from("tree.ged"));
        assert_eq!(cli.out, Some(PathBuf::from("copy.ged")));
        assert_eq!(cli.duplicates, Some(75.0));
        assert!(cli.lenient);
        assert!(Cli::try_parse_from(["gedcore"]).is_err());
        assert!(Cli::try_parse_from(["gedcore", "tree.ged", "--duplicates", "many"]).is_err());
    }
}
