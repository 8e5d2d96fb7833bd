use crate::{config, print_stdout, summary, Outcome};
use anyhow::Result;
use cdi_cpt_index::{
    default_output_path, normalize_targets, read_codes_file, write_tsv, CptIndexBuilder,
    CptIndexError, ScanStats,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct CptIndexOutput<'a> {
    output: String,
    codes: Vec<&'a str>,
    rows: usize,
    stats: &'a ScanStats,
}

pub(crate) fn run(
    codes: Vec<String>,
    codes_file: Option<PathBuf>,
    corpus_root: PathBuf,
    output: Option<PathBuf>,
    json: bool,
) -> Result<Outcome> {
    let mut values = codes;
    if let Some(path) = &codes_file {
        match read_codes_file(path) {
            Ok(lines) => values.extend(lines),
            Err(e) => log::warn!("Failed to read codes file {}: {e}", path.display()),
        }
    }

    let targets = normalize_targets(&values);
    let builder = CptIndexBuilder::new(&corpus_root, targets.clone());
    let index = match builder.build() {
        Ok(index) => index,
        Err(CptIndexError::NoTargets) => {
            eprintln!("Error: no CPT codes supplied (use --codes or --codes-file)");
            return Ok(Outcome::NoCodes);
        }
        Err(CptIndexError::NoShards(root)) => {
            eprintln!(
                "Error: no extracted_procedures* directories under {}",
                root.display()
            );
            return Ok(Outcome::NoShards);
        }
        Err(e) => return Err(e.into()),
    };

    let output = output.unwrap_or_else(|| {
        default_output_path(&config::output_dir(), chrono::Local::now().naive_local())
    });
    write_tsv(&index.entries, &output)?;

    if json {
        let out = CptIndexOutput {
            output: output.display().to_string(),
            codes: targets.iter().map(String::as_str).collect(),
            rows: index.entries.len(),
            stats: &index.stats,
        };
        print_stdout(&serde_json::to_string_pretty(&out)?)?;
    } else {
        print_stdout(&summary::render_cpt_index_summary(&index, &output))?;
    }
    Ok(Outcome::Done)
}
