use crate::error::{CptIndexError, Result};
use cdi_protocol::{write_atomic, CptIndexEntry};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

pub const TSV_HEADER: [&str; 4] = ["cpt_code", "procedure", "payer", "source_file"];

/// Render entries as tab-separated rows under [`TSV_HEADER`].
pub fn render_tsv(entries: &[CptIndexEntry]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());
    writer.write_record(TSV_HEADER)?;
    for entry in entries {
        writer.write_record([
            entry.code.as_str(),
            entry.procedure.as_str(),
            entry.payer.as_str(),
            entry.source_file.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| CptIndexError::IoError(e.into_error()))
}

/// Write the index to `path`, creating parent directories.
pub fn write_tsv(entries: &[CptIndexEntry], path: &Path) -> Result<()> {
    let bytes = render_tsv(entries)?;
    write_atomic(path, &bytes)?;
    log::info!("Wrote {} rows to {}", entries.len(), path.display());
    Ok(())
}

pub fn default_output_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    dir.join(format!("cpt_index_{}.tsv", now.format("%Y%m%d_%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn renders_header_and_rows() {
        let entries = vec![CptIndexEntry::new(
            "29827",
            "Rotator cuff repair",
            "Anthem",
            "extracted_procedures_single_call_Anthem_v2/rcr.json",
        )];
        let text = String::from_utf8(render_tsv(&entries).unwrap()).unwrap();
        assert_eq!(
            text,
            "cpt_code\tprocedure\tpayer\tsource_file\n\
             29827\tRotator cuff repair\tAnthem\textracted_procedures_single_call_Anthem_v2/rcr.json\n"
        );
    }

    #[test]
    fn empty_index_is_header_only() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("out").join("index.tsv");
        write_tsv(&[], &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "cpt_code\tprocedure\tpayer\tsource_file\n"
        );
    }

    #[test]
    fn default_path_is_timestamped() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        assert_eq!(
            default_output_path(Path::new("reports"), now),
            PathBuf::from("reports/cpt_index_20240309_070501.tsv")
        );
    }
}
