use cdi_cpt_index::CptIndex;
use std::path::Path;

const PREVIEW_ROWS: usize = 10;

pub(crate) fn render_cpt_index_summary(index: &CptIndex, output: &Path) -> String {
    let stats = &index.stats;
    let mut md = String::new();
    md.push_str(&format!(
        "Indexed {} rows from {} files across {} shards ({} skipped) in {} ms\n",
        index.entries.len(),
        stats.files_scanned,
        stats.shards,
        stats.files_skipped,
        stats.time_ms
    ));
    md.push_str(&format!("Wrote `{}`\n", output.display()));

    if index.entries.is_empty() {
        return md;
    }

    md.push_str("\n| cpt_code | payer | procedure |\n");
    md.push_str("|---|---|---|\n");
    for entry in index.entries.iter().take(PREVIEW_ROWS) {
        md.push_str(&format!(
            "| `{}` | {} | {} |\n",
            entry.code,
            escape_cell(&entry.payer),
            escape_cell(&truncate_one_line(&entry.procedure, 80)),
        ));
    }
    if index.entries.len() > PREVIEW_ROWS {
        md.push_str(&format!(
            "\n... {} more rows\n",
            index.entries.len() - PREVIEW_ROWS
        ));
    }
    md
}

fn truncate_one_line(text: &str, max_chars: usize) -> String {
    let s = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.chars().count() <= max_chars {
        return s;
    }
    let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{truncated}…")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdi_cpt_index::ScanStats;
    use cdi_protocol::CptIndexEntry;

    fn index(rows: usize) -> CptIndex {
        let entries = (0..rows)
            .map(|i| {
                CptIndexEntry::new(
                    format!("{}", 29800 + i),
                    "Shoulder | arthroscopy\nwith debridement",
                    "Anthem",
                    "shard/a.json",
                )
            })
            .collect::<Vec<_>>();
        CptIndex {
            stats: ScanStats {
                shards: 1,
                files_scanned: rows,
                entries: rows,
                ..ScanStats::default()
            },
            entries,
        }
    }

    #[test]
    fn summary_lists_rows_with_escaped_cells() {
        let text = render_cpt_index_summary(&index(2), Path::new("out.tsv"));
        assert!(text.starts_with("Indexed 2 rows from 2 files across 1 shards (0 skipped)"));
        assert!(text.contains("| `29800` | Anthem | Shoulder \\| arthroscopy with debridement |"));
        assert!(!text.contains("more rows"));
    }

    #[test]
    fn summary_caps_preview() {
        let text = render_cpt_index_summary(&index(12), Path::new("out.tsv"));
        assert!(text.contains("... 2 more rows"));
        assert!(!text.contains("29810"));
    }

    #[test]
    fn empty_index_has_no_table() {
        let text = render_cpt_index_summary(&index(0), Path::new("out.tsv"));
        assert!(!text.contains("| cpt_code |"));
    }

    #[test]
    fn truncation_marks_cut_text() {
        assert_eq!(truncate_one_line("abcdef", 4), "abc…");
        assert_eq!(truncate_one_line("a  b\tc", 10), "a b c");
    }
}
