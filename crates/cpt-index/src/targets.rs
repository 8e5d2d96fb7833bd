use std::collections::BTreeSet;
use std::path::Path;

/// Normalize CLI/file supplied codes into a lookup set.
///
/// Each value may hold several comma-separated codes. Codes are trimmed;
/// blanks are dropped.
pub fn normalize_targets<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|value| {
            value
                .as_ref()
                .split(',')
                .map(|code| code.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|code| !code.is_empty())
        .collect()
}

/// Codes listed in a text file, one or more per line.
///
/// Blank lines and `#` comments are ignored.
pub fn read_codes_file(path: &Path) -> std::io::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    let codes: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    log::debug!("Read {} code lines from {}", codes.len(), path.display());
    Ok(codes)
}
