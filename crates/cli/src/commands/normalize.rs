use super::read_json;
use crate::{print_stdout, Outcome};
use anyhow::Result;
use cdi_normalizer::normalize;
use cdi_protocol::{serialize_json_pretty, ProcessingResult};
use std::path::Path;

pub(crate) fn run(input: &Path, display_name: Option<String>) -> Result<Outcome> {
    let result = ProcessingResult::from(read_json(input)?);
    let display_name = display_name.unwrap_or_else(|| {
        input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let response = normalize(&result, &display_name);
    if !response.success {
        log::warn!("Engine result for {display_name} carries an error");
    }
    print_stdout(&serialize_json_pretty(&response)?)?;
    Ok(Outcome::Done)
}
