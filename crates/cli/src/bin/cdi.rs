use anyhow::Result;

fn main() -> Result<()> {
    cdi_cli::main_entry()
}
