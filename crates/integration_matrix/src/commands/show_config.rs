use anyhow::Result;

use crate::cli_args::CliArgs;

pub fn show_config(top_args: &CliArgs) -> Result<()> {
    let params = super::load_parameters(top_args)?;
    print!("{}", serde_yaml::to_string(&params.to_raw())?);
    Ok(())
}
