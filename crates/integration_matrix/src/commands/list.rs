use anyhow::Result;

use crate::cli_args::{CliArgs, ListArgs};

pub fn list(top_args: &CliArgs, list_args: &ListArgs) -> Result<()> {
    let params = super::load_parameters(top_args)?;

    for e in super::selected_entries(&params, &list_args.filter)? {
        if list_args.verbose {
            println!(
                "{} {} {}",
                e.identity.test_name,
                e.identity.namespace,
                e.layout.test_root.display()
            );
        } else {
            println!("{}", e.identity.test_name);
        }
    }
    Ok(())
}
