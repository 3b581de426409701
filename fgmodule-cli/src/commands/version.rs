//! Version command - show the version the next build will stamp.

use fgmodule::ModulePackager;

use crate::commands::common::ModuleArgs;
use crate::error::CliError;

/// Run the version command.
pub fn run(args: ModuleArgs) -> Result<(), CliError> {
    let (config, _) = args.resolve()?;
    let packager = ModulePackager::new(config)?;

    println!("{}", packager.version());
    Ok(())
}
