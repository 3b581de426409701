//! Catalog command - preview db.xml without writing anything.

use std::io::{self, Write};

use fgmodule::ModulePackager;

use crate::commands::common::ModuleArgs;
use crate::error::CliError;

/// Run the catalog command.
pub fn run(args: ModuleArgs) -> Result<(), CliError> {
    let stdout = io::stdout();
    write_catalog(args, &mut stdout.lock())
}

/// Write the catalog as ISO-8859-1 bytes, matching what `build` writes to db.xml.
fn write_catalog(args: ModuleArgs, out: &mut impl Write) -> Result<(), CliError> {
    let (config, _) = args.resolve()?;
    let packager = ModulePackager::new(config)?;
    let catalog = packager.build_catalog()?;
    let bytes = catalog.to_xml().to_latin1_document()?;

    out.write_all(&bytes)
        .and_then(|()| out.flush())
        .map_err(|e| CliError::Output(e.to_string()))
}
