//! Print the OpenAPI document as JSON.

use std::io::{self, Write};

use color_eyre::eyre::{Context, Result};
use facility_ops::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("failed to serialise the OpenAPI document")?;
    let mut out = io::stdout().lock();
    writeln!(out, "{json}").wrap_err("failed to write to stdout")?;
    out.flush().wrap_err("failed to flush stdout")
}
