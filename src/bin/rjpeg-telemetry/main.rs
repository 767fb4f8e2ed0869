mod args;

use std::io::stdout;

use anyhow::Result;
use rayon::iter::ParallelIterator;
use serde_derive::*;
use tracing::warn;

use rjpeg::{
    cli::{init_logging, process_paths_par},
    exif::{read_exif, ExifInfo},
    MetadataBag, TelemetryRecord,
};

use args::Args;

#[derive(Serialize, Debug)]
struct ImageTelemetry {
    path: String,
    size: usize,
    telemetry: TelemetryRecord,
    metadata: MetadataBag,
    exif: Option<ExifInfo>,
}

fn main() -> Result<()> {
    init_logging();
    let Args { paths, pretty } = Args::from_cmd_line()?;

    let loaded: Vec<_> = process_paths_par(paths, |bytes| {
        let (telemetry, metadata) = TelemetryRecord::scan(bytes);
        Ok((bytes.len(), telemetry, metadata, read_exif(bytes)))
    })
    .collect();

    let mut output = Vec::with_capacity(loaded.len());
    for input in loaded {
        match input.item {
            Ok((size, telemetry, metadata, exif)) => output.push(ImageTelemetry {
                path: input.path,
                size,
                telemetry,
                metadata,
                exif,
            }),
            Err(e) => warn!(path = %input.path, "skipping: {:#}", e),
        }
    }

    let out = stdout();
    if pretty {
        serde_json::to_writer_pretty(out.lock(), &output)?;
    } else {
        serde_json::to_writer(out.lock(), &output)?;
    }
    Ok(())
}
