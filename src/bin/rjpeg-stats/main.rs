mod args;

use std::io::stdout;

use anyhow::Result;
use rayon::iter::ParallelIterator;
use serde_derive::*;
use tracing::warn;

use rjpeg::{
    cli::{init_logging, process_paths_par},
    dji::DirpDecoder,
    MeasurementParams, QueryError, RegionStats, ThermalImage,
};

use args::Args;

#[derive(Serialize, Debug)]
struct RegionOutput {
    region: [usize; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<RegionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RegionOutput {
    fn new(region: [usize; 4], result: Result<RegionStats, QueryError>) -> Self {
        match result {
            Ok(stats) => RegionOutput {
                region,
                stats: Some(stats),
                error: None,
            },
            Err(e) => RegionOutput {
                region,
                stats: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Serialize, Debug)]
struct ImageStats {
    path: String,
    width: usize,
    height: usize,
    params: MeasurementParams,
    whole: Option<RegionStats>,
    rects: Vec<RegionOutput>,
    lines: Vec<RegionOutput>,
}

fn main() -> Result<()> {
    init_logging();
    let Args {
        paths,
        params,
        rects,
        lines,
        sampling,
    } = Args::from_cmd_line()?;

    let stats: Vec<_> = process_paths_par(paths, |bytes| {
        let image = ThermalImage::try_from_bytes(bytes, &DirpDecoder, params.as_ref())?;
        let grid = &image.grid;
        let (width, height) = grid.dim();
        Ok(ImageStats {
            path: String::new(),
            width,
            height,
            params: image.params,
            whole: grid.whole_image_query().ok(),
            rects: rects
                .iter()
                .map(|&[x, y, w, h]| RegionOutput::new([x, y, w, h], grid.rect_query(x, y, w, h)))
                .collect(),
            lines: lines
                .iter()
                .map(|&[x1, y1, x2, y2]| {
                    RegionOutput::new(
                        [x1, y1, x2, y2],
                        grid.line_query_with(x1, y1, x2, y2, sampling),
                    )
                })
                .collect(),
        })
    })
    .filter_map(|input| match input.item {
        Ok(stats) => Some(ImageStats {
            path: input.path,
            ..stats
        }),
        Err(e) => {
            warn!(path = %input.path, "skipping: {:#}", e);
            None
        }
    })
    .collect();

    serde_json::to_writer(stdout().lock(), &stats)?;
    Ok(())
}
