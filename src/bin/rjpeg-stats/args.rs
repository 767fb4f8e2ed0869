use anyhow::Result;
use clap::value_t_or_exit;
use rjpeg::{arg, args_parser, cli::parse_coords, opt, DiagonalSampling, MeasurementParams};

pub struct Args {
    pub paths: Vec<String>,
    pub params: Option<MeasurementParams>,
    pub rects: Vec<[usize; 4]>,
    pub lines: Vec<[usize; 4]>,
    pub sampling: DiagonalSampling,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("rjpeg-stats")
            .about("Compute temperature stats of R-JPEGs over the whole image and given regions.")
            .arg(
                opt!("distance")
                    .short("d")
                    .help("Distance to the target in meters, 1 to 25 (default: as stored in image)"),
            )
            .arg(opt!("humidity").help("Relative humidity in percent, 20 to 100"))
            .arg(opt!("emissivity").help("Target emissivity, 0.10 to 1.00"))
            .arg(opt!("reflection").help("Reflected temperature in celsius, -40 to 500"))
            .arg(
                opt!("rect")
                    .short("r")
                    .multiple(true)
                    .number_of_values(1)
                    .help("Rectangle X,Y,W,H (inclusive of both edges)"),
            )
            .arg(
                opt!("line")
                    .short("l")
                    .multiple(true)
                    .number_of_values(1)
                    .help("Line segment X1,Y1,X2,Y2"),
            )
            .arg(
                opt!("start row diagonal")
                    .takes_value(false)
                    .help("Sample diagonal lines along the main diagonal of their bounding box"),
            )
            .arg(
                arg!("paths")
                    .required(true)
                    .multiple(true)
                    .help("R-JPEG paths"),
            )
            .get_matches();

        let paths = matches
            .values_of("paths")
            .into_iter()
            .flatten()
            .map(|f| f.into())
            .collect();

        let value = |name: &str| {
            matches
                .is_present(name)
                .then(|| value_t_or_exit!(matches.value_of(name), f32))
        };
        let overrides = [
            value("distance"),
            value("humidity"),
            value("emissivity"),
            value("reflection"),
        ];
        let params = overrides.iter().any(Option::is_some).then(|| {
            let defaults = MeasurementParams::default();
            MeasurementParams {
                distance: overrides[0].unwrap_or(defaults.distance),
                humidity: overrides[1].unwrap_or(defaults.humidity),
                emissivity: overrides[2].unwrap_or(defaults.emissivity),
                reflection: overrides[3].unwrap_or(defaults.reflection),
            }
        });
        if let Some(params) = &params {
            params.validate()?;
        }

        let coords = |name: &str| -> Result<Vec<[usize; 4]>> {
            matches
                .values_of(name)
                .into_iter()
                .flatten()
                .map(parse_coords::<4>)
                .collect()
        };
        let rects = coords("rect")?;
        let lines = coords("line")?;

        let sampling = if matches.is_present("start row diagonal") {
            DiagonalSampling::StartRow
        } else {
            DiagonalSampling::Collinear
        };

        Ok(Args {
            paths,
            params,
            rects,
            lines,
            sampling,
        })
    }
}
