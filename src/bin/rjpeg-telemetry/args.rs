use anyhow::Result;
use rjpeg::{arg, args_parser, opt};

pub struct Args {
    pub paths: Vec<String>,
    pub pretty: bool,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("rjpeg-telemetry")
            .about("Print drone telemetry and metadata of R-JPEGs as json.")
            .arg(
                opt!("pretty")
                    .short("p")
                    .takes_value(false)
                    .help("Pretty-print the json output"),
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
        let pretty = matches.is_present("pretty");

        Ok(Args { paths, pretty })
    }
}
