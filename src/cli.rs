//! Helpers to parse CLI arguments in the accompanying
//! binaries.
//!
//! APIs here shouldn't be considered stable / used as a
//! library.

use std::{fs::read, io};

use anyhow::{bail, Context, Result};
pub use clap::{App, Arg};
use indicatif::{ProgressBar, ProgressStyle};
pub use inflector::Inflector;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing_subscriber::EnvFilter;

#[macro_export]
macro_rules! args_parser {
    ($name:expr) => {{
        $crate::cli::App::new($name)
            .version(clap::crate_version!())
            .author(clap::crate_authors!())
    }};
}

#[macro_export]
macro_rules! arg {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name).value_name(&$name.to_screaming_snake_case())
    }};
}

#[macro_export]
macro_rules! opt {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name)
            .long(&$name.to_kebab_case())
            .value_name(&$name.to_screaming_snake_case())
    }};
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// One input file, loaded by [`process_paths_par`].
pub struct Input<T> {
    pub path: String,
    pub item: Result<T>,
}

/// Read and process `paths` in parallel, with a progress
/// bar. Per-file failures are reported in [`Input::item`].
pub fn process_paths_par<T, F>(
    paths: Vec<String>,
    load: F,
) -> impl ParallelIterator<Item = Input<T>>
where
    T: Send,
    F: Fn(&[u8]) -> Result<T> + Send + Sync,
{
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {wide_bar:cyan/blue} {pos:>7}/{len:7}"),
    );

    paths.into_par_iter().map(move |path| {
        let item = read(&path)
            .with_context(|| format!("could not read {}", path))
            .and_then(|bytes| load(&bytes));
        bar.inc(1);
        Input { path, item }
    })
}

/// Parse exactly `N` comma-separated coordinates, as in
/// `--rect 10,20,30,40`.
pub fn parse_coords<const N: usize>(value: &str) -> Result<[usize; N]> {
    let mut out = [0; N];
    let mut parts = value.split(',');
    for slot in out.iter_mut() {
        let part = match parts.next() {
            Some(part) => part.trim(),
            None => bail!("expected {} comma-separated values, got {:?}", N, value),
        };
        *slot = part
            .parse()
            .with_context(|| format!("invalid coordinate {:?} in {:?}", part, value))?;
    }
    if parts.next().is_some() {
        bail!("expected {} comma-separated values, got {:?}", N, value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords() -> Result<()> {
        assert_eq!(parse_coords::<4>("10,20, 30,40")?, [10, 20, 30, 40]);
        assert_eq!(parse_coords::<2>("0,0")?, [0, 0]);
        assert!(parse_coords::<4>("1,2,3").is_err());
        assert!(parse_coords::<2>("1,2,3").is_err());
        assert!(parse_coords::<2>("1,-2").is_err());
        assert!(parse_coords::<2>("").is_err());
        Ok(())
    }

    #[test]
    fn reports_unreadable_files() {
        let inputs: Vec<Input<usize>> =
            process_paths_par(vec!["/nonexistent/a.jpg".into()], |bytes| Ok(bytes.len()))
                .collect();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].path, "/nonexistent/a.jpg");
        assert!(inputs[0].item.is_err());
    }
}
