//! [`Decoder`] backed by the DJI Thermal SDK (`libdirp`).
use std::{
    convert::TryFrom,
    mem::{size_of, MaybeUninit},
};

use dji_thermal_sys::*;
use tracing::warn;

use crate::{
    decode::{Decoder, MeasurementParams, RawFrame},
    error::DecodeError,
};

/// Decodes R-JPEGs with the vendor SDK, one native handle
/// per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirpDecoder;

impl Decoder for DirpDecoder {
    fn decode(
        &self,
        bytes: &[u8],
        params: Option<&MeasurementParams>,
    ) -> Result<RawFrame, DecodeError> {
        let handle = Handle::create(bytes)?;
        if let Some(params) = params {
            params.validate()?;
            handle.set_measurement_params(params)?;
        }

        let params = handle.measurement_params()?;
        let (width, height) = handle.dimensions()?;
        let raw = handle.measure(width, height)?;
        handle.close()?;

        Ok(RawFrame {
            width,
            height,
            raw,
            params,
        })
    }
}

/// Owned `DIRP_HANDLE`, destroyed when dropped.
#[derive(Debug)]
struct Handle {
    handle: DIRP_HANDLE,
}

impl Handle {
    fn create(bytes: &[u8]) -> Result<Self, DecodeError> {
        let size = i32::try_from(bytes.len()).map_err(|_| DecodeError::Size(bytes.len()))?;
        let mut handle = MaybeUninit::uninit();
        let ret = unsafe { dirp_create_from_rjpeg(bytes.as_ptr(), size, handle.as_mut_ptr()) };
        if ret != 0 {
            return Err(DecodeError::Create(ret));
        }

        Ok(Handle {
            handle: unsafe { handle.assume_init() },
        })
    }

    fn measurement_params(&self) -> Result<MeasurementParams, DecodeError> {
        let mut params = MaybeUninit::<dirp_measurement_params_t>::uninit();
        let ret = unsafe { dirp_get_measurement_params(self.handle, params.as_mut_ptr()) };
        if ret != 0 {
            return Err(DecodeError::MeasurementParams(ret));
        }

        let params = unsafe { params.assume_init() };
        Ok(MeasurementParams {
            distance: params.distance,
            humidity: params.humidity,
            emissivity: params.emissivity,
            reflection: params.reflection,
        })
    }

    fn set_measurement_params(&self, params: &MeasurementParams) -> Result<(), DecodeError> {
        let mut raw = dirp_measurement_params_t {
            distance: params.distance,
            humidity: params.humidity,
            emissivity: params.emissivity,
            reflection: params.reflection,
        };
        let ret = unsafe { dirp_set_measurement_params(self.handle, &mut raw) };
        if ret != 0 {
            return Err(DecodeError::MeasurementParams(ret));
        }
        Ok(())
    }

    fn dimensions(&self) -> Result<(usize, usize), DecodeError> {
        let mut resolution = MaybeUninit::uninit();
        let ret = unsafe { dirp_get_rjpeg_resolution(self.handle, resolution.as_mut_ptr()) };
        if ret != 0 {
            return Err(DecodeError::Resolution(ret));
        }

        let resolution: dirp_resolution_t = unsafe { resolution.assume_init() };
        if resolution.width < 0 || resolution.height < 0 {
            return Err(DecodeError::Resolution(ret));
        }
        Ok((resolution.width as usize, resolution.height as usize))
    }

    /// Raw temperatures in tenths of a degree, row-major.
    fn measure(&self, width: usize, height: usize) -> Result<Vec<i16>, DecodeError> {
        let num_values = width * height;
        let size = i32::try_from(num_values * size_of::<i16>())
            .map_err(|_| DecodeError::Size(num_values * size_of::<i16>()))?;

        let mut values: Vec<i16> = vec![0; num_values];
        let ret = unsafe { dirp_measure(self.handle, values.as_mut_ptr(), size) };
        if ret != 0 {
            return Err(DecodeError::Measure(ret));
        }
        Ok(values)
    }

    /// Destroy the handle, reporting failure.
    fn close(mut self) -> Result<(), DecodeError> {
        let handle = std::mem::replace(&mut self.handle, std::ptr::null_mut());
        let ret = unsafe { dirp_destroy(handle) };
        if ret != 0 {
            return Err(DecodeError::Destroy(ret));
        }
        Ok(())
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        let ret = unsafe { dirp_destroy(self.handle) };
        if ret != 0 {
            warn!(code = ret, "could not release decode handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Context, Result};
    use glob::{glob_with, MatchOptions};

    use std::{env, fs, path::Path};

    use super::DirpDecoder;
    use crate::{ThermalImage, TemperatureGrid};

    #[test]
    fn decode_datasets() -> Result<()> {
        let base = match env::var("THERMAL_DATASETS_PATH") {
            Ok(base) => base,
            Err(_) => return Ok(()),
        };
        let mut opts = MatchOptions::new();
        opts.case_sensitive = false;
        eprintln!("Verifying {base}/**/*.jpg");
        for path in glob_with(&format!("{base}/**/*.jpg"), opts)? {
            let path = path?;
            eprintln!("Reading {path}...", path = path.display());
            match decode_at_path(&path) {
                Ok((wid, ht)) => eprintln!("\tdims: {wid}x{ht}"),
                Err(e) => eprintln!("\t{e:#}"),
            }
        }
        Ok(())
    }

    fn decode_at_path(path: &Path) -> Result<(usize, usize)> {
        let bytes = fs::read(path)?;
        let image = ThermalImage::try_from_bytes(&bytes, &DirpDecoder, None)
            .context("dji rjpeg decoding failed")?;
        let grid: &TemperatureGrid = &image.grid;
        let whole = grid.whole_image_query()?;
        assert!(whole.min_value <= whole.avg_value && whole.avg_value <= whole.max_value);
        Ok(grid.dim())
    }
}
