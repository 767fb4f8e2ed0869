use std::{fs::read, path::Path};

use anyhow::{Context, Result};

use crate::{
    decode::{Decoder, MeasurementParams},
    error::DecodeError,
    exif::{read_exif, ExifInfo},
    grid::TemperatureGrid,
    telemetry::{MetadataBag, TelemetryRecord},
};

/// Everything read from one R-JPEG.
#[derive(Debug, Clone)]
pub struct ThermalImage {
    /// Size of the file in bytes.
    pub size: usize,
    /// Parameters the temperatures were computed with.
    pub params: MeasurementParams,
    pub grid: TemperatureGrid,
    pub telemetry: TelemetryRecord,
    pub metadata: MetadataBag,
    pub exif: Option<ExifInfo>,
}

impl ThermalImage {
    /// Decode an R-JPEG and read its metadata. A decode
    /// failure is returned as-is; missing metadata is not an
    /// error.
    pub fn try_from_bytes<D: Decoder + ?Sized>(
        bytes: &[u8],
        decoder: &D,
        params: Option<&MeasurementParams>,
    ) -> Result<Self, DecodeError> {
        let frame = decoder.decode(bytes, params)?;
        let params = frame.params;
        let grid = frame.into_grid()?;

        let (telemetry, metadata) = TelemetryRecord::scan(bytes);
        let exif = read_exif(bytes);

        Ok(ThermalImage {
            size: bytes.len(),
            params,
            grid,
            telemetry,
            metadata,
            exif,
        })
    }

    pub fn try_from_path<P: AsRef<Path>, D: Decoder + ?Sized>(
        path: P,
        decoder: &D,
        params: Option<&MeasurementParams>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = read(path).with_context(|| format!("could not read {}", path.display()))?;
        let image = Self::try_from_bytes(&bytes, decoder, params)
            .with_context(|| format!("could not decode {}", path.display()))?;
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;
    use crate::decode::RawFrame;

    /// Decodes every input to a fixed 3x2 frame.
    struct FixedDecoder;

    impl Decoder for FixedDecoder {
        fn decode(
            &self,
            _bytes: &[u8],
            params: Option<&MeasurementParams>,
        ) -> Result<RawFrame, DecodeError> {
            Ok(RawFrame {
                width: 3,
                height: 2,
                raw: vec![100, 200, 300, 400, 500, 655],
                params: params.copied().unwrap_or_default(),
            })
        }
    }

    struct FailingDecoder;

    impl Decoder for FailingDecoder {
        fn decode(&self, _: &[u8], _: Option<&MeasurementParams>) -> Result<RawFrame, DecodeError> {
            Err(DecodeError::Create(-7))
        }
    }

    struct ShortDecoder;

    impl Decoder for ShortDecoder {
        fn decode(&self, _: &[u8], _: Option<&MeasurementParams>) -> Result<RawFrame, DecodeError> {
            Ok(RawFrame {
                width: 2,
                height: 2,
                raw: vec![1, 2, 3],
                params: MeasurementParams::default(),
            })
        }
    }

    const BYTES: &[u8] = br#"....<rdf:Description drone-dji:GpsLatitude="+31.230416" drone-dji:RtkFlag="50"></rdf:Description>...."#;

    #[test]
    fn reads_grid_and_metadata() -> anyhow::Result<()> {
        let image = ThermalImage::try_from_bytes(BYTES, &FixedDecoder, None)?;
        assert_eq!(image.size, BYTES.len());
        assert_eq!(image.grid.dim(), (3, 2));
        assert_eq!(image.grid.point_query(2, 1)?, Decimal::new(655, 1));
        assert_eq!(
            image.telemetry.gps_latitude,
            Some(Decimal::from_str("31.230416")?)
        );
        assert_eq!(image.telemetry.rtk_flag, Some(50));
        assert_eq!(image.metadata.get("drone-dji:GpsLatitude"), Some("31.230416"));
        assert_eq!(image.exif, None);

        let whole = image.grid.whole_image_query()?;
        assert_eq!(whole.max_value, Decimal::new(655, 1));
        assert_eq!((whole.max_x, whole.max_y), (2, 1));
        Ok(())
    }

    #[test]
    fn params_are_passed_through() -> anyhow::Result<()> {
        let params = MeasurementParams {
            distance: 10.0,
            ..Default::default()
        };
        let image = ThermalImage::try_from_bytes(BYTES, &FixedDecoder, Some(&params))?;
        assert_eq!(image.params, params);
        Ok(())
    }

    #[test]
    fn decode_failure_propagates() {
        let err = ThermalImage::try_from_bytes(BYTES, &FailingDecoder, None).unwrap_err();
        assert!(matches!(err, DecodeError::Create(-7)));
    }

    #[test]
    fn bad_frame_shape() {
        let err = ThermalImage::try_from_bytes(BYTES, &ShortDecoder, None).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::GridShape {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn boxed_decoder() -> anyhow::Result<()> {
        let decoder: Box<dyn Decoder> = Box::new(FixedDecoder);
        let image = ThermalImage::try_from_bytes(b"", &decoder, None)?;
        assert!(image.telemetry.is_empty());
        assert!(image.metadata.is_empty());
        Ok(())
    }

    #[test]
    fn missing_file() {
        assert!(ThermalImage::try_from_path("/nonexistent/image.jpg", &FixedDecoder, None).is_err());
    }
}
