pub mod calibration;
pub mod numeric;
pub mod text;

use crate::error::DecodeError;
use crate::models::FieldWarning;

pub use calibration::Calibration;
pub use numeric::NumericDecoder;
pub use text::TextDecoder;

/// Receives decode problems that were recovered locally.
pub trait DecodeSink {
    fn report(&mut self, field: &str, error: &DecodeError);
}

/// Logs every report as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DecodeSink for TracingSink {
    fn report(&mut self, field: &str, error: &DecodeError) {
        tracing::warn!(field, "Decode fell back to default: {}", error);
    }
}

impl DecodeSink for Vec<FieldWarning> {
    fn report(&mut self, field: &str, error: &DecodeError) {
        self.push(FieldWarning {
            field: field.to_string(),
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_vec_collects_reports() {
        let mut warnings: Vec<FieldWarning> = Vec::new();
        warnings.report("WOOD_BALANCE", &DecodeError::OutOfRange);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "WOOD_BALANCE");
    }
}
