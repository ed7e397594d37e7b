use std::env::VarError;
use std::num::ParseIntError;

use crate::config::DEFAULT_MAX_RECORDS_PER_PAGE;

/// Environment variable holding the page capacity.
pub const ENV_VAR: &str = "SITEMAP_MAX_RECORDS";

/// Page capacity from `SITEMAP_MAX_RECORDS`, or the default when it is unset.
pub fn get_max_records() -> Result<usize, MaxRecordsError> {
    max_records_from(std::env::var(ENV_VAR))
}

/// Interprets an environment lookup result as a page capacity.
pub fn max_records_from(value: Result<String, VarError>) -> Result<usize, MaxRecordsError> {
    match value {
        Ok(v) => match v.trim().parse::<usize>()? {
            0 => Err(MaxRecordsError::NonPositive),
            n => Ok(n),
        },
        Err(VarError::NotPresent) => Ok(DEFAULT_MAX_RECORDS_PER_PAGE),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug)]
pub enum MaxRecordsError {
    ParseIntError(ParseIntError),
    NonPositive,
    NotUnicode(VarError),
}

impl std::error::Error for MaxRecordsError {}

impl From<ParseIntError> for MaxRecordsError {
    fn from(error: ParseIntError) -> Self {
        Self::ParseIntError(error)
    }
}

impl From<VarError> for MaxRecordsError {
    fn from(error: VarError) -> Self {
        Self::NotUnicode(error)
    }
}

impl std::fmt::Display for MaxRecordsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::ParseIntError(e) => write!(f, "Failed to parse {} as an integer: {}", ENV_VAR, e),
            Self::NonPositive => write!(f, "{} must be a positive number", ENV_VAR),
            Self::NotUnicode(e) => write!(f, "Environment variable {} is unreadable: {}", ENV_VAR, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_records_from() {
        assert_eq!(max_records_from(Err(VarError::NotPresent)).unwrap(), DEFAULT_MAX_RECORDS_PER_PAGE);
        assert_eq!(max_records_from(Ok(" 1000 ".to_string())).unwrap(), 1000);
        assert!(matches!(max_records_from(Ok("0".to_string())), Err(MaxRecordsError::NonPositive)));
        assert!(matches!(
            max_records_from(Ok("lots".to_string())),
            Err(MaxRecordsError::ParseIntError(_))
        ));
    }
}
