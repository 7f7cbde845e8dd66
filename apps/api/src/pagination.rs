use serde::Serialize;

use crate::errors::AppError;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;
const MAX_OFFSET: i64 = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

pub fn validate_pagination(
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<(i64, i64), AppError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let offset = offset.unwrap_or(0);

    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    if !(0..=MAX_OFFSET).contains(&offset) {
        return Err(AppError::Validation(format!(
            "offset must be between 0 and {MAX_OFFSET}"
        )));
    }

    Ok((limit, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        assert_eq!(validate_pagination(None, None).unwrap(), (20, 0));
    }

    #[test]
    fn test_bounds_accepted() {
        assert_eq!(validate_pagination(Some(1), Some(0)).unwrap(), (1, 0));
        assert_eq!(
            validate_pagination(Some(MAX_LIMIT), Some(MAX_OFFSET)).unwrap(),
            (MAX_LIMIT, MAX_OFFSET)
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(validate_pagination(Some(0), None).is_err());
        assert!(validate_pagination(Some(MAX_LIMIT + 1), None).is_err());
        assert!(validate_pagination(None, Some(-1)).is_err());
        assert!(validate_pagination(None, Some(MAX_OFFSET + 1)).is_err());
    }
}
