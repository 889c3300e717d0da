use serde::Deserialize;

use crate::error::AppError;

/// Every mutable product field. Used for both create and full replacement.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
}

impl ProductInput {
    pub fn validate(self) -> Result<Self, AppError> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::Validation(
                "price: must be a non-negative number".into(),
            ));
        }
        if self.stock < 0 {
            return Err(AppError::Validation("stock: must be non-negative".into()));
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Pagination {
    pub fn validate(self) -> Result<Self, AppError> {
        if self.skip < 0 || self.limit < 0 {
            return Err(AppError::Validation(
                "skip and limit must be non-negative".into(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(price: f64, stock: i32) -> ProductInput {
        ProductInput {
            name: "Phone".into(),
            description: "A phone".into(),
            price,
            stock,
        }
    }

    #[test]
    fn accepts_zero_price_and_stock() {
        assert!(input(0.0, 0).validate().is_ok());
    }

    #[test]
    fn rejects_negative_or_non_finite_price() {
        assert!(input(-0.01, 1).validate().is_err());
        assert!(input(f64::NAN, 1).validate().is_err());
        assert!(input(f64::INFINITY, 1).validate().is_err());
    }

    #[test]
    fn rejects_negative_stock() {
        assert!(input(1.0, -1).validate().is_err());
    }

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").expect("defaults");
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, 100);
        assert!(Pagination { skip: -1, limit: 5 }.validate().is_err());
    }
}
