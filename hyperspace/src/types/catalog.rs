use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HyperError, Result};

/// A data bundle sold by an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub data: String,
    pub validity: String,
    #[serde(rename = "costNGN")]
    pub cost_ngn: Decimal,
    #[serde(rename = "costUSD")]
    pub cost_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
    pub code: String,
    pub operators: Vec<Operator>,
}

/// Static country → operator → product lookup table for data top-ups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub countries: Vec<Country>,
}

fn product(id: &str, name: &str, data: &str, validity: &str, ngn: i64, usd_cents: i64) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        data: data.into(),
        validity: validity.into(),
        cost_ngn: Decimal::from(ngn),
        cost_usd: Decimal::new(usd_cents, 2),
    }
}

impl Catalog {
    /// The wholesale catalog shipped with the client.
    pub fn builtin() -> Self {
        Self {
            countries: vec![
                Country {
                    id: "c1".into(),
                    name: "Nigeria".into(),
                    code: "NG".into(),
                    operators: vec![
                        Operator {
                            id: "op1".into(),
                            name: "MTN Nigeria".into(),
                            products: vec![
                                product("p1", "SME 500MB", "500MB", "30 Days", 150, 10),
                                product("p2", "SME 1GB", "1GB", "30 Days", 280, 18),
                                product("p3", "SME 5GB", "5GB", "30 Days", 1350, 88),
                            ],
                        },
                        Operator {
                            id: "op2".into(),
                            name: "Airtel Nigeria".into(),
                            products: vec![
                                product("p4", "Social 2GB", "2GB", "7 Days", 500, 32),
                                product("p5", "Big Data 10GB", "10GB", "30 Days", 2800, 182),
                            ],
                        },
                    ],
                },
                Country {
                    id: "c2".into(),
                    name: "United States".into(),
                    code: "US".into(),
                    operators: vec![Operator {
                        id: "op3".into(),
                        name: "AT&T".into(),
                        products: vec![product("p6", "Intl 1GB", "1GB", "30 Days", 8000, 520)],
                    }],
                },
            ],
        }
    }

    pub fn find_country(&self, code: &str) -> Option<&Country> {
        self.countries
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code) || c.id == code)
    }

    /// Look up a product by id across every country and operator.
    pub fn find_product(&self, product_id: &str) -> Result<&Product> {
        self.products()
            .map(|(_, _, p)| p)
            .find(|p| p.id == product_id)
            .ok_or_else(|| HyperError::ProductNotFound(product_id.to_string()))
    }

    /// Iterate `(country, operator, product)` triples in catalog order.
    pub fn products(&self) -> impl Iterator<Item = (&Country, &Operator, &Product)> {
        self.countries.iter().flat_map(|c| {
            c.operators
                .iter()
                .flat_map(move |o| o.products.iter().map(move |p| (c, o, p)))
        })
    }
}
