use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Month, VendorID};

/// Unique identifier for a product (e.g. "7").
pub type ProductID = String;

/// Something a vendor sells, with the months it is in season.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductID,

    pub name: String,

    pub description: String,

    pub category: Category,

    /// Months the product is in season. May be empty.
    #[serde(default)]
    pub seasonality: Vec<Month>,

    /// Free-text price, e.g. "$4.50/lb".
    pub price: Option<String>,

    pub image: String,

    #[serde(default)]
    pub organic: bool,

    pub vendor_id: VendorID,
}

impl Product {
    pub fn in_season(&self, month: Month) -> bool {
        self.seasonality.contains(&month)
    }
}

/// Product category.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vegetable,
    Fruit,
    Dairy,
    Meat,
    Bakery,
    Specialty,
    Prepared,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Vegetable,
        Category::Fruit,
        Category::Dairy,
        Category::Meat,
        Category::Bakery,
        Category::Specialty,
        Category::Prepared,
    ];

    /// Capitalized label, e.g. "Bakery".
    pub fn display_name(self) -> &'static str {
        match self {
            Category::Vegetable => "Vegetable",
            Category::Fruit => "Fruit",
            Category::Dairy => "Dairy",
            Category::Meat => "Meat",
            Category::Bakery => "Bakery",
            Category::Specialty => "Specialty",
            Category::Prepared => "Prepared",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Vegetable => "vegetable",
                Category::Fruit => "fruit",
                Category::Dairy => "dairy",
                Category::Meat => "meat",
                Category::Bakery => "bakery",
                Category::Specialty => "specialty",
                Category::Prepared => "prepared",
            }
        )
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.to_string() == lower)
            .ok_or(())
    }
}
