use serde::{Deserialize, Serialize};

use super::{MarketID, ProductID};

/// Unique identifier for a vendor (e.g. "4").
pub type VendorID = String;

/// A producer selling at one or more markets.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: VendorID,

    pub name: String,

    pub bio: String,

    #[serde(default)]
    pub market_ids: Vec<MarketID>,

    #[serde(rename = "products", default)]
    pub product_ids: Vec<ProductID>,

    #[serde(default)]
    pub images: Vec<String>,

    pub contact: Option<Contact>,

    #[serde(default)]
    pub featured: bool,
}

/// Optional ways to reach a vendor.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub instagram: Option<String>,
}

impl Contact {
    /// Present contact channels as `(label, value)` pairs, in a fixed order.
    pub fn channels(&self) -> Vec<(&'static str, &str)> {
        [
            ("phone", &self.phone),
            ("email", &self.email),
            ("website", &self.website),
            ("instagram", &self.instagram),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}
