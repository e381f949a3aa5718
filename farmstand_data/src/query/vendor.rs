use crate::types::{Category, Vendor};
use crate::Directory;

use super::{common::QueryCommon, Query};

/// Selects vendors by name/bio search, product category, market and
/// featured flag.
#[derive(Clone, Debug, Default)]
pub struct VendorQuery {
    pub common: QueryCommon,
    pub category: Option<Category>,
    pub market_id: Option<String>,
    pub featured_only: bool,
}

impl Query for VendorQuery {
    type Item = Vendor;

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }

    fn collection<'d>(&self, directory: &'d Directory) -> &'d [Vendor] {
        directory.vendors()
    }

    fn matches(&self, directory: &Directory, vendor: &Vendor) -> bool {
        if !self.common.matches_text(vendor) {
            return false;
        }
        if self.featured_only && !vendor.featured {
            return false;
        }
        if let Some(market_id) = &self.market_id {
            if !vendor.market_ids.contains(market_id) {
                return false;
            }
        }
        match self.category {
            None => true,
            // A vendor sells a category when one of its products has it.
            Some(category) => directory
                .products()
                .iter()
                .any(|p| p.vendor_id == vendor.id && p.category == category),
        }
    }
}

impl VendorQuery {
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_market(mut self, market_id: &str) -> Self {
        self.market_id = Some(market_id.to_string());
        self
    }

    pub fn featured_only(mut self) -> Self {
        self.featured_only = true;
        self
    }
}
