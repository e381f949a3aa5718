//! The read-only data context: every market, vendor, product, and event.
//!
//! A [`Directory`] is built once from YAML seed data (embedded at compile
//! time, or read from a directory on disk) and passed by reference to
//! everything that needs it. Lookups by id return `Option`; references
//! between records that point nowhere are skipped, never an error.

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::query::Query;
use crate::types::{Event, Market, Product, Vendor};
use crate::Error;

#[derive(Deserialize)]
struct MarketFile {
    markets: Vec<Market>,
}

#[derive(Deserialize)]
struct VendorFile {
    vendors: Vec<Vendor>,
}

#[derive(Deserialize)]
struct ProductFile {
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct EventFile {
    events: Vec<Event>,
}

/// Raw YAML text for the four seed files.
#[derive(Clone, Copy)]
pub struct SeedFiles<'a> {
    pub markets: &'a str,
    pub vendors: &'a str,
    pub products: &'a str,
    pub events: &'a str,
}

impl SeedFiles<'static> {
    /// The seed data compiled into the binary.
    pub fn embedded() -> Self {
        Self {
            markets: include_str!("../../seed_data/markets.yml"),
            vendors: include_str!("../../seed_data/vendors.yml"),
            products: include_str!("../../seed_data/products.yml"),
            events: include_str!("../../seed_data/events.yml"),
        }
    }
}

/// A reference from one record to an id that has no matching record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Entity holding the reference, e.g. "market".
    pub owner: &'static str,
    pub owner_id: String,
    /// Field the reference lives in, e.g. "vendorIds".
    pub field: &'static str,
    pub missing_id: String,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} references missing id {} in {}",
            self.owner, self.owner_id, self.missing_id, self.field
        )
    }
}

/// Immutable collections of every record, in seed order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    markets: Vec<Market>,
    vendors: Vec<Vendor>,
    products: Vec<Product>,
    events: Vec<Event>,
}

impl Directory {
    /// Loads the seed data compiled into the binary.
    pub fn from_seed() -> Result<Self, Error> {
        Self::from_yaml(SeedFiles::embedded())
    }

    /// Parses the four seed files.
    pub fn from_yaml(files: SeedFiles<'_>) -> Result<Self, Error> {
        let markets: MarketFile = parse_seed("markets.yml", files.markets)?;
        let vendors: VendorFile = parse_seed("vendors.yml", files.vendors)?;
        let products: ProductFile = parse_seed("products.yml", files.products)?;
        let events: EventFile = parse_seed("events.yml", files.events)?;
        Self::from_parts(markets.markets, vendors.vendors, products.products, events.events)
    }

    /// Reads `markets.yml`, `vendors.yml`, `products.yml` and `events.yml`
    /// from `dir`.
    pub fn from_yaml_dir(dir: &Path) -> Result<Self, Error> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| Error::Io { path, source })
        };
        let markets = read("markets.yml")?;
        let vendors = read("vendors.yml")?;
        let products = read("products.yml")?;
        let events = read("events.yml")?;
        Self::from_yaml(SeedFiles {
            markets: &markets,
            vendors: &vendors,
            products: &products,
            events: &events,
        })
    }

    /// Builds a directory from already-constructed records.
    ///
    /// Rejects duplicate ids and fills in each review's market name from
    /// its owning market when the record leaves it out.
    pub fn from_parts(
        mut markets: Vec<Market>,
        vendors: Vec<Vendor>,
        products: Vec<Product>,
        events: Vec<Event>,
    ) -> Result<Self, Error> {
        ensure_unique("market", markets.iter().map(|m| m.id.as_str()))?;
        ensure_unique("vendor", vendors.iter().map(|v| v.id.as_str()))?;
        ensure_unique("product", products.iter().map(|p| p.id.as_str()))?;
        ensure_unique("event", events.iter().map(|e| e.id.as_str()))?;

        for market in markets.iter_mut() {
            for review in market.reviews.iter_mut() {
                if review.market_name.is_none() {
                    review.market_name = Some(market.name.clone());
                }
            }
        }

        let directory = Self {
            markets,
            vendors,
            products,
            events,
        };
        for dangling in directory.dangling_references() {
            tracing::debug!("{}", dangling);
        }
        Ok(directory)
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn market(&self, id: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.id == id)
    }

    pub fn vendor(&self, id: &str) -> Option<&Vendor> {
        self.vendors.iter().find(|v| v.id == id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Runs a query against this directory.
    pub fn search<Q: Query>(&self, query: &Q) -> Vec<&Q::Item> {
        query.run(self)
    }

    /// Vendors listed by the market, in directory order. Unknown ids are skipped.
    pub fn vendors_at(&self, market: &Market) -> Vec<&Vendor> {
        self.vendors
            .iter()
            .filter(|v| market.vendor_ids.contains(&v.id))
            .collect()
    }

    /// Markets the vendor sells at, in directory order.
    pub fn markets_for(&self, vendor: &Vendor) -> Vec<&Market> {
        self.markets
            .iter()
            .filter(|m| vendor.market_ids.contains(&m.id))
            .collect()
    }

    /// Products owned by the vendor.
    pub fn products_of(&self, vendor: &Vendor) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.vendor_id == vendor.id)
            .collect()
    }

    /// Events hosted by the market.
    pub fn events_at(&self, market: &Market) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.market_id == market.id)
            .collect()
    }

    /// The market hosting the event, if it exists.
    pub fn market_of(&self, event: &Event) -> Option<&Market> {
        self.market(&event.market_id)
    }

    /// The vendor selling the product, if it exists.
    pub fn vendor_of(&self, product: &Product) -> Option<&Vendor> {
        self.vendor(&product.vendor_id)
    }

    /// Vendors flagged as featured, in directory order.
    pub fn featured_vendors(&self) -> Vec<&Vendor> {
        self.vendors.iter().filter(|v| v.featured).collect()
    }

    /// Every reference that points at a record this directory does not hold.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut out = Vec::new();
        let mut check = |owner: &'static str,
                         owner_id: &str,
                         field: &'static str,
                         id: &str,
                         exists: bool| {
            if !exists {
                out.push(DanglingReference {
                    owner,
                    owner_id: owner_id.to_string(),
                    field,
                    missing_id: id.to_string(),
                });
            }
        };

        for market in &self.markets {
            for id in &market.vendor_ids {
                check("market", &market.id, "vendorIds", id, self.vendor(id).is_some());
            }
            for id in &market.upcoming_event_ids {
                check("market", &market.id, "upcoming_events", id, self.event(id).is_some());
            }
            for review in &market.reviews {
                let owns = review.market_id == market.id;
                check("review", &review.id, "marketId", &review.market_id, owns);
            }
        }
        for vendor in &self.vendors {
            for id in &vendor.market_ids {
                check("vendor", &vendor.id, "marketIds", id, self.market(id).is_some());
            }
            for id in &vendor.product_ids {
                check("vendor", &vendor.id, "products", id, self.product(id).is_some());
            }
        }
        for product in &self.products {
            let exists = self.vendor(&product.vendor_id).is_some();
            check("product", &product.id, "vendorId", &product.vendor_id, exists);
        }
        for event in &self.events {
            let exists = self.market(&event.market_id).is_some();
            check("event", &event.id, "marketId", &event.market_id, exists);
        }
        out
    }
}

fn parse_seed<T: DeserializeOwned>(file: &str, yaml: &str) -> Result<T, Error> {
    serde_yml::from_str(yaml).map_err(|source| Error::SeedParse {
        file: file.to_string(),
        source,
    })
}

fn ensure_unique<'a>(
    entity: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::DuplicateId {
                entity,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
