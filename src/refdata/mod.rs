//! Static reference tables
//!
//! Country codes, region subdivisions, and addressing conventions. Everything
//! here is compiled in; there is no runtime loading.

pub mod addressing;
pub mod countries;
pub mod regions;

pub use addressing::{compose_street_address, house_number_first};
pub use countries::{
    alpha2_from_alpha3, alpha2_from_name, alpha3, country_name, normalize_country,
};
pub use regions::{has_regions, region_code, region_name};
