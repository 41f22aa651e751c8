//! # HTTP Route Modules
//!
//! | Prefix | Module | Domain |
//! |--------|--------|--------|
//! | `/v1/zones/*` | [`zones`] | Zone directory administration and country resolution |
//! | `/v1/rates`, `/v1/quotes` | [`rates`] | Rate publication and shipping quotes |
//! | `/v1/packages/*` | [`packages`] | Package intake, status, and assignment queries |
//! | `/v1/bins/*` | [`bins`] | Bin administration, assignment, occupancy audit |
//! | `/v1/storage-pricing`, `/v1/storage-charges/*` | [`storage`] | Storage pricing and fee accrual |

pub mod bins;
pub mod packages;
pub mod rates;
pub mod storage;
pub mod zones;
