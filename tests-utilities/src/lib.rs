// File: tests-utilities/src/lib.rs
// Project: kebapp-presale
// Creation date: Monday 25 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 04 December 2024 @ 10:12:09
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::print_stdout)]

mod environment;
pub mod ledger;
pub mod wallet;

pub use environment::Environment;
