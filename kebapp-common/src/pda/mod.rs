// File: kebapp-common/src/pda/mod.rs
// Project: kebapp-presale
// Creation date: Tuesday 19 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Tuesday 19 November 2024 @ 14:20:11
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

mod account;
mod seed;

pub use account::*;
pub use seed::*;
