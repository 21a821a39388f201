// File: kebapp-presale/build.rs
// Project: kebapp-presale
// Creation date: Monday 18 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Thursday 28 November 2024 @ 09:12:58
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

#![allow(clippy::unwrap_used)]
#![allow(clippy::print_stdout)]

use std::{env, fs, path::Path};

/// Deployment constants for one mode.
struct Deployment {
    program_id: &'static str,
    admin: &'static str,
    usdt_mint: &'static str,
    kebab_mint: &'static str,
    rpc_url: &'static str,
}

const MAINNET: Deployment = Deployment {
    program_id: "E1SA8MMtdEDSoriuBi1BJhnbwc3jCnSPmH2to6cyBzSn",
    admin: "2FcJbN2kgx3eB1JeJgoBKczpAsXxJzosq269CoidxfhA",
    usdt_mint: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
    kebab_mint: "5fEEqD2GxnJ64cMoZGxKTd9ypiU2oc8CTSRyRxFRhNZP",
    rpc_url: "https://api.mainnet-beta.solana.com",
};

const DEVNET: Deployment = Deployment {
    program_id: "FgkLDmnXJaPwRAjudDiC9AzSCaMUumdjv3RW2zkWKLXH",
    admin: "2FcJbN2kgx3eB1JeJgoBKczpAsXxJzosq269CoidxfhA",
    usdt_mint: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
    kebab_mint: "5fEEqD2GxnJ64cMoZGxKTd9ypiU2oc8CTSRyRxFRhNZP",
    rpc_url: "https://api.devnet.solana.com",
};

const TESTING: Deployment = Deployment {
    program_id: "E8ofPC2RXn7yGC2xVRDwzwMZQKNkXV75Hmpm4AXpNCjz",
    admin: "2FcJbN2kgx3eB1JeJgoBKczpAsXxJzosq269CoidxfhA",
    usdt_mint: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
    kebab_mint: "5fEEqD2GxnJ64cMoZGxKTd9ypiU2oc8CTSRyRxFRhNZP",
    rpc_url: "http://127.0.0.1:8899",
};

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let path_keys = Path::new(&out_dir).join("keys.rs");
    let path_id = Path::new(&out_dir).join("program_id.rs");

    match env::var("KEBAPP_MODE").unwrap_or_default().as_str() {
        "MAINNET" => write_deployment(&MAINNET, &path_keys, &path_id),
        "DEVNET" => write_deployment(&DEVNET, &path_keys, &path_id),
        "TESTING" => write_testing(&path_keys, &path_id),
        _ => {
            println!(
                "cargo:warning=Compiling kebapp-presale with unrecognized mode '{:?}': using TESTING",
                env::var("KEBAPP_MODE")
            );
            write_testing(&path_keys, &path_id);
        }
    }
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=KEBAPP_MODE");
}

fn write_testing(path_keys: &Path, path_id: &Path) {
    write_deployment(&TESTING, path_keys, path_id);
    println!("cargo:rustc-cfg=feature=\"debug-msg\"");
}

fn write_deployment(deployment: &Deployment, path_keys: &Path, path_id: &Path) {
    fs::write(
        path_keys,
        format!(
            "
/// Wallet receiving the investments
pub const ADMIN: Pubkey = solana_program::pubkey!(\"{}\");
/// Mint of the USDT token
pub const USDT_MINT: Pubkey = solana_program::pubkey!(\"{}\");
/// Mint of the KEBAB token
pub const KEBAB_MINT: Pubkey = solana_program::pubkey!(\"{}\");
/// Default RPC endpoint
pub const DEFAULT_RPC_URL: &str = \"{}\";
",
            deployment.admin, deployment.usdt_mint, deployment.kebab_mint, deployment.rpc_url
        ),
    )
    .unwrap();
    fs::write(
        path_id,
        format!(
            "
solana_program::declare_id!(\"{}\");
",
            deployment.program_id
        ),
    )
    .unwrap();
}
