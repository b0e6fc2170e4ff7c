// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

// libuvcgadget is loaded at runtime through libloading, so no
// rustc-link-lib directive is emitted here.

fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");
    println!("cargo:rerun-if-env-changed=UVCGADGET_LIBRARY");
}
