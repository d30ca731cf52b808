//! Generates Swift and Kotlin bindings for `singlewave-core`.
//!
//! ```sh
//! cargo run -p uniffi-bindgen -- generate --library target/release/libsinglewave_core.dylib --language swift --out-dir swift/
//! ```

fn main() {
    uniffi::uniffi_bindgen_main();
}
