//! # Voxel Area Entry Point
//!
//! Calls into the library's `run()` function, which flies a camera over the
//! generated terrain without opening a window.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- settings.json
//! ```

fn main() {
    voxel_area::run();
}
