//! Layouts command implementation.

use inkloom::{Layout, PatternCatalog};

/// List the built-in layouts with their region counts.
pub fn cmd_layouts() {
    println!("Available layouts:");
    for layout in Layout::all() {
        let regions = layout.regions(1.0, 1.0).len();
        println!(
            "  {:<8} {} ({} region{})",
            layout.name(),
            layout.description(),
            regions,
            if regions == 1 { "" } else { "s" }
        );
    }
    println!();
    println!("Use --svg <file> to take regions from the closed paths of an SVG.");
}
